//! Listing store: the catalog of items offered for sale, lending, or exchange

mod model;
mod service;

pub use model::{
    Availability, CreateListingRequest, ItemCondition, Listing, ListingQuery, ListingSort,
    ListingType, UpdateListingRequest, CATEGORIES,
};
pub use service::{ListingError, ListingService};
