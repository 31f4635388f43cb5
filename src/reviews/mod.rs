//! Reviews: post-completion feedback and profile rating aggregation

mod model;
mod service;

pub use model::{CreateReviewRequest, Review, ReviewQuery, ReviewsWithAverage};
pub use service::{ReviewError, ReviewService};
