//! Route definitions for the marketplace API

mod auth;
mod listings;
mod messages;
mod reviews;
mod transactions;
mod users;

pub use auth::auth_routes;
pub use listings::listing_routes;
pub use messages::message_routes;
pub use reviews::review_routes;
pub use transactions::transaction_routes;
pub use users::user_routes;
