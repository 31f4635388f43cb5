//! API handlers for the marketplace backend

pub mod auth;
pub mod listings;
pub mod messages;
pub mod reviews;
pub mod transactions;
pub mod users;
