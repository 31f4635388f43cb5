//! Listing route definitions

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::listings;
use crate::state::AppState;

pub fn listing_routes() -> Router<AppState> {
    Router::new()
        .route("/api/items", get(listings::list_items))
        .route("/api/items", post(listings::create_item))
        .route("/api/items/:id", get(listings::get_item))
        .route("/api/items/:id", put(listings::update_item))
        .route("/api/items/:id", delete(listings::delete_item))
        .route("/api/profile/items", get(listings::my_items))
}
