//! Review route definitions

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::reviews;
use crate::state::AppState;

pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/api/reviews", post(reviews::create_review))
        .route("/api/reviews", get(reviews::list_reviews))
}
