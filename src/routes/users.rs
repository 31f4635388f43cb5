//! User profile route definitions

use axum::{routing::get, Router};

use crate::handlers::users;
use crate::state::AppState;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users/:id", get(users::get_profile))
        .route("/api/profile/stats", get(users::profile_stats))
}
