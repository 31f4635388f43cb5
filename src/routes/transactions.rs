//! Transaction route definitions

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers::transactions;
use crate::state::AppState;

pub fn transaction_routes() -> Router<AppState> {
    Router::new()
        .route("/api/transactions", post(transactions::create_transaction))
        .route("/api/transactions", get(transactions::list_transactions))
        .route("/api/transactions/:id", get(transactions::get_transaction))
        .route("/api/transactions/:id", put(transactions::update_transaction))
}
