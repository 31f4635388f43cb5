//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::auth::AuthService;
use crate::listings::ListingService;
use crate::messaging::MessagingService;
use crate::reviews::ReviewService;
use crate::transactions::TransactionService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: Arc<AuthService>,
    pub listing_service: Arc<ListingService>,
    pub transaction_service: Arc<TransactionService>,
    pub review_service: Arc<ReviewService>,
    pub messaging_service: Arc<MessagingService>,
}

impl AppState {
    pub fn new(
        db_pool: PgPool,
        auth_service: Arc<AuthService>,
        listing_service: Arc<ListingService>,
        transaction_service: Arc<TransactionService>,
        review_service: Arc<ReviewService>,
        messaging_service: Arc<MessagingService>,
    ) -> Self {
        Self {
            db_pool,
            auth_service,
            listing_service,
            transaction_service,
            review_service,
            messaging_service,
        }
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.auth_service.clone()
    }
}

impl FromRef<AppState> for Arc<ListingService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.listing_service.clone()
    }
}

impl FromRef<AppState> for Arc<TransactionService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.transaction_service.clone()
    }
}

impl FromRef<AppState> for Arc<ReviewService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.review_service.clone()
    }
}

impl FromRef<AppState> for Arc<MessagingService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.messaging_service.clone()
    }
}
