//! Transaction HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::models::{ApiResponse, Pagination};
use crate::state::AppState;
use crate::transactions::{
    CreateTransactionRequest, Transaction, TransactionQuery, TransactionWithMessages,
    UpdateTransactionRequest,
};

/// POST /api/transactions - Initiate a purchase or trade on a listing
pub async fn create_transaction(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TransactionWithMessages>>), ApiError> {
    let transaction = state
        .transaction_service
        .create_transaction(user.user_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(transaction))))
}

/// GET /api/transactions - List the user's transactions
pub async fn list_transactions(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<ApiResponse<Vec<Transaction>>>, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).clamp(1, 100);

    let (transactions, total) = state
        .transaction_service
        .list_transactions(user.user_id, &query)
        .await?;

    Ok(Json(ApiResponse::paginated(
        transactions,
        Pagination::new(total, page, limit),
    )))
}

/// GET /api/transactions/:id - Get a single transaction with its messages
pub async fn get_transaction(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TransactionWithMessages>>, ApiError> {
    let transaction = state
        .transaction_service
        .get_transaction(user.user_id, id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound("Transaction not found or not authorized".to_string())
        })?;

    Ok(Json(ApiResponse::ok(transaction)))
}

/// PUT /api/transactions/:id - Apply an action and/or append a message
pub async fn update_transaction(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTransactionRequest>,
) -> Result<Json<ApiResponse<TransactionWithMessages>>, ApiError> {
    let transaction = state
        .transaction_service
        .apply_action(user.user_id, id, request)
        .await?;

    Ok(Json(ApiResponse::ok(transaction)))
}
