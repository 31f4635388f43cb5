//! Listing HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::listings::{Availability, CreateListingRequest, Listing, ListingQuery, UpdateListingRequest};
use crate::middleware::AuthenticatedUser;
use crate::models::{ApiResponse, Pagination};
use crate::state::AppState;

/// GET /api/items - Browse listings with filters and pagination
pub async fn list_items(
    State(state): State<AppState>,
    Query(mut query): Query<ListingQuery>,
) -> Result<Json<ApiResponse<Vec<Listing>>>, ApiError> {
    // The browse page shows available items unless asked otherwise
    if query.availability.is_none() {
        query.availability = Some(Availability::Available);
    }

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);

    let (listings, total) = state.listing_service.find_listings(&query).await?;

    Ok(Json(ApiResponse::paginated(
        listings,
        Pagination::new(total, page, limit),
    )))
}

/// POST /api/items - Create a new listing
pub async fn create_item(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateListingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Listing>>), ApiError> {
    let listing = state
        .listing_service
        .create_listing(user.user_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(listing))))
}

/// GET /api/items/:id - Get a single listing
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Listing>>, ApiError> {
    let listing = state
        .listing_service
        .get_listing(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Item not found".to_string()))?;

    Ok(Json(ApiResponse::ok(listing)))
}

/// PUT /api/items/:id - Update a listing's mutable fields
pub async fn update_item(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateListingRequest>,
) -> Result<Json<ApiResponse<Listing>>, ApiError> {
    let listing = state
        .listing_service
        .update_listing(user.user_id, id, request)
        .await?;

    Ok(Json(ApiResponse::ok(listing)))
}

/// DELETE /api/items/:id - Delete a listing
pub async fn delete_item(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.listing_service.delete_listing(user.user_id, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/profile/items - List the authenticated user's own listings
pub async fn my_items(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<ApiResponse<Vec<Listing>>>, ApiError> {
    let listings = state.listing_service.list_owned(user.user_id).await?;

    Ok(Json(ApiResponse::ok(listings)))
}
