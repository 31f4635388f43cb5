//! User profile HTTP handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::models::{ApiResponse, PublicProfile};
use crate::state::AppState;

/// Cross-domain activity counts for the profile dashboard
#[derive(Debug, Serialize)]
pub struct ProfileStats {
    pub total_listings: i64,
    pub active_listings: i64,
    pub sold_listings: i64,
    pub purchases_completed: i64,
    pub sales_completed: i64,
    pub reviews_received: i64,
    pub rating: Option<f64>,
}

/// GET /api/users/:id - Public profile for a user
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PublicProfile>>, ApiError> {
    let profile = sqlx::query_as::<_, PublicProfile>(
        "SELECT id, name, hostel, rating, created_at FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&state.db_pool)
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(ApiResponse::ok(profile)))
}

/// GET /api/profile/stats - Activity summary for the authenticated user
pub async fn profile_stats(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<ApiResponse<ProfileStats>>, ApiError> {
    let (total_listings, active_listings, sold_listings): (i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT COUNT(*),
               COUNT(*) FILTER (WHERE availability = 'available'),
               COUNT(*) FILTER (WHERE availability = 'sold')
        FROM listings
        WHERE owner_id = $1
        "#,
    )
    .bind(user.user_id)
    .fetch_one(&state.db_pool)
    .await?;

    let (purchases_completed, sales_completed): (i64, i64) = sqlx::query_as(
        r#"
        SELECT COUNT(*) FILTER (WHERE buyer_id = $1),
               COUNT(*) FILTER (WHERE seller_id = $1)
        FROM transactions
        WHERE status = 'completed' AND (buyer_id = $1 OR seller_id = $1)
        "#,
    )
    .bind(user.user_id)
    .fetch_one(&state.db_pool)
    .await?;

    let reviews_received: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE reviewee_id = $1")
            .bind(user.user_id)
            .fetch_one(&state.db_pool)
            .await?;

    let rating: Option<f64> = sqlx::query_scalar("SELECT rating FROM users WHERE id = $1")
        .bind(user.user_id)
        .fetch_one(&state.db_pool)
        .await?;

    Ok(Json(ApiResponse::ok(ProfileStats {
        total_listings,
        active_listings,
        sold_listings,
        purchases_completed,
        sales_completed,
        reviews_received,
        rating,
    })))
}
