//! Review HTTP handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::error::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::models::{ApiResponse, Pagination};
use crate::reviews::{CreateReviewRequest, Review, ReviewQuery, ReviewsWithAverage};
use crate::state::AppState;

/// POST /api/reviews - Review the other party of a completed transaction
pub async fn create_review(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Review>>), ApiError> {
    let review = state
        .review_service
        .submit_review(user.user_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(review))))
}

/// GET /api/reviews?user_id= - Reviews received by a user, with average
pub async fn list_reviews(
    State(state): State<AppState>,
    Query(query): Query<ReviewQuery>,
) -> Result<Json<ApiResponse<ReviewsWithAverage>>, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).clamp(1, 100);

    let (reviews, total, average_rating) = state.review_service.list_reviews(&query).await?;

    Ok(Json(ApiResponse::paginated(
        ReviewsWithAverage {
            reviews,
            average_rating,
            total,
        },
        Pagination::new(total, page, limit),
    )))
}
