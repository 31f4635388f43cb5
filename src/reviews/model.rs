//! Review models and data structures

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;

/// Review model: 1-5 star feedback from one party of a completed transaction
/// about the other
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Review {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub listing_id: Uuid,
    pub reviewer_id: Uuid,
    pub reviewee_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request DTO for submitting a review
#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    #[serde(alias = "transactionId")]
    pub transaction_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
}

/// Query parameters for listing a user's reviews
#[derive(Debug, Deserialize, Default)]
pub struct ReviewQuery {
    #[serde(alias = "userId")]
    pub user_id: Option<Uuid>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Reviews for a reviewee plus their computed average
#[derive(Debug, Serialize)]
pub struct ReviewsWithAverage {
    pub reviews: Vec<Review>,
    pub average_rating: Option<f64>,
    pub total: i64,
}
