//! Review service layer - feedback submission and rating aggregation
//!
//! A review insert and the reviewee's recomputed average commit together, so
//! the profile rating can never drift from the review set it summarizes.

use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::error::ApiError;
use crate::reviews::model::{CreateReviewRequest, Review, ReviewQuery};
use crate::transactions::{Transaction, TransactionStatus};

/// Review service errors
#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("Rating must be between 1 and 5")]
    RatingOutOfRange,

    #[error("Comment cannot be more than 500 characters")]
    CommentTooLong,

    #[error("User ID is required")]
    UserIdRequired,

    #[error("Transaction not found")]
    TransactionNotFound,

    #[error("Only a party to the transaction can review it")]
    NotParticipant,

    #[error("Transaction must be completed before it can be reviewed")]
    NotCompleted,

    #[error("You have already reviewed this transaction")]
    AlreadyReviewed,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for ReviewError {
    fn from(e: sqlx::Error) -> Self {
        ReviewError::Database(e.to_string())
    }
}

impl From<ReviewError> for ApiError {
    fn from(e: ReviewError) -> Self {
        use ReviewError::*;
        match e {
            RatingOutOfRange | CommentTooLong | UserIdRequired => {
                ApiError::BadRequest(e.to_string())
            }
            TransactionNotFound => ApiError::NotFound(e.to_string()),
            NotParticipant => ApiError::Forbidden(e.to_string()),
            NotCompleted | AlreadyReviewed => ApiError::Conflict(e.to_string()),
            Database(msg) => ApiError::DatabaseError(msg),
        }
    }
}

/// Review service: creates feedback and keeps profile ratings in sync
#[derive(Clone)]
pub struct ReviewService {
    db_pool: PgPool,
}

impl ReviewService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Submit a review for a completed transaction
    pub async fn submit_review(
        &self,
        reviewer_id: Uuid,
        request: CreateReviewRequest,
    ) -> Result<Review, ReviewError> {
        if !(1..=5).contains(&request.rating) {
            return Err(ReviewError::RatingOutOfRange);
        }

        if request.comment.as_deref().is_some_and(|c| c.len() > 500) {
            return Err(ReviewError::CommentTooLong);
        }

        let transaction = sqlx::query_as::<_, Transaction>(
            "SELECT * FROM transactions WHERE id = $1",
        )
        .bind(request.transaction_id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or(ReviewError::TransactionNotFound)?;

        let reviewee_id = if reviewer_id == transaction.buyer_id {
            transaction.seller_id
        } else if reviewer_id == transaction.seller_id {
            transaction.buyer_id
        } else {
            return Err(ReviewError::NotParticipant);
        };

        if transaction.status != TransactionStatus::Completed {
            return Err(ReviewError::NotCompleted);
        }

        let existing: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM reviews WHERE transaction_id = $1 AND reviewer_id = $2",
        )
        .bind(request.transaction_id)
        .bind(reviewer_id)
        .fetch_optional(&self.db_pool)
        .await?;

        if existing.is_some() {
            return Err(ReviewError::AlreadyReviewed);
        }

        let mut tx = self.db_pool.begin().await?;

        let review = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (
                id, transaction_id, listing_id, reviewer_id, reviewee_id,
                rating, comment, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(transaction.id)
        .bind(transaction.listing_id)
        .bind(reviewer_id)
        .bind(reviewee_id)
        .bind(request.rating)
        .bind(request.comment.as_deref().map(str::trim))
        .fetch_one(&mut *tx)
        .await?;

        // Recompute the reviewee's rolling average in the same unit of work
        sqlx::query(
            r#"
            UPDATE users
            SET rating = (
                SELECT ROUND(AVG(rating)::numeric, 1)::float8
                FROM reviews
                WHERE reviewee_id = $1
            ),
            updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(reviewee_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            review_id = %review.id,
            transaction_id = %transaction.id,
            reviewee_id = %reviewee_id,
            rating = review.rating,
            "Review submitted"
        );

        Ok(review)
    }

    /// List reviews received by a user, newest first, with their average
    pub async fn list_reviews(
        &self,
        query: &ReviewQuery,
    ) -> Result<(Vec<Review>, i64, Option<f64>), ReviewError> {
        let user_id = query.user_id.ok_or(ReviewError::UserIdRequired)?;
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(10).clamp(1, 100);
        let offset = (page - 1) * limit;

        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT * FROM reviews
            WHERE reviewee_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db_pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE reviewee_id = $1")
            .bind(user_id)
            .fetch_one(&self.db_pool)
            .await?;

        let average: Option<f64> = sqlx::query_scalar(
            r#"
            SELECT ROUND(AVG(rating)::numeric, 1)::float8
            FROM reviews
            WHERE reviewee_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.db_pool)
        .await?;

        Ok((reviews, total, average))
    }
}
