//! Review tests: submission rules and rating aggregation

#[cfg(test)]
mod tests {
    use sqlx::types::chrono::Utc;
    use sqlx::PgPool;
    use uuid::Uuid;

    use campusmarket_server::listings::{
        CreateListingRequest, ItemCondition, ListingService, ListingType,
    };
    use campusmarket_server::reviews::{CreateReviewRequest, ReviewError, ReviewQuery, ReviewService};
    use campusmarket_server::transactions::{
        CreateTransactionRequest, MeetingDetails, TransactionAction, TransactionService,
        UpdateTransactionRequest,
    };

    /// Helper to create a test database pool
    async fn setup_test_db() -> PgPool {
        let database_url = std::env::var("TEST_DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/campusmarket_test".to_string());

        sqlx::postgres::PgPoolOptions::new()
            .max_connections(1)
            .connect(&database_url)
            .await
            .expect("Failed to connect to test database")
    }

    async fn seed_user(pool: &PgPool, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash)
            VALUES ($1, $2, $3, 'x')
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(format!("{}@mnnit.ac.in", id.simple()))
        .execute(pool)
        .await
        .expect("Failed to seed user");
        id
    }

    /// Run one listing through create -> accept -> complete and return the
    /// completed transaction id
    async fn completed_sale(pool: &PgPool, buyer: Uuid, seller: Uuid) -> Uuid {
        let listings = ListingService::new(pool.clone());
        let transactions = TransactionService::new(pool.clone());

        let listing = listings
            .create_listing(
                seller,
                CreateListingRequest {
                    title: "Scientific calculator".to_string(),
                    description: "FX-991, works fine".to_string(),
                    category: vec!["electronics".to_string()],
                    condition: ItemCondition::Good,
                    listing_type: ListingType::Sell,
                    price: Some(400.0),
                    images: vec![],
                    tags: vec![],
                },
            )
            .await
            .expect("Failed to seed listing");

        let created = transactions
            .create_transaction(
                buyer,
                CreateTransactionRequest {
                    item_id: listing.id,
                    message: None,
                    is_trade: false,
                    traded_item_id: None,
                    price: Some(400.0),
                },
            )
            .await
            .unwrap();

        transactions
            .apply_action(
                seller,
                created.transaction.id,
                UpdateTransactionRequest {
                    action: Some(TransactionAction::Accept),
                    message: None,
                    meeting_details: Some(MeetingDetails {
                        date: Utc::now(),
                        location: "Hostel gate".to_string(),
                        notes: None,
                    }),
                },
            )
            .await
            .unwrap();

        transactions
            .apply_action(
                seller,
                created.transaction.id,
                UpdateTransactionRequest {
                    action: Some(TransactionAction::Complete),
                    message: None,
                    meeting_details: None,
                },
            )
            .await
            .unwrap();

        created.transaction.id
    }

    async fn rating_of(pool: &PgPool, user_id: Uuid) -> Option<f64> {
        sqlx::query_scalar("SELECT rating FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
            .expect("Failed to read user rating")
    }

    fn review(transaction_id: Uuid, rating: i32) -> CreateReviewRequest {
        CreateReviewRequest {
            transaction_id,
            rating,
            comment: None,
        }
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_rating_average_rolls_up() {
        let pool = setup_test_db().await;
        let reviews = ReviewService::new(pool.clone());

        let seller = seed_user(&pool, "Seller").await;
        let buyer = seed_user(&pool, "Buyer").await;

        // Ratings {5, 4, 3} average to 4.0; a fourth of 2 moves it to 3.5
        for rating in [5, 4, 3] {
            let tx_id = completed_sale(&pool, buyer, seller).await;
            reviews.submit_review(buyer, review(tx_id, rating)).await.unwrap();
        }
        assert_eq!(rating_of(&pool, seller).await, Some(4.0));

        let tx_id = completed_sale(&pool, buyer, seller).await;
        reviews.submit_review(buyer, review(tx_id, 2)).await.unwrap();
        assert_eq!(rating_of(&pool, seller).await, Some(3.5));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_single_review_sets_exact_rating() {
        let pool = setup_test_db().await;
        let reviews = ReviewService::new(pool.clone());

        let seller = seed_user(&pool, "Seller").await;
        let buyer = seed_user(&pool, "Buyer").await;

        assert_eq!(rating_of(&pool, seller).await, None);

        let tx_id = completed_sale(&pool, buyer, seller).await;
        reviews.submit_review(buyer, review(tx_id, 5)).await.unwrap();

        assert_eq!(rating_of(&pool, seller).await, Some(5.0));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_duplicate_review_rejected() {
        let pool = setup_test_db().await;
        let reviews = ReviewService::new(pool.clone());

        let seller = seed_user(&pool, "Seller").await;
        let buyer = seed_user(&pool, "Buyer").await;

        let tx_id = completed_sale(&pool, buyer, seller).await;
        reviews.submit_review(buyer, review(tx_id, 4)).await.unwrap();

        let second = reviews.submit_review(buyer, review(tx_id, 5)).await;
        assert!(matches!(second, Err(ReviewError::AlreadyReviewed)));

        // The seller reviewing the buyer on the same transaction is fine
        reviews.submit_review(seller, review(tx_id, 5)).await.unwrap();
        assert_eq!(rating_of(&pool, buyer).await, Some(5.0));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_review_requires_completed_transaction() {
        let pool = setup_test_db().await;
        let listings = ListingService::new(pool.clone());
        let transactions = TransactionService::new(pool.clone());
        let reviews = ReviewService::new(pool.clone());

        let seller = seed_user(&pool, "Seller").await;
        let buyer = seed_user(&pool, "Buyer").await;

        let listing = listings
            .create_listing(
                seller,
                CreateListingRequest {
                    title: "Badminton racket".to_string(),
                    description: "Strings in good shape".to_string(),
                    category: vec!["sports".to_string()],
                    condition: ItemCondition::Fair,
                    listing_type: ListingType::Sell,
                    price: Some(150.0),
                    images: vec![],
                    tags: vec![],
                },
            )
            .await
            .unwrap();

        let created = transactions
            .create_transaction(
                buyer,
                CreateTransactionRequest {
                    item_id: listing.id,
                    message: None,
                    is_trade: false,
                    traded_item_id: None,
                    price: Some(150.0),
                },
            )
            .await
            .unwrap();

        let result = reviews
            .submit_review(buyer, review(created.transaction.id, 5))
            .await;
        assert!(matches!(result, Err(ReviewError::NotCompleted)));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_outsider_cannot_review() {
        let pool = setup_test_db().await;
        let reviews = ReviewService::new(pool.clone());

        let seller = seed_user(&pool, "Seller").await;
        let buyer = seed_user(&pool, "Buyer").await;
        let outsider = seed_user(&pool, "Outsider").await;

        let tx_id = completed_sale(&pool, buyer, seller).await;

        let result = reviews.submit_review(outsider, review(tx_id, 1)).await;
        assert!(matches!(result, Err(ReviewError::NotParticipant)));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_list_reviews_with_average() {
        let pool = setup_test_db().await;
        let reviews = ReviewService::new(pool.clone());

        let seller = seed_user(&pool, "Seller").await;
        let buyer = seed_user(&pool, "Buyer").await;

        for rating in [5, 3] {
            let tx_id = completed_sale(&pool, buyer, seller).await;
            reviews.submit_review(buyer, review(tx_id, rating)).await.unwrap();
        }

        let (listed, total, average) = reviews
            .list_reviews(&ReviewQuery {
                user_id: Some(seller),
                page: None,
                limit: None,
            })
            .await
            .unwrap();

        assert_eq!(total, 2);
        assert_eq!(listed.len(), 2);
        assert_eq!(average, Some(4.0));
    }

    #[tokio::test]
    async fn test_rating_bounds_checked_before_io() {
        // Out-of-range ratings are rejected at the boundary, so no database
        // is needed to observe the failure
        let pool_result = sqlx::postgres::PgPoolOptions::new()
            .max_connections(1)
            .connect_lazy("postgresql://localhost/unused");
        let reviews = ReviewService::new(pool_result.unwrap());

        let result = reviews
            .submit_review(Uuid::new_v4(), review(Uuid::new_v4(), 6))
            .await;
        assert!(matches!(result, Err(ReviewError::RatingOutOfRange)));

        let result = reviews
            .submit_review(Uuid::new_v4(), review(Uuid::new_v4(), 0))
            .await;
        assert!(matches!(result, Err(ReviewError::RatingOutOfRange)));
    }
}
