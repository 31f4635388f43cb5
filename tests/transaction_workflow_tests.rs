//! Workflow tests: transaction lifecycle and listing side effects

#[cfg(test)]
mod tests {
    use sqlx::types::chrono::Utc;
    use sqlx::PgPool;
    use uuid::Uuid;

    use campusmarket_server::listings::{
        Availability, CreateListingRequest, ItemCondition, Listing, ListingService, ListingType,
    };
    use campusmarket_server::transactions::{
        CreateTransactionRequest, MeetingDetails, TransactionAction, TransactionError,
        TransactionService, TransactionStatus, UpdateTransactionRequest,
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

    /// Insert a user directly; auth flow is not under test here
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

    async fn seed_listing(service: &ListingService, owner_id: Uuid, price: f64) -> Listing {
        service
            .create_listing(
                owner_id,
                CreateListingRequest {
                    title: "Engineering Mathematics".to_string(),
                    description: "Third semester textbook, lightly used".to_string(),
                    category: vec!["books".to_string()],
                    condition: ItemCondition::Good,
                    listing_type: ListingType::Sell,
                    price: Some(price),
                    images: vec![],
                    tags: vec![],
                },
            )
            .await
            .expect("Failed to seed listing")
    }

    fn sale_request(listing_id: Uuid, price: f64) -> CreateTransactionRequest {
        CreateTransactionRequest {
            item_id: listing_id,
            message: None,
            is_trade: false,
            traded_item_id: None,
            price: Some(price),
        }
    }

    fn action(action: TransactionAction) -> UpdateTransactionRequest {
        UpdateTransactionRequest {
            action: Some(action),
            message: None,
            meeting_details: None,
        }
    }

    fn accept_with_meeting() -> UpdateTransactionRequest {
        UpdateTransactionRequest {
            action: Some(TransactionAction::Accept),
            message: None,
            meeting_details: Some(MeetingDetails {
                date: Utc::now(),
                location: "Library steps".to_string(),
                notes: None,
            }),
        }
    }

    async fn availability_of(pool: &PgPool, listing_id: Uuid) -> Availability {
        sqlx::query_scalar("SELECT availability FROM listings WHERE id = $1")
            .bind(listing_id)
            .fetch_one(pool)
            .await
            .expect("Failed to read listing availability")
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_create_reserves_listing() {
        let pool = setup_test_db().await;
        let listings = ListingService::new(pool.clone());
        let transactions = TransactionService::new(pool.clone());

        let seller = seed_user(&pool, "Seller").await;
        let buyer = seed_user(&pool, "Buyer").await;
        let listing = seed_listing(&listings, seller, 100.0).await;

        let created = transactions
            .create_transaction(buyer, sale_request(listing.id, 100.0))
            .await
            .expect("Creation should succeed");

        assert_eq!(created.transaction.status, TransactionStatus::Pending);
        assert_eq!(created.transaction.seller_id, seller);
        assert_eq!(created.messages.len(), 1);
        assert_eq!(
            availability_of(&pool, listing.id).await,
            Availability::Reserved
        );
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_cancel_releases_listing() {
        let pool = setup_test_db().await;
        let listings = ListingService::new(pool.clone());
        let transactions = TransactionService::new(pool.clone());

        let seller = seed_user(&pool, "Seller").await;
        let buyer = seed_user(&pool, "Buyer").await;
        let listing = seed_listing(&listings, seller, 100.0).await;

        let created = transactions
            .create_transaction(buyer, sale_request(listing.id, 100.0))
            .await
            .unwrap();

        let cancelled = transactions
            .apply_action(buyer, created.transaction.id, action(TransactionAction::Cancel))
            .await
            .expect("Buyer can cancel a pending transaction");

        assert_eq!(cancelled.transaction.status, TransactionStatus::Cancelled);
        assert_eq!(
            availability_of(&pool, listing.id).await,
            Availability::Available
        );

        // Terminal state admits nothing further
        let again = transactions
            .apply_action(buyer, created.transaction.id, action(TransactionAction::Cancel))
            .await;
        assert!(matches!(again, Err(TransactionError::TerminalState(_))));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_full_sale_scenario() {
        let pool = setup_test_db().await;
        let listings = ListingService::new(pool.clone());
        let transactions = TransactionService::new(pool.clone());

        let seller = seed_user(&pool, "Seller").await;
        let buyer = seed_user(&pool, "Buyer").await;
        let listing = seed_listing(&listings, seller, 100.0).await;

        let created = transactions
            .create_transaction(buyer, sale_request(listing.id, 100.0))
            .await
            .unwrap();
        let id = created.transaction.id;

        let accepted = transactions
            .apply_action(seller, id, accept_with_meeting())
            .await
            .expect("Seller can accept with meeting details");
        assert_eq!(accepted.transaction.status, TransactionStatus::Accepted);
        assert!(accepted.transaction.meeting_location.is_some());
        assert_eq!(
            availability_of(&pool, listing.id).await,
            Availability::Reserved
        );

        let completed = transactions
            .apply_action(seller, id, action(TransactionAction::Complete))
            .await
            .expect("Seller can complete an accepted transaction");
        assert_eq!(completed.transaction.status, TransactionStatus::Completed);
        assert_eq!(availability_of(&pool, listing.id).await, Availability::Sold);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_complete_requires_accept_first() {
        let pool = setup_test_db().await;
        let listings = ListingService::new(pool.clone());
        let transactions = TransactionService::new(pool.clone());

        let seller = seed_user(&pool, "Seller").await;
        let buyer = seed_user(&pool, "Buyer").await;
        let listing = seed_listing(&listings, seller, 50.0).await;

        let created = transactions
            .create_transaction(buyer, sale_request(listing.id, 50.0))
            .await
            .unwrap();

        let result = transactions
            .apply_action(
                seller,
                created.transaction.id,
                action(TransactionAction::Complete),
            )
            .await;

        assert!(matches!(
            result,
            Err(TransactionError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_accept_without_meeting_details_rejected() {
        let pool = setup_test_db().await;
        let listings = ListingService::new(pool.clone());
        let transactions = TransactionService::new(pool.clone());

        let seller = seed_user(&pool, "Seller").await;
        let buyer = seed_user(&pool, "Buyer").await;
        let listing = seed_listing(&listings, seller, 50.0).await;

        let created = transactions
            .create_transaction(buyer, sale_request(listing.id, 50.0))
            .await
            .unwrap();

        let result = transactions
            .apply_action(
                seller,
                created.transaction.id,
                action(TransactionAction::Accept),
            )
            .await;

        assert!(matches!(
            result,
            Err(TransactionError::MeetingDetailsRequired)
        ));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_duplicate_pending_is_conflict() {
        let pool = setup_test_db().await;
        let listings = ListingService::new(pool.clone());
        let transactions = TransactionService::new(pool.clone());

        let seller = seed_user(&pool, "Seller").await;
        let buyer = seed_user(&pool, "Buyer").await;
        let listing = seed_listing(&listings, seller, 100.0).await;

        transactions
            .create_transaction(buyer, sale_request(listing.id, 100.0))
            .await
            .unwrap();

        let second = transactions
            .create_transaction(buyer, sale_request(listing.id, 90.0))
            .await;

        assert!(matches!(second, Err(TransactionError::DuplicatePending)));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_role_gates_enforced() {
        let pool = setup_test_db().await;
        let listings = ListingService::new(pool.clone());
        let transactions = TransactionService::new(pool.clone());

        let seller = seed_user(&pool, "Seller").await;
        let buyer = seed_user(&pool, "Buyer").await;
        let outsider = seed_user(&pool, "Outsider").await;
        let listing = seed_listing(&listings, seller, 100.0).await;

        let created = transactions
            .create_transaction(buyer, sale_request(listing.id, 100.0))
            .await
            .unwrap();
        let id = created.transaction.id;

        // A third user is neither party
        let result = transactions
            .apply_action(outsider, id, accept_with_meeting())
            .await;
        assert!(matches!(result, Err(TransactionError::NotParty)));

        // The buyer cannot accept
        let result = transactions.apply_action(buyer, id, accept_with_meeting()).await;
        assert!(matches!(result, Err(TransactionError::NotSeller(_))));

        // The seller cannot cancel
        let result = transactions
            .apply_action(seller, id, action(TransactionAction::Cancel))
            .await;
        assert!(matches!(result, Err(TransactionError::NotBuyer)));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_own_listing_rejected() {
        let pool = setup_test_db().await;
        let listings = ListingService::new(pool.clone());
        let transactions = TransactionService::new(pool.clone());

        let seller = seed_user(&pool, "Seller").await;
        let listing = seed_listing(&listings, seller, 100.0).await;

        let result = transactions
            .create_transaction(seller, sale_request(listing.id, 100.0))
            .await;

        assert!(matches!(result, Err(TransactionError::OwnListing)));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_message_only_update() {
        let pool = setup_test_db().await;
        let listings = ListingService::new(pool.clone());
        let transactions = TransactionService::new(pool.clone());

        let seller = seed_user(&pool, "Seller").await;
        let buyer = seed_user(&pool, "Buyer").await;
        let listing = seed_listing(&listings, seller, 100.0).await;

        let created = transactions
            .create_transaction(buyer, sale_request(listing.id, 100.0))
            .await
            .unwrap();

        let updated = transactions
            .apply_action(
                seller,
                created.transaction.id,
                UpdateTransactionRequest {
                    action: None,
                    message: Some("Can you do 90?".to_string()),
                    meeting_details: None,
                },
            )
            .await
            .expect("Message-only update is legal");

        assert_eq!(updated.transaction.status, TransactionStatus::Pending);
        assert_eq!(updated.messages.len(), 2);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&TransactionStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");

        let action: TransactionAction = serde_json::from_str("\"accept\"").unwrap();
        assert_eq!(action, TransactionAction::Accept);
    }
}
