//! Transaction service layer - negotiation lifecycle and listing side effects
//!
//! Every multi-write unit (create, transition, message append) runs inside a
//! single database transaction, and status changes are compare-and-swapped
//! against the expected current status, so concurrent updates cannot leave a
//! transaction and its listings disagreeing.

use sqlx::{PgPool, Postgres, QueryBuilder};
use thiserror::Error;
use uuid::Uuid;

use crate::error::ApiError;
use crate::listings::{Availability, Listing};
use crate::transactions::model::{
    CreateTransactionRequest, Transaction, TransactionMessage, TransactionQuery, TransactionRole,
    TransactionWithMessages, UpdateTransactionRequest,
};
use crate::transactions::workflow::{
    availability_for, transition, ActorRole, TransactionAction, TransactionStatus,
};

/// Transaction service errors
#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("Item not found")]
    ListingNotFound,

    #[error("Transaction not found or not authorized")]
    NotFound,

    #[error("You are not a party to this transaction")]
    NotParty,

    #[error("Cannot create a transaction for your own item")]
    OwnListing,

    #[error("Item is no longer available")]
    ListingSold,

    #[error("A pending transaction already exists for this item")]
    DuplicatePending,

    #[error("Traded item not found or not owned by you")]
    TradedListingInvalid,

    #[error("Price is required for non-trade transactions")]
    PriceRequired,

    #[error("Price cannot be negative")]
    NegativePrice,

    #[error("Meeting date and location are required to accept a transaction")]
    MeetingDetailsRequired,

    #[error("Nothing to apply: provide an action or a message")]
    NothingToApply,

    #[error("Message cannot be empty")]
    EmptyMessage,

    #[error("Message cannot be more than {MAX_MESSAGE_LENGTH} characters")]
    MessageTooLong,

    #[error("Only the seller can {} the transaction", .0.as_str())]
    NotSeller(TransactionAction),

    #[error("Only the buyer can cancel the transaction")]
    NotBuyer,

    #[error("Cannot {} a transaction that is {}", .action.as_str(), .from.as_str())]
    InvalidTransition {
        from: TransactionStatus,
        action: TransactionAction,
    },

    #[error("Transaction is {} and can no longer be modified", .0.as_str())]
    TerminalState(TransactionStatus),

    #[error("Transaction was modified concurrently, please retry")]
    ConcurrentUpdate,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for TransactionError {
    fn from(e: sqlx::Error) -> Self {
        TransactionError::Database(e.to_string())
    }
}

impl From<TransactionError> for ApiError {
    fn from(e: TransactionError) -> Self {
        use TransactionError::*;
        match e {
            ListingNotFound | NotFound => ApiError::NotFound(e.to_string()),
            OwnListing | NotParty | NotSeller(_) | NotBuyer => ApiError::Forbidden(e.to_string()),
            ListingSold | DuplicatePending | InvalidTransition { .. } | TerminalState(_)
            | ConcurrentUpdate => ApiError::Conflict(e.to_string()),
            TradedListingInvalid | PriceRequired | NegativePrice | MeetingDetailsRequired
            | NothingToApply | EmptyMessage | MessageTooLong => ApiError::BadRequest(e.to_string()),
            Database(msg) => ApiError::DatabaseError(msg),
        }
    }
}

const MAX_MESSAGE_LENGTH: usize = 1000;

/// Transaction service: applies workflow actions and their listing side
/// effects
#[derive(Clone)]
pub struct TransactionService {
    db_pool: PgPool,
}

impl TransactionService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Create a new transaction against a listing
    ///
    /// Validates every precondition before writing, then inserts the
    /// transaction, the opening message, and the listing reservation in one
    /// database transaction.
    pub async fn create_transaction(
        &self,
        buyer_id: Uuid,
        request: CreateTransactionRequest,
    ) -> Result<TransactionWithMessages, TransactionError> {
        let listing = sqlx::query_as::<_, Listing>("SELECT * FROM listings WHERE id = $1")
            .bind(request.item_id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or(TransactionError::ListingNotFound)?;

        if listing.owner_id == buyer_id {
            return Err(TransactionError::OwnListing);
        }

        if listing.availability == Availability::Sold {
            return Err(TransactionError::ListingSold);
        }

        let (traded_listing_id, price) = if request.is_trade {
            let traded_id = request
                .traded_item_id
                .ok_or(TransactionError::TradedListingInvalid)?;

            let traded: Option<Listing> = sqlx::query_as(
                "SELECT * FROM listings WHERE id = $1 AND owner_id = $2",
            )
            .bind(traded_id)
            .bind(buyer_id)
            .fetch_optional(&self.db_pool)
            .await?;

            if traded.is_none() {
                return Err(TransactionError::TradedListingInvalid);
            }

            (Some(traded_id), None)
        } else {
            let price = request.price.ok_or(TransactionError::PriceRequired)?;
            if price < 0.0 {
                return Err(TransactionError::NegativePrice);
            }
            (None, Some(price))
        };

        let existing: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id FROM transactions
            WHERE listing_id = $1 AND buyer_id = $2 AND status = 'pending'
            "#,
        )
        .bind(request.item_id)
        .bind(buyer_id)
        .fetch_optional(&self.db_pool)
        .await?;

        if existing.is_some() {
            return Err(TransactionError::DuplicatePending);
        }

        let opening_message = match request.message.as_deref().map(str::trim) {
            Some(m) if !m.is_empty() => {
                if m.len() > MAX_MESSAGE_LENGTH {
                    return Err(TransactionError::MessageTooLong);
                }
                m.to_string()
            }
            _ if request.is_trade => {
                "I'm interested in this item and would like to trade.".to_string()
            }
            _ => "I'm interested in this item".to_string(),
        };

        let mut tx = self.db_pool.begin().await?;

        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (
                id, listing_id, seller_id, buyer_id, traded_listing_id,
                status, is_trade, price, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, 'pending', $6, $7, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.item_id)
        .bind(listing.owner_id)
        .bind(buyer_id)
        .bind(traded_listing_id)
        .bind(request.is_trade)
        .bind(price)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            // The partial unique index closes the check-then-insert race
            sqlx::Error::Database(db)
                if db.constraint() == Some("idx_transactions_one_pending") =>
            {
                TransactionError::DuplicatePending
            }
            _ => TransactionError::from(e),
        })?;

        let message = sqlx::query_as::<_, TransactionMessage>(
            r#"
            INSERT INTO transaction_messages (id, transaction_id, sender_id, body, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(transaction.id)
        .bind(buyer_id)
        .bind(&opening_message)
        .fetch_one(&mut *tx)
        .await?;

        set_listing_availability(
            &mut tx,
            &transaction.listing_ids(),
            availability_for(TransactionStatus::Pending),
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            transaction_id = %transaction.id,
            listing_id = %transaction.listing_id,
            buyer_id = %buyer_id,
            is_trade = transaction.is_trade,
            "Transaction created"
        );

        Ok(TransactionWithMessages {
            transaction,
            messages: vec![message],
        })
    }

    /// Apply an action and/or append a message to a transaction
    ///
    /// The status write is a compare-and-swap against the status the caller
    /// observed; a concurrent transition makes this call fail with Conflict
    /// rather than silently double-applying.
    pub async fn apply_action(
        &self,
        actor_id: Uuid,
        transaction_id: Uuid,
        request: UpdateTransactionRequest,
    ) -> Result<TransactionWithMessages, TransactionError> {
        if request.action.is_none() && request.message.is_none() {
            return Err(TransactionError::NothingToApply);
        }

        let transaction = sqlx::query_as::<_, Transaction>(
            "SELECT * FROM transactions WHERE id = $1",
        )
        .bind(transaction_id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or(TransactionError::NotFound)?;

        if actor_id != transaction.buyer_id && actor_id != transaction.seller_id {
            return Err(TransactionError::NotParty);
        }

        if transaction.status.is_terminal() {
            return Err(TransactionError::TerminalState(transaction.status));
        }

        let mut tx = self.db_pool.begin().await?;

        if let Some(message) = request.message.as_deref().map(str::trim) {
            if message.is_empty() {
                return Err(TransactionError::EmptyMessage);
            }
            if message.len() > MAX_MESSAGE_LENGTH {
                return Err(TransactionError::MessageTooLong);
            }

            sqlx::query(
                r#"
                INSERT INTO transaction_messages (id, transaction_id, sender_id, body, created_at)
                VALUES ($1, $2, $3, $4, NOW())
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(transaction.id)
            .bind(actor_id)
            .bind(message)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(action) = request.action {
            self.check_role(&transaction, actor_id, action)?;

            let new_status = transition(transaction.status, action).ok_or(
                TransactionError::InvalidTransition {
                    from: transaction.status,
                    action,
                },
            )?;

            let meeting = if action == TransactionAction::Accept {
                let details = request
                    .meeting_details
                    .as_ref()
                    .filter(|d| !d.location.trim().is_empty())
                    .ok_or(TransactionError::MeetingDetailsRequired)?;
                Some(details)
            } else {
                None
            };

            // CAS on the status observed above
            let rows_affected = sqlx::query(
                r#"
                UPDATE transactions
                SET status = $1,
                    meeting_date = COALESCE($2, meeting_date),
                    meeting_location = COALESCE($3, meeting_location),
                    meeting_notes = COALESCE($4, meeting_notes),
                    updated_at = NOW()
                WHERE id = $5 AND status = $6
                "#,
            )
            .bind(new_status)
            .bind(meeting.map(|d| d.date))
            .bind(meeting.map(|d| d.location.trim().to_string()))
            .bind(meeting.and_then(|d| d.notes.clone()))
            .bind(transaction.id)
            .bind(transaction.status)
            .execute(&mut *tx)
            .await?
            .rows_affected();

            if rows_affected == 0 {
                return Err(TransactionError::ConcurrentUpdate);
            }

            set_listing_availability(
                &mut tx,
                &transaction.listing_ids(),
                availability_for(new_status),
            )
            .await?;

            tracing::info!(
                transaction_id = %transaction.id,
                action = action.as_str(),
                from = transaction.status.as_str(),
                to = new_status.as_str(),
                "Transaction transitioned"
            );
        } else {
            // Message-only update still bumps the activity timestamp
            sqlx::query("UPDATE transactions SET updated_at = NOW() WHERE id = $1")
                .bind(transaction.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.get_transaction(actor_id, transaction_id)
            .await?
            .ok_or(TransactionError::NotFound)
    }

    /// List a user's transactions, filtered by status and role
    pub async fn list_transactions(
        &self,
        user_id: Uuid,
        query: &TransactionQuery,
    ) -> Result<(Vec<Transaction>, i64), TransactionError> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(10).clamp(1, 100);
        let offset = (page - 1) * limit;

        let mut count_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM transactions WHERE ");
        push_scope(&mut count_builder, user_id, query);

        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.db_pool)
            .await?;

        let mut query_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM transactions WHERE ");
        push_scope(&mut query_builder, user_id, query);

        query_builder.push(" ORDER BY updated_at DESC LIMIT ");
        query_builder.push_bind(limit);
        query_builder.push(" OFFSET ");
        query_builder.push_bind(offset);

        let transactions = query_builder
            .build_query_as::<Transaction>()
            .fetch_all(&self.db_pool)
            .await?;

        Ok((transactions, total))
    }

    /// Get a single transaction with its message thread; scoped to a party
    pub async fn get_transaction(
        &self,
        user_id: Uuid,
        transaction_id: Uuid,
    ) -> Result<Option<TransactionWithMessages>, TransactionError> {
        let Some(transaction) = self.fetch_for_party(user_id, transaction_id).await? else {
            return Ok(None);
        };

        let messages = sqlx::query_as::<_, TransactionMessage>(
            r#"
            SELECT * FROM transaction_messages
            WHERE transaction_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(transaction.id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(Some(TransactionWithMessages {
            transaction,
            messages,
        }))
    }

    async fn fetch_for_party(
        &self,
        user_id: Uuid,
        transaction_id: Uuid,
    ) -> Result<Option<Transaction>, TransactionError> {
        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT * FROM transactions
            WHERE id = $1 AND (buyer_id = $2 OR seller_id = $2)
            "#,
        )
        .bind(transaction_id)
        .bind(user_id)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(transaction)
    }

    fn check_role(
        &self,
        transaction: &Transaction,
        actor_id: Uuid,
        action: TransactionAction,
    ) -> Result<(), TransactionError> {
        match action.required_role() {
            ActorRole::Seller if actor_id != transaction.seller_id => {
                Err(TransactionError::NotSeller(action))
            }
            ActorRole::Buyer if actor_id != transaction.buyer_id => {
                Err(TransactionError::NotBuyer)
            }
            _ => Ok(()),
        }
    }
}

/// Set the availability of every listing a transaction governs, inside the
/// caller's database transaction
async fn set_listing_availability(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    listing_ids: &[Uuid],
    availability: Availability,
) -> Result<(), TransactionError> {
    sqlx::query("UPDATE listings SET availability = $1, updated_at = NOW() WHERE id = ANY($2)")
        .bind(availability)
        .bind(listing_ids)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

/// Append the user/role/status scoping clauses shared by list and count
fn push_scope(builder: &mut QueryBuilder<Postgres>, user_id: Uuid, query: &TransactionQuery) {
    match query.role {
        Some(TransactionRole::Buying) => {
            builder.push("buyer_id = ");
            builder.push_bind(user_id);
        }
        Some(TransactionRole::Selling) => {
            builder.push("seller_id = ");
            builder.push_bind(user_id);
        }
        Some(TransactionRole::Trading) => {
            builder.push("is_trade = TRUE AND (buyer_id = ");
            builder.push_bind(user_id);
            builder.push(" OR seller_id = ");
            builder.push_bind(user_id);
            builder.push(")");
        }
        None => {
            builder.push("(buyer_id = ");
            builder.push_bind(user_id);
            builder.push(" OR seller_id = ");
            builder.push_bind(user_id);
            builder.push(")");
        }
    }

    if let Some(status) = query.status {
        builder.push(" AND status = ");
        builder.push_bind(status);
    }
}
