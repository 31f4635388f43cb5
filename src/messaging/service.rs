//! Messaging service layer - conversation threads and read receipts

use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::error::ApiError;
use crate::messaging::model::{Conversation, Message, OpenConversationRequest};

/// Messaging service errors
#[derive(Error, Debug)]
pub enum MessagingError {
    #[error("Conversation not found")]
    ConversationNotFound,

    #[error("Item not found")]
    ListingNotFound,

    #[error("You are not a participant in this conversation")]
    NotParticipant,

    #[error("Cannot start a conversation with yourself")]
    SelfConversation,

    #[error("Message cannot be empty")]
    EmptyContent,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for MessagingError {
    fn from(e: sqlx::Error) -> Self {
        MessagingError::Database(e.to_string())
    }
}

impl From<MessagingError> for ApiError {
    fn from(e: MessagingError) -> Self {
        use MessagingError::*;
        match e {
            ConversationNotFound | ListingNotFound => ApiError::NotFound(e.to_string()),
            NotParticipant => ApiError::Forbidden(e.to_string()),
            SelfConversation | EmptyContent => ApiError::BadRequest(e.to_string()),
            Database(msg) => ApiError::DatabaseError(msg),
        }
    }
}

/// Messaging service: lazily-created threads between listing browsers and
/// owners
#[derive(Clone)]
pub struct MessagingService {
    db_pool: PgPool,
}

impl MessagingService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Get the conversation between `user_id` and the recipient about a
    /// listing, creating it on first contact
    pub async fn open_conversation(
        &self,
        user_id: Uuid,
        request: OpenConversationRequest,
    ) -> Result<Conversation, MessagingError> {
        if request.recipient_id == user_id {
            return Err(MessagingError::SelfConversation);
        }

        let listing_exists: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM listings WHERE id = $1")
                .bind(request.listing_id)
                .fetch_optional(&self.db_pool)
                .await?;

        if listing_exists.is_none() {
            return Err(MessagingError::ListingNotFound);
        }

        let (a, b) = normalize_pair(user_id, request.recipient_id);

        if let Some(existing) = self.find_conversation(request.listing_id, a, b).await? {
            return Ok(existing);
        }

        // ON CONFLICT covers the race where both participants open the
        // thread at once; the loser falls back to the winner's row.
        let inserted = sqlx::query_as::<_, Conversation>(
            r#"
            INSERT INTO conversations (id, listing_id, participant_a, participant_b, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            ON CONFLICT (listing_id, participant_a, participant_b) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.listing_id)
        .bind(a)
        .bind(b)
        .fetch_optional(&self.db_pool)
        .await?;

        match inserted {
            Some(conversation) => Ok(conversation),
            None => self
                .find_conversation(request.listing_id, a, b)
                .await?
                .ok_or(MessagingError::ConversationNotFound),
        }
    }

    /// List a user's conversations, most recently active first
    pub async fn list_conversations(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Conversation>, MessagingError> {
        let conversations = sqlx::query_as::<_, Conversation>(
            r#"
            SELECT * FROM conversations
            WHERE participant_a = $1 OR participant_b = $1
            ORDER BY updated_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(conversations)
    }

    /// Fetch a conversation's messages in chronological order
    pub async fn list_messages(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> Result<Vec<Message>, MessagingError> {
        self.require_participant(user_id, conversation_id).await?;

        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT * FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(conversation_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(messages)
    }

    /// Append a message to a conversation
    pub async fn send_message(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
        content: &str,
    ) -> Result<Message, MessagingError> {
        self.require_participant(user_id, conversation_id).await?;

        let content = content.trim();
        if content.is_empty() {
            return Err(MessagingError::EmptyContent);
        }

        let mut tx = self.db_pool.begin().await?;

        // The sender has read their own message by definition
        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (id, conversation_id, sender_id, content, read_by, created_at)
            VALUES ($1, $2, $3, $4, ARRAY[$3]::uuid[], NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(conversation_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE conversations
            SET last_message = $1, updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(content)
        .bind(conversation_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(message)
    }

    /// Mark every message in a conversation as read by `user_id`
    pub async fn mark_read(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> Result<(), MessagingError> {
        self.require_participant(user_id, conversation_id).await?;

        sqlx::query(
            r#"
            UPDATE messages
            SET read_by = array_append(read_by, $1)
            WHERE conversation_id = $2 AND NOT ($1 = ANY(read_by))
            "#,
        )
        .bind(user_id)
        .bind(conversation_id)
        .execute(&self.db_pool)
        .await?;

        Ok(())
    }

    /// Count messages across the user's conversations not yet read by them
    pub async fn unread_count(&self, user_id: Uuid) -> Result<i64, MessagingError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM messages m
            JOIN conversations c ON c.id = m.conversation_id
            WHERE (c.participant_a = $1 OR c.participant_b = $1)
              AND NOT ($1 = ANY(m.read_by))
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(count)
    }

    async fn find_conversation(
        &self,
        listing_id: Uuid,
        a: Uuid,
        b: Uuid,
    ) -> Result<Option<Conversation>, MessagingError> {
        let conversation = sqlx::query_as::<_, Conversation>(
            r#"
            SELECT * FROM conversations
            WHERE listing_id = $1 AND participant_a = $2 AND participant_b = $3
            "#,
        )
        .bind(listing_id)
        .bind(a)
        .bind(b)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(conversation)
    }

    async fn require_participant(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> Result<Conversation, MessagingError> {
        let conversation = sqlx::query_as::<_, Conversation>(
            "SELECT * FROM conversations WHERE id = $1",
        )
        .bind(conversation_id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or(MessagingError::ConversationNotFound)?;

        if !conversation.involves(user_id) {
            return Err(MessagingError::NotParticipant);
        }

        Ok(conversation)
    }
}

/// Order a participant pair so (a, b) and (b, a) map to the same row
fn normalize_pair(x: Uuid, y: Uuid) -> (Uuid, Uuid) {
    if x <= y {
        (x, y)
    } else {
        (y, x)
    }
}
