//! Messaging models and data structures

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;

/// Conversation model: one thread between two users about one listing
///
/// Participants are stored in normalized order (lowest UUID first) so the
/// pair is unique regardless of who opened the thread.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Conversation {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub participant_a: Uuid,
    pub participant_b: Uuid,
    pub last_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.participant_a == user_id || self.participant_b == user_id
    }
}

/// One message in a conversation, with per-user read receipts
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub read_by: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Request DTO for opening (or fetching) a conversation
#[derive(Debug, Deserialize)]
pub struct OpenConversationRequest {
    #[serde(alias = "listingId")]
    pub listing_id: Uuid,
    #[serde(alias = "recipientId")]
    pub recipient_id: Uuid,
}

/// Request DTO for sending a message
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    #[serde(alias = "conversationId")]
    pub conversation_id: Uuid,
    pub content: String,
}

/// Request DTO for marking a thread read
#[derive(Debug, Deserialize)]
pub struct MarkReadRequest {
    #[serde(alias = "conversationId")]
    pub conversation_id: Uuid,
}

/// Unread message count, served to the client's polling badge
#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub count: i64,
}
