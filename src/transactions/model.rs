//! Transaction models and data structures

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;

use super::workflow::{TransactionAction, TransactionStatus};

/// Transaction model: one negotiation between a buyer and a seller over a
/// listing (plus a second listing when bartering)
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Transaction {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub seller_id: Uuid,
    pub buyer_id: Uuid,
    pub traded_listing_id: Option<Uuid>,
    pub status: TransactionStatus,
    pub is_trade: bool,
    pub price: Option<f64>,
    pub meeting_date: Option<DateTime<Utc>>,
    pub meeting_location: Option<String>,
    pub meeting_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Listing IDs whose availability this transaction governs
    pub fn listing_ids(&self) -> Vec<Uuid> {
        let mut ids = vec![self.listing_id];
        if let Some(traded) = self.traded_listing_id {
            ids.push(traded);
        }
        ids
    }
}

/// One message in a transaction's negotiation thread
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct TransactionMessage {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Transaction plus its ordered message thread, as returned by the API
#[derive(Debug, Serialize)]
pub struct TransactionWithMessages {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub messages: Vec<TransactionMessage>,
}

/// Where-to-meet details recorded when the seller accepts
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MeetingDetails {
    pub date: DateTime<Utc>,
    pub location: String,
    pub notes: Option<String>,
}

/// Request DTO for creating a transaction
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    #[serde(alias = "itemId")]
    pub item_id: Uuid,
    pub message: Option<String>,
    #[serde(default, alias = "isTrade")]
    pub is_trade: bool,
    #[serde(alias = "tradedItemId")]
    pub traded_item_id: Option<Uuid>,
    pub price: Option<f64>,
}

/// Request DTO for updating a transaction: an action, a message, or both
#[derive(Debug, Deserialize, Default)]
pub struct UpdateTransactionRequest {
    pub action: Option<TransactionAction>,
    pub message: Option<String>,
    #[serde(alias = "meetingDetails")]
    pub meeting_details: Option<MeetingDetails>,
}

/// Which side of their transactions a user wants to see
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionRole {
    Buying,
    Selling,
    Trading,
}

/// Query parameters for listing transactions
#[derive(Debug, Deserialize, Default)]
pub struct TransactionQuery {
    pub status: Option<TransactionStatus>,
    #[serde(rename = "type")]
    pub role: Option<TransactionRole>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}
