//! Messaging: pre-negotiation conversation threads between users

mod model;
mod service;

pub use model::{
    Conversation, MarkReadRequest, Message, OpenConversationRequest, SendMessageRequest,
    UnreadCount,
};
pub use service::{MessagingError, MessagingService};
