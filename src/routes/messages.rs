//! Messaging route definitions

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers::messages;
use crate::state::AppState;

pub fn message_routes() -> Router<AppState> {
    Router::new()
        .route("/api/messages", get(messages::list_conversations))
        .route(
            "/api/messages/conversation",
            post(messages::open_conversation),
        )
        .route(
            "/api/messages/conversation",
            get(messages::conversation_messages),
        )
        .route("/api/messages/send", post(messages::send_message))
        .route("/api/messages/read", put(messages::mark_read))
        .route("/api/messages/unread", get(messages::unread_count))
}
