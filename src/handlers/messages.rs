//! Messaging HTTP handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::messaging::{
    Conversation, MarkReadRequest, Message, OpenConversationRequest, SendMessageRequest,
    UnreadCount,
};
use crate::middleware::AuthenticatedUser;
use crate::models::ApiResponse;
use crate::state::AppState;

/// Query parameters for fetching a conversation's messages
#[derive(Debug, Deserialize)]
pub struct ConversationParams {
    #[serde(alias = "conversationId")]
    pub conversation_id: Uuid,
}

/// POST /api/messages/conversation - Open (or fetch) a conversation about a listing
pub async fn open_conversation(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<OpenConversationRequest>,
) -> Result<Json<ApiResponse<Conversation>>, ApiError> {
    let conversation = state
        .messaging_service
        .open_conversation(user.user_id, request)
        .await?;

    Ok(Json(ApiResponse::ok(conversation)))
}

/// GET /api/messages - List the user's conversations
pub async fn list_conversations(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<ApiResponse<Vec<Conversation>>>, ApiError> {
    let conversations = state
        .messaging_service
        .list_conversations(user.user_id)
        .await?;

    Ok(Json(ApiResponse::ok(conversations)))
}

/// GET /api/messages/conversation?conversation_id= - Fetch a thread
pub async fn conversation_messages(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(params): Query<ConversationParams>,
) -> Result<Json<ApiResponse<Vec<Message>>>, ApiError> {
    let messages = state
        .messaging_service
        .list_messages(user.user_id, params.conversation_id)
        .await?;

    Ok(Json(ApiResponse::ok(messages)))
}

/// POST /api/messages/send - Send a message in a conversation
pub async fn send_message(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Message>>), ApiError> {
    let message = state
        .messaging_service
        .send_message(user.user_id, request.conversation_id, &request.content)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(message))))
}

/// PUT /api/messages/read - Mark a conversation's messages as read
pub async fn mark_read(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<MarkReadRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .messaging_service
        .mark_read(user.user_id, request.conversation_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/messages/unread - Unread message count for the badge poll
pub async fn unread_count(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<ApiResponse<UnreadCount>>, ApiError> {
    let count = state.messaging_service.unread_count(user.user_id).await?;

    Ok(Json(ApiResponse::ok(UnreadCount { count })))
}
