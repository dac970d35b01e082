//! Chat API handlers.
//!
//! Listing the caller's chats and appending messages. A chat is addressed by
//! its other participant, not by a chat id: the canonical-pair lookup is a
//! storage concern the wire never sees.

use altairis::chat::{ChatError, ChatSummary, Message, Participant};
use axum::{
    Json,
    extract::{Extension, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState, error, middleware::AuthUser};
use crate::metrics;

/// Message as it appears on the wire.
#[derive(Debug, Serialize)]
pub struct MessagePayload {
    pub id: i64,
    pub sender: i64,
    pub text: String,
    pub date: DateTime<Utc>,
}

impl From<Message> for MessagePayload {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            sender: message.sender_id,
            text: message.body,
            date: message.sent_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ParticipantPayload {
    pub id: i64,
    pub name: String,
    pub avatar: String,
}

impl From<Participant> for ParticipantPayload {
    fn from(participant: Participant) -> Self {
        Self {
            id: participant.id,
            name: participant.name,
            avatar: participant.avatar_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatPayload {
    pub id: i64,
    pub participants: Vec<ParticipantPayload>,
    pub messages: Vec<MessagePayload>,
}

impl From<ChatSummary> for ChatPayload {
    fn from(chat: ChatSummary) -> Self {
        Self {
            id: chat.id,
            participants: chat.participants.into_iter().map(Into::into).collect(),
            messages: chat.messages.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatsResponse {
    pub success: bool,
    pub chats: Vec<ChatPayload>,
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    /// The other participant.
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub success: bool,
    pub message: MessagePayload,
}

/// Every chat the caller participates in, with participant summaries
/// (deleted accounts tombstoned) and messages in append order.
pub async fn list_chats(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ChatsResponse>, ApiError> {
    let chats = state.chats.list_chats(user.id).await.map_err(chat_error)?;

    Ok(Json(ChatsResponse {
        success: true,
        chats: chats.into_iter().map(Into::into).collect(),
        user_id: user.id,
    }))
}

/// Append a message to the chat with another user, creating the chat on the
/// first message between the pair. Returns the created message only.
///
/// # Errors
///
/// - `400 Bad Request`: missing recipient or message, or messaging yourself
pub async fn send_message(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<SendMessagePayload>,
) -> Result<Json<SendMessageResponse>, ApiError> {
    let (Some(recipient), Some(text)) = (payload.user_id, payload.message) else {
        return Err(error(StatusCode::BAD_REQUEST, "Missing recipient or message"));
    };

    let message = state
        .chats
        .send_message(user.id, recipient, &text)
        .await
        .map_err(chat_error)?;

    metrics::chat_messages_sent_total();
    Ok(Json(SendMessageResponse {
        success: true,
        message: message.into(),
    }))
}

/// Map library chat errors onto the HTTP taxonomy.
fn chat_error(e: ChatError) -> ApiError {
    match e {
        ChatError::EmptyMessage | ChatError::SelfMessage => {
            error(StatusCode::BAD_REQUEST, e.client_message())
        }
        ChatError::Database(err) => {
            tracing::error!("chat operation failed: {err}");
            error(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
        }
    }
}
