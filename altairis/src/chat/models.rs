//! Chat data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::UserId;

/// A message appended to a chat. Immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub chat_id: i64,
    pub sender_id: UserId,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

/// Resolved participant summary for chat listings.
///
/// Deleted accounts resolve to a tombstone (placeholder name, no avatar)
/// rather than dropping the chat from the listing.
#[derive(Debug, Clone, Serialize)]
pub struct Participant {
    pub id: UserId,
    pub name: String,
    pub avatar_url: String,
}

/// A chat with resolved participants and its messages in append order.
#[derive(Debug, Clone, Serialize)]
pub struct ChatSummary {
    pub id: i64,
    pub participants: Vec<Participant>,
    pub messages: Vec<Message>,
}
