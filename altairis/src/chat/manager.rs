//! Chat manager implementation.

use sqlx::{PgPool, Row, postgres::PgRow};
use std::collections::HashMap;
use std::sync::Arc;

use super::{
    errors::{ChatError, ChatResult},
    models::{ChatSummary, Message, Participant},
};
use crate::auth::UserId;

/// Placeholder name shown for participants whose account has been deleted.
const DELETED_PARTICIPANT_NAME: &str = "Deleted user";

/// Chat manager: canonical-pair chats and their append-only message logs.
#[derive(Clone)]
pub struct ChatManager {
    pool: Arc<PgPool>,
}

impl ChatManager {
    /// Create a new chat manager
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Append a message to the chat between `subject` and `recipient`,
    /// creating the chat if this is the first message between the pair.
    ///
    /// The pair is canonicalized by sorting before lookup, and the chat row
    /// is obtained through an atomic `INSERT … ON CONFLICT` upsert keyed by
    /// the sorted pair: two concurrent first messages cannot create two
    /// chats. Returns the created message, not the whole chat.
    ///
    /// # Errors
    ///
    /// * `ChatError::EmptyMessage` - Blank text
    /// * `ChatError::SelfMessage` - `subject == recipient`
    pub async fn send_message(
        &self,
        subject: UserId,
        recipient: UserId,
        text: &str,
    ) -> ChatResult<Message> {
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if subject == recipient {
            return Err(ChatError::SelfMessage);
        }

        let (user_low, user_high) = canonical_pair(subject, recipient);

        // The no-op DO UPDATE makes the upsert return the surviving row id
        // whether this call created the chat or found it.
        let chat_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO chats (user_low, user_high)
            VALUES ($1, $2)
            ON CONFLICT (user_low, user_high)
            DO UPDATE SET user_low = EXCLUDED.user_low
            RETURNING id
            "#,
        )
        .bind(user_low)
        .bind(user_high)
        .fetch_one(self.pool.as_ref())
        .await?;

        let row = sqlx::query(
            r#"
            INSERT INTO messages (chat_id, sender_id, body)
            VALUES ($1, $2, $3)
            RETURNING id, chat_id, sender_id, body, sent_at
            "#,
        )
        .bind(chat_id)
        .bind(subject)
        .bind(text)
        .fetch_one(self.pool.as_ref())
        .await?;

        log::debug!("user {subject} sent message to chat {chat_id}");
        Ok(message_from_row(&row))
    }

    /// Every chat the subject participates in, with resolved participant
    /// summaries and messages in append order.
    pub async fn list_chats(&self, subject: UserId) -> ChatResult<Vec<ChatSummary>> {
        let chat_rows = sqlx::query(
            r#"
            SELECT id, user_low, user_high
            FROM chats
            WHERE user_low = $1 OR user_high = $1
            ORDER BY id
            "#,
        )
        .bind(subject)
        .fetch_all(self.pool.as_ref())
        .await?;

        if chat_rows.is_empty() {
            return Ok(Vec::new());
        }

        let chat_ids: Vec<i64> = chat_rows.iter().map(|r| r.get("id")).collect();
        let mut participant_ids: Vec<UserId> = chat_rows
            .iter()
            .flat_map(|r| [r.get::<i64, _>("user_low"), r.get::<i64, _>("user_high")])
            .collect();
        participant_ids.sort_unstable();
        participant_ids.dedup();

        let user_rows = sqlx::query("SELECT id, name, avatar_url FROM users WHERE id = ANY($1)")
            .bind(&participant_ids)
            .fetch_all(self.pool.as_ref())
            .await?;
        let users: HashMap<UserId, (String, String)> = user_rows
            .iter()
            .map(|r| {
                (
                    r.get::<i64, _>("id"),
                    (r.get::<String, _>("name"), r.get::<String, _>("avatar_url")),
                )
            })
            .collect();

        let message_rows = sqlx::query(
            r#"
            SELECT id, chat_id, sender_id, body, sent_at
            FROM messages
            WHERE chat_id = ANY($1)
            ORDER BY chat_id, id
            "#,
        )
        .bind(&chat_ids)
        .fetch_all(self.pool.as_ref())
        .await?;

        let mut messages_by_chat: HashMap<i64, Vec<Message>> = HashMap::new();
        for row in &message_rows {
            let message = message_from_row(row);
            messages_by_chat
                .entry(message.chat_id)
                .or_default()
                .push(message);
        }

        let summaries = chat_rows
            .iter()
            .map(|row| {
                let id: i64 = row.get("id");
                let participants = [row.get::<i64, _>("user_low"), row.get::<i64, _>("user_high")]
                    .into_iter()
                    .map(|user_id| resolve_participant(&users, user_id))
                    .collect();
                ChatSummary {
                    id,
                    participants,
                    messages: messages_by_chat.remove(&id).unwrap_or_default(),
                }
            })
            .collect();

        Ok(summaries)
    }
}

/// Order-independent representation of a two-identity pair.
fn canonical_pair(a: UserId, b: UserId) -> (UserId, UserId) {
    if a < b { (a, b) } else { (b, a) }
}

fn resolve_participant(users: &HashMap<UserId, (String, String)>, user_id: UserId) -> Participant {
    match users.get(&user_id) {
        Some((name, avatar_url)) => Participant {
            id: user_id,
            name: name.clone(),
            avatar_url: avatar_url.clone(),
        },
        // Orphaned reference from a deleted account.
        None => Participant {
            id: user_id,
            name: DELETED_PARTICIPANT_NAME.to_string(),
            avatar_url: String::new(),
        },
    }
}

fn message_from_row(row: &PgRow) -> Message {
    Message {
        id: row.get("id"),
        chat_id: row.get("chat_id"),
        sender_id: row.get("sender_id"),
        body: row.get("body"),
        sent_at: row.get("sent_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::canonical_pair;

    #[test]
    fn canonical_pair_is_order_independent() {
        assert_eq!(canonical_pair(3, 7), (3, 7));
        assert_eq!(canonical_pair(7, 3), (3, 7));
    }
}
