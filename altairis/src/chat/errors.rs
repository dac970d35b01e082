//! Chat error types.

use thiserror::Error;

/// Chat errors
#[derive(Debug, Error)]
pub enum ChatError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Message text missing or empty
    #[error("Message text is required")]
    EmptyMessage,

    /// Sender and recipient are the same identity
    #[error("Cannot send a message to yourself")]
    SelfMessage,
}

impl ChatError {
    /// Client-safe message; store internals are never surfaced.
    pub fn client_message(&self) -> String {
        match self {
            ChatError::Database(_) => "Server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for chat operations
pub type ChatResult<T> = Result<T, ChatError>;
