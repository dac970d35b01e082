//! Profile operation error types.

use thiserror::Error;

/// Profile and post errors
#[derive(Debug, Error)]
pub enum ProfileError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// User not found
    #[error("User not found")]
    UserNotFound,

    /// Email already registered to another account
    #[error("Email already in use")]
    EmailTaken,

    /// Blank or malformed email
    #[error("Invalid email")]
    InvalidEmail,

    /// No matching post owned by the caller
    #[error("Post not found")]
    PostNotFound,
}

impl ProfileError {
    /// Client-safe message; store internals are never surfaced.
    pub fn client_message(&self) -> String {
        match self {
            ProfileError::Database(_) => "Server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for profile operations
pub type ProfileResult<T> = Result<T, ProfileError>;
