//! Authentication error types.

use thiserror::Error;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Password hashing failed
    #[error("Password hashing failed")]
    HashingFailed,

    /// No account exists for the email
    #[error("Email not found")]
    EmailNotFound,

    /// Password verification failed
    #[error("Invalid password")]
    InvalidPassword,

    /// Email already registered to another account
    #[error("Email already in use")]
    EmailTaken,

    /// User not found
    #[error("User not found")]
    UserNotFound,

    /// Malformed registration input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Token signing failed
    #[error("Token creation failed: {0}")]
    TokenCreation(jsonwebtoken::errors::Error),

    /// Token past its expiry
    #[error("Token expired")]
    TokenExpired,

    /// Token signature or format verification failed
    #[error("Invalid token")]
    TokenInvalid,
}

impl AuthError {
    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Database and token-signing errors are sanitized to prevent information
    /// disclosure about the internal system structure.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::Database(_) => "Server error".to_string(),
            AuthError::TokenCreation(_) => "Server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
