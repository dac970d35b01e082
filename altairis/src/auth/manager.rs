//! Credential manager implementation.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::{PgPool, Row, postgres::PgRow};
use std::sync::Arc;

use super::{
    errors::{AuthError, AuthResult},
    models::{Role, SessionTokens, User},
    tokens::TokenService,
};

/// Credential manager: registration and login against the user store.
///
/// Token issuance is delegated to the shared [`TokenService`]; this type owns
/// the password hashing policy (Argon2id + server-side pepper) and the
/// store-enforced email uniqueness.
#[derive(Clone)]
pub struct AuthManager {
    pool: Arc<PgPool>,
    pepper: String,
    tokens: Arc<TokenService>,
}

impl AuthManager {
    /// Create a new credential manager
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `pepper` - Server-side pepper for password hashing
    /// * `tokens` - Token service used to issue session tokens
    pub fn new(pool: Arc<PgPool>, pepper: String, tokens: Arc<TokenService>) -> Self {
        Self {
            pool,
            pepper,
            tokens,
        }
    }

    /// The token service this manager issues sessions with.
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Register a new user and issue their first session token pair.
    ///
    /// The email is normalized to lowercase before storage. Uniqueness is
    /// enforced by the store's unique index: the INSERT itself fails
    /// atomically on a duplicate, so two concurrent registrations with the
    /// same email cannot both succeed.
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidInput` - Blank email or password
    /// * `AuthError::EmailTaken` - Email already registered
    pub async fn register(
        &self,
        name: String,
        email: String,
        password: String,
    ) -> AuthResult<(User, SessionTokens)> {
        if email.trim().is_empty() {
            return Err(AuthError::InvalidInput("email must not be blank".into()));
        }
        if password.is_empty() {
            return Err(AuthError::InvalidInput("password must not be blank".into()));
        }

        let email = email.trim().to_lowercase();
        let password_hash = self.hash_password(&password)?;

        let row = sqlx::query(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, avatar_url, status, role, created_at
            "#,
        )
        .bind(&name)
        .bind(&email)
        .bind(&password_hash)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(unique_email_to_taken)?;

        let user = user_from_row(&row);
        log::info!("registered user {} ({})", user.id, user.email);

        let tokens = self.tokens.issue_session_tokens(&user)?;
        Ok((user, tokens))
    }

    /// Authenticate a user and issue a session token pair.
    ///
    /// `EmailNotFound` and `InvalidPassword` are distinct variants so callers
    /// can log and test them separately; both surface to HTTP clients as 401.
    ///
    /// # Errors
    ///
    /// * `AuthError::EmailNotFound` - No account for the email
    /// * `AuthError::InvalidPassword` - Password mismatch
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<(User, SessionTokens)> {
        let email = email.trim().to_lowercase();

        let row = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, avatar_url, status, role, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(&email)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(AuthError::EmailNotFound)?;

        let password_hash: String = row.get("password_hash");
        self.verify_password(password, &password_hash)?;

        let user = user_from_row(&row);
        let tokens = self.tokens.issue_session_tokens(&user)?;
        Ok((user, tokens))
    }

    /// Hash password with Argon2id + pepper
    fn hash_password(&self, password: &str) -> AuthResult<String> {
        let peppered = format!("{}{}", password, self.pepper);
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        Ok(argon2
            .hash_password(peppered.as_bytes(), &salt)
            .map_err(|_| AuthError::HashingFailed)?
            .to_string())
    }

    /// Verify password against hash
    fn verify_password(&self, password: &str, hash: &str) -> AuthResult<()> {
        let peppered = format!("{}{}", password, self.pepper);
        let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidPassword)?;
        let argon2 = Argon2::default();

        argon2
            .verify_password(peppered.as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::InvalidPassword)
    }
}

/// Map a unique-index violation on the email column to `EmailTaken`.
fn unique_email_to_taken(err: sqlx::Error) -> AuthError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => AuthError::EmailTaken,
        _ => AuthError::Database(err),
    }
}

pub(crate) fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        avatar_url: row.get("avatar_url"),
        status: row.get("status"),
        role: Role::from_db(row.get::<&str, _>("role")),
        created_at: row.get("created_at"),
    }
}
