//! Authentication module providing user registration, login, and the
//! access/refresh token lifecycle.
//!
//! This module implements:
//! - Argon2id password hashing with a server-side pepper
//! - JWT access tokens signed with a dedicated access secret
//! - JWT refresh tokens signed with a disjoint refresh secret
//! - Store-enforced email uniqueness (unique index, not check-then-act)
//!
//! The two-secret split isolates blast radius: leaking the access secret
//! cannot be used to mint new long-lived refresh tokens. There is no
//! revocation list; a compromised token stays valid until its own expiry.
//!
//! ## Example
//!
//! ```no_run
//! use altairis::auth::{AuthManager, TokenService};
//! use altairis::db::Database;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&Default::default()).await?;
//!     let tokens = Arc::new(TokenService::new(
//!         "access_secret".into(),
//!         "refresh_secret".into(),
//!     ));
//!     let auth = AuthManager::new(Arc::new(db.pool().clone()), "pepper".into(), tokens);
//!
//!     let (user, session) = auth
//!         .register("Ada".into(), "Ada@Example.com".into(), "secret".into())
//!         .await?;
//!     assert_eq!(user.email, "ada@example.com");
//!     let claims = auth.tokens().verify_access(&session.access_token)?;
//!     assert_eq!(claims.sub, user.id);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;
pub mod tokens;

pub use errors::{AuthError, AuthResult};
pub use manager::AuthManager;
pub use models::{AccessClaims, RefreshClaims, Role, SessionTokens, User, UserId};
pub use tokens::TokenService;
