//! # Altairis
//!
//! A social profile backend: user accounts with JWT-based sessions, profile
//! and avatar management, an embedded posts feed, and two-party chats.
//!
//! This library holds the domain logic and persistence; the HTTP surface
//! lives in the `alt_server` crate.
//!
//! ## Core Modules
//!
//! - [`auth`]: token service (access/refresh JWT lifecycle) and credential
//!   operations (registration, login)
//! - [`profile`]: profile projections, post append/removal, cross-user feed
//!   assembly, account deletion
//! - [`chat`]: two-party append-only chats keyed by the canonical sorted
//!   participant pair
//! - [`db`]: PostgreSQL connection pooling and embedded migrations
//!
//! ## Example
//!
//! ```no_run
//! use altairis::auth::{AuthManager, TokenService};
//! use altairis::db::{Database, DatabaseConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&DatabaseConfig::from_env()).await?;
//!     let tokens = Arc::new(TokenService::new(
//!         "access_secret".into(),
//!         "refresh_secret".into(),
//!     ));
//!     let auth = AuthManager::new(
//!         Arc::new(db.pool().clone()),
//!         "pepper".into(),
//!         tokens,
//!     );
//!     let (user, session) = auth
//!         .register("Ada".into(), "ada@example.com".into(), "secret".into())
//!         .await?;
//!     println!("registered {} ({})", user.name, session.access_token);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod chat;
pub mod db;
pub mod profile;

pub use auth::{AuthError, AuthManager, AuthResult, TokenService};
pub use chat::ChatManager;
pub use db::{Database, DatabaseConfig};
pub use profile::ProfileManager;
