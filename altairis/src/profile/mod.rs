//! Profile and post operations.
//!
//! Profile projections (own, restricted, full), email/status/avatar updates,
//! post append/removal, the cross-user feed, and account deletion.

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{ProfileError, ProfileResult};
pub use manager::ProfileManager;
pub use models::{FeedPage, FeedPost, Post, Profile, ProfileView, PublicProfile};
