//! Two-party chat append log.
//!
//! A chat is keyed by the unordered pair of its two participants, stored as
//! a sorted pair with a unique constraint. Creation is an atomic upsert, so
//! concurrent first messages between the same pair converge on one chat.
//! Messages are append-only and immutable.

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{ChatError, ChatResult};
pub use manager::ChatManager;
pub use models::{ChatSummary, Message, Participant};
