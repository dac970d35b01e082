//! Profile and post data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::UserId;

/// A post owned by a user. Immutable once created; the id exists only as a
/// deletion target within the owner's record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub user_id: UserId,
    pub image_url: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Full profile projection for the account owner (and privileged viewers).
/// The password hash is never part of any projection.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub avatar_url: String,
    pub status: String,
    pub posts: Vec<Post>,
}

/// Restricted projection shown to other users; the email is withheld.
#[derive(Debug, Clone, Serialize)]
pub struct PublicProfile {
    pub id: UserId,
    pub name: String,
    pub avatar_url: String,
    pub status: String,
    pub posts: Vec<Post>,
}

/// Outcome of viewing another user's profile.
#[derive(Debug, Clone)]
pub enum ProfileView {
    /// Viewer and target are the same account; the caller is expected to
    /// redirect to the own-profile view.
    SameUser,
    /// Default projection for unauthenticated and unprivileged viewers.
    Restricted(PublicProfile),
    /// Full record, granted by the viewer's stored role capability.
    Full(Profile),
}

/// A feed entry: a post with its author resolved.
#[derive(Debug, Clone, Serialize)]
pub struct FeedPost {
    pub id: i64,
    pub user_id: UserId,
    pub author_name: String,
    pub author_avatar_url: String,
    pub image_url: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// One page of the global feed plus the pre-pagination total.
#[derive(Debug, Clone, Serialize)]
pub struct FeedPage {
    pub posts: Vec<FeedPost>,
    pub total: i64,
}
