//! Authentication data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User ID type
pub type UserId = i64;

/// User model. The password hash never leaves the database layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub avatar_url: String,
    pub status: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Account role stored on the user record.
///
/// Privileges are granted through capability methods on this type rather
/// than by comparing identities against literals at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Moderator,
}

impl Role {
    /// Whether this role may see another user's full record, email included.
    pub fn can_view_full_profile(self) -> bool {
        matches!(self, Role::Moderator)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Moderator => "moderator",
        }
    }

    /// Parse the stored column value. Unknown values degrade to the
    /// unprivileged role.
    pub fn from_db(value: &str) -> Self {
        match value {
            "moderator" => Role::Moderator,
            _ => Role::User,
        }
    }
}

/// Access/refresh token pair returned by registration, login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// JWT claims for the access token.
///
/// `email` is present on tokens from initial issuance and absent on tokens
/// minted through the refresh endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

/// JWT claims for the refresh token. Carries only the subject identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: UserId,
    pub iat: i64,
    pub exp: i64,
}
