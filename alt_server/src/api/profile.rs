//! Profile API handlers.
//!
//! Own-profile retrieval, viewing other users, email/status updates, avatar
//! upload, and account deletion. All except `view_user_profile` sit behind
//! the session guard; `view_user_profile` accepts an optional bearer token.

use altairis::profile::{Post, Profile, ProfileError, ProfileView, PublicProfile};
use axum::{
    Json,
    extract::{Extension, Multipart, Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    ApiError, AppState, error,
    middleware::{AuthUser, MaybeAuthUser},
};

/// Post as it appears on the wire.
#[derive(Debug, Serialize)]
pub struct PostPayload {
    pub id: i64,
    pub image: String,
    pub description: String,
    pub date: DateTime<Utc>,
}

impl From<Post> for PostPayload {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            image: post.image_url,
            description: post.description,
            date: post.created_at,
        }
    }
}

/// User as it appears on the wire. `email` is omitted from restricted
/// projections.
#[derive(Debug, Serialize)]
pub struct UserPayload {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub avatar: String,
    pub status: String,
    pub posts: Vec<PostPayload>,
}

impl UserPayload {
    fn from_profile(profile: Profile) -> Self {
        Self {
            id: profile.id,
            name: profile.name,
            email: Some(profile.email),
            avatar: profile.avatar_url,
            status: profile.status,
            posts: profile.posts.into_iter().map(Into::into).collect(),
        }
    }

    fn from_public(profile: PublicProfile) -> Self {
        Self {
            id: profile.id,
            name: profile.name,
            email: None,
            avatar: profile.avatar_url,
            status: profile.status,
            posts: profile.posts.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub success: bool,
    pub user: UserPayload,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SameUserResponse {
    pub success: bool,
    pub same_user: bool,
}

/// Either a profile projection or the same-user sentinel.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ViewProfileResponse {
    User(UserResponse),
    SameUser(SameUserResponse),
}

#[derive(Debug, Deserialize)]
pub struct UpdateEmailPayload {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusPayload {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdateEmailResponse {
    pub success: bool,
    pub message: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateStatusResponse {
    pub success: bool,
    pub message: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct AvatarResponse {
    pub success: bool,
    pub avatar: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteAccountResponse {
    pub success: bool,
    pub message: String,
}

/// The caller's own profile, password hash excluded.
pub async fn own_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserResponse>, ApiError> {
    let profile = state
        .profiles
        .own_profile(user.id)
        .await
        .map_err(profile_error)?;

    Ok(Json(UserResponse {
        success: true,
        user: UserPayload::from_profile(profile),
    }))
}

/// View another user's profile.
///
/// Anonymous and unprivileged viewers get the restricted projection (no
/// email); a viewer whose stored role grants the capability gets the full
/// record; a viewer requesting their own id gets `{"sameUser": true}` and is
/// expected to redirect to the own-profile view.
pub async fn view_user_profile(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(user_id): Path<i64>,
) -> Result<Json<ViewProfileResponse>, ApiError> {
    let view = state
        .profiles
        .view_profile(user_id, viewer.map(|v| v.id))
        .await
        .map_err(profile_error)?;

    let response = match view {
        ProfileView::SameUser => ViewProfileResponse::SameUser(SameUserResponse {
            success: true,
            same_user: true,
        }),
        ProfileView::Restricted(profile) => ViewProfileResponse::User(UserResponse {
            success: true,
            user: UserPayload::from_public(profile),
        }),
        ProfileView::Full(profile) => ViewProfileResponse::User(UserResponse {
            success: true,
            user: UserPayload::from_profile(profile),
        }),
    };

    Ok(Json(response))
}

/// Change the caller's email.
///
/// # Errors
///
/// - `400 Bad Request`: missing/blank email, or email already in use
/// - `404 Not Found`: account no longer exists
pub async fn update_email(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<UpdateEmailPayload>,
) -> Result<Json<UpdateEmailResponse>, ApiError> {
    let Some(email) = payload.email else {
        return Err(error(StatusCode::BAD_REQUEST, "Invalid email"));
    };

    let email = state
        .profiles
        .update_email(user.id, &email)
        .await
        .map_err(profile_error)?;

    Ok(Json(UpdateEmailResponse {
        success: true,
        message: "Email updated successfully".to_string(),
        email,
    }))
}

/// Change the caller's free-text status.
pub async fn update_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<Json<UpdateStatusResponse>, ApiError> {
    let Some(status) = payload.status else {
        return Err(error(StatusCode::BAD_REQUEST, "Invalid status"));
    };

    let status = state
        .profiles
        .update_status(user.id, &status)
        .await
        .map_err(profile_error)?;

    Ok(Json(UpdateStatusResponse {
        success: true,
        message: "Status updated successfully".to_string(),
        status,
    }))
}

/// Replace the caller's avatar.
///
/// Accepts a multipart form with an `avatar` file field, stores the bytes
/// with the object-storage collaborator, and saves the returned durable URL
/// verbatim on the record.
pub async fn upload_avatar(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<Json<AvatarResponse>, ApiError> {
    let mut upload: Option<(String, axum::body::Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| error(StatusCode::BAD_REQUEST, "Malformed upload"))?
    {
        if field.name() == Some("avatar") {
            let filename = field.file_name().unwrap_or("avatar").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|_| error(StatusCode::BAD_REQUEST, "Malformed upload"))?;
            upload = Some((filename, bytes));
        }
    }

    let Some((filename, bytes)) = upload else {
        return Err(error(StatusCode::BAD_REQUEST, "No file uploaded"));
    };

    let url = state
        .storage
        .put("avatars", &filename, bytes)
        .await
        .map_err(|e| {
            tracing::error!("avatar upload failed: {e}");
            error(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
        })?;

    let avatar = state
        .profiles
        .update_avatar(user.id, &url)
        .await
        .map_err(profile_error)?;

    Ok(Json(AvatarResponse {
        success: true,
        avatar,
    }))
}

/// Hard-delete the caller's account.
///
/// Posts go with the record; chats and messages are left in place and
/// resolve to a tombstone participant in listings.
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DeleteAccountResponse>, ApiError> {
    state
        .profiles
        .delete_account(user.id)
        .await
        .map_err(profile_error)?;

    Ok(Json(DeleteAccountResponse {
        success: true,
        message: "Account deleted successfully".to_string(),
    }))
}

/// Map library profile errors onto the HTTP taxonomy.
pub(super) fn profile_error(e: ProfileError) -> ApiError {
    match e {
        ProfileError::UserNotFound => error(StatusCode::NOT_FOUND, "User not found"),
        ProfileError::PostNotFound => error(StatusCode::NOT_FOUND, "Post not found"),
        ProfileError::EmailTaken => error(StatusCode::BAD_REQUEST, "Email already in use"),
        ProfileError::InvalidEmail => error(StatusCode::BAD_REQUEST, "Invalid email"),
        ProfileError::Database(err) => {
            tracing::error!("profile operation failed: {err}");
            error(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
        }
    }
}
