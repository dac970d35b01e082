//! Post and feed API handlers.
//!
//! Post creation (multipart image + description), deletion scoped to the
//! caller's own posts, and the public cross-user feed.

use altairis::profile::FeedPost;
use axum::{
    Json,
    extract::{Extension, Multipart, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    ApiError, AppState, error,
    middleware::AuthUser,
    profile::{PostPayload, profile_error},
};
use crate::metrics;

const DEFAULT_FEED_PAGE: i64 = 1;
const DEFAULT_FEED_LIMIT: i64 = 10;

#[derive(Debug, Serialize)]
pub struct CreatePostResponse {
    pub success: bool,
    pub post: PostPayload,
}

#[derive(Debug, Deserialize)]
pub struct DeletePostPayload {
    #[serde(default)]
    pub id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct DeletePostResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct FeedParams {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Feed entry as it appears on the wire: a post plus its resolved author.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPostPayload {
    pub id: i64,
    pub user_id: i64,
    pub author_name: String,
    pub author_avatar: String,
    pub image: String,
    pub description: String,
    pub date: DateTime<Utc>,
}

impl From<FeedPost> for FeedPostPayload {
    fn from(post: FeedPost) -> Self {
        Self {
            id: post.id,
            user_id: post.user_id,
            author_name: post.author_name,
            author_avatar: post.author_avatar_url,
            image: post.image_url,
            description: post.description,
            date: post.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub success: bool,
    pub posts: Vec<FeedPostPayload>,
    pub total: i64,
}

/// Create a post from a multipart form with an `image` file field and a
/// `description` text field.
///
/// An empty description is allowed; an absent one is not. The image bytes go
/// to the object-storage collaborator and only the durable URL is stored.
///
/// # Errors
///
/// - `400 Bad Request`: missing image or description
/// - `404 Not Found`: account no longer exists
pub async fn create_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<CreatePostResponse>), ApiError> {
    let mut image: Option<(String, axum::body::Bytes)> = None;
    let mut description: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| error(StatusCode::BAD_REQUEST, "Malformed upload"))?
    {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("image") => {
                let filename = field.file_name().unwrap_or("image").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| error(StatusCode::BAD_REQUEST, "Malformed upload"))?;
                image = Some((filename, bytes));
            }
            Some("description") => {
                description = Some(field.text().await.map_err(|_| {
                    error(StatusCode::BAD_REQUEST, "Malformed upload")
                })?);
            }
            _ => {}
        }
    }

    let (Some((filename, bytes)), Some(description)) = (image, description) else {
        return Err(error(
            StatusCode::BAD_REQUEST,
            "Missing image or description",
        ));
    };

    let image_url = state
        .storage
        .put("posts", &filename, bytes)
        .await
        .map_err(|e| {
            tracing::error!("post image upload failed: {e}");
            error(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
        })?;

    let post = state
        .profiles
        .create_post(user.id, &image_url, &description)
        .await
        .map_err(profile_error)?;

    metrics::posts_created_total();
    Ok((
        StatusCode::CREATED,
        Json(CreatePostResponse {
            success: true,
            post: post.into(),
        }),
    ))
}

/// Delete one of the caller's own posts by id.
///
/// A non-owner deleting an existing post id gets `404`: deletion is scoped
/// to the caller's record, never another user's.
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<DeletePostPayload>,
) -> Result<Json<DeletePostResponse>, ApiError> {
    let Some(post_id) = payload.id else {
        return Err(error(StatusCode::BAD_REQUEST, "Post id is required"));
    };

    state
        .profiles
        .delete_post(user.id, post_id)
        .await
        .map_err(profile_error)?;

    Ok(Json(DeletePostResponse {
        success: true,
        message: "Post deleted successfully".to_string(),
    }))
}

/// The global feed: every user's posts, newest first.
///
/// Defaults to `page=1`, `limit=10`. The limit is deliberately unbounded
/// above, so a caller may fetch the entire feed in one page. The response
/// carries the total count before pagination.
pub async fn list_feed(
    State(state): State<AppState>,
    Query(params): Query<FeedParams>,
) -> Result<Json<FeedResponse>, ApiError> {
    let page = params.page.unwrap_or(DEFAULT_FEED_PAGE);
    let limit = params.limit.unwrap_or(DEFAULT_FEED_LIMIT);

    let feed = state.profiles.list_feed(page, limit).await.map_err(|e| {
        tracing::error!("feed query failed: {e}");
        error(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
    })?;

    Ok(Json(FeedResponse {
        success: true,
        posts: feed.posts.into_iter().map(Into::into).collect(),
        total: feed.total,
    }))
}
