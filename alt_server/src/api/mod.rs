//! HTTP/JSON API for the social profile server.
//!
//! # Architecture
//!
//! - **Axum**: async web framework
//! - **Tower**: middleware for CORS and request observability
//! - **JWT**: two-token authentication (access/refresh, disjoint secrets)
//!
//! # Modules
//!
//! - [`auth`]: registration, login, token refresh
//! - [`profile`]: profile projections, email/status/avatar updates, account deletion
//! - [`posts`]: post creation/deletion and the global feed
//! - [`chat`]: two-party chats
//! - [`middleware`]: the session guard applied to every protected route
//! - [`request_id`]: request correlation and HTTP metrics
//!
//! # Endpoints Overview
//!
//! ```text
//! GET    /                        - Liveness text (public)
//! GET    /health                  - Health status (public)
//! POST   /register                - Register user (public)
//! POST   /login                   - Login (public)
//! POST   /refresh-token           - Mint new access token (public)
//! GET    /posts?page&limit        - Global feed (public)
//! GET    /user-profile/{user_id}  - View a profile (optional bearer)
//! GET    /profile                 - Own profile (bearer)
//! PATCH  /upload-avatar           - Replace avatar (bearer)
//! PATCH  /update-email            - Change email (bearer)
//! PATCH  /update-status           - Change status text (bearer)
//! DELETE /delete-account          - Delete account (bearer)
//! POST   /create-post             - Create post (bearer)
//! DELETE /delete-post             - Delete own post (bearer)
//! GET    /chats                   - List chats (bearer)
//! POST   /send-message            - Send chat message (bearer)
//! ```

pub mod auth;
pub mod chat;
pub mod middleware;
pub mod posts;
pub mod profile;
pub mod request_id;

use altairis::{
    auth::{AuthManager, TokenService},
    chat::ChatManager,
    profile::ProfileManager,
};
use axum::{
    Router,
    extract::State,
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Json},
    routing::{delete, get, patch, post},
};
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::storage::ObjectStorage;

/// Application state shared across all HTTP handlers.
///
/// Cloned per request (cheap due to Arc wrappers).
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthManager>,
    pub profiles: Arc<ProfileManager>,
    pub chats: Arc<ChatManager>,
    pub tokens: Arc<TokenService>,
    pub storage: Arc<dyn ObjectStorage>,
    pub pool: Arc<PgPool>,
}

/// Error body shared by every failing endpoint: `{success: false, message}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

/// Error half of every handler's return type.
pub type ApiError = (StatusCode, Json<ErrorBody>);

/// Build the uniform error response.
pub fn error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorBody {
            success: false,
            message: message.into(),
        }),
    )
}

/// Create the complete API router with all endpoints and middleware.
///
/// Protected routes share ONE session-guard middleware; handlers receive the
/// already-authenticated identity from request extensions. `allowed_origins`
/// configures CORS; an empty list falls back to a permissive policy for
/// development.
pub fn create_router(state: AppState, allowed_origins: &[String]) -> Router {
    let public_routes = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh-token", post(auth::refresh_token))
        .route("/posts", get(posts::list_feed))
        // Optional bearer: the handler resolves auth through MaybeAuthUser,
        // which runs the same verification path as the guard.
        .route("/user-profile/{user_id}", get(profile::view_user_profile));

    let protected_routes = Router::new()
        .route("/profile", get(profile::own_profile))
        .route("/upload-avatar", patch(profile::upload_avatar))
        .route("/update-email", patch(profile::update_email))
        .route("/update-status", patch(profile::update_status))
        .route("/delete-account", delete(profile::delete_account))
        .route("/create-post", post(posts::create_post))
        .route("/delete-post", delete(posts::delete_post))
        .route("/chats", get(chat::list_chats))
        .route("/send-message", post(chat::send_message))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(axum::middleware::from_fn(
            request_id::observability_middleware,
        ))
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Liveness probe kept from the original surface.
async fn root() -> &'static str {
    "Server is running"
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the database answers, `503` otherwise.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = sqlx::query("SELECT 1")
        .fetch_one(state.pool.as_ref())
        .await
        .is_ok();

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
