//! Authentication API handlers.
//!
//! HTTP endpoints for user registration, login, and access-token refresh.
//!
//! # Examples
//!
//! Register a new account:
//! ```bash
//! curl -X POST http://localhost:5005/register \
//!   -H "Content-Type: application/json" \
//!   -d '{"name": "Ada", "email": "ada@example.com", "password": "hunter22"}'
//! ```
//!
//! Refresh an access token:
//! ```bash
//! curl -X POST http://localhost:5005/refresh-token \
//!   -H "Content-Type: application/json" \
//!   -d '{"refreshToken": "eyJhbGciOiJIUzI1NiIs..."}'
//! ```

use altairis::auth::AuthError;
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState, error};
use crate::{logging, metrics};

#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

/// Token pair returned by register and login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub success: bool,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshPayload {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub success: bool,
    pub access_token: String,
}

/// Register a new user account and issue its first session token pair.
///
/// The email is lowercased before storage; uniqueness is enforced
/// atomically by the store.
///
/// # Errors
///
/// - `400 Bad Request`: email already in use, or blank email/password
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<Json<SessionResponse>, ApiError> {
    match state
        .auth
        .register(payload.name, payload.email, payload.password)
        .await
    {
        Ok((_user, tokens)) => {
            metrics::registrations_total(true);
            Ok(Json(SessionResponse {
                success: true,
                access_token: tokens.access_token,
                refresh_token: tokens.refresh_token,
            }))
        }
        Err(e) => {
            metrics::registrations_total(false);
            Err(match e {
                AuthError::EmailTaken => error(StatusCode::BAD_REQUEST, "Email already in use"),
                AuthError::InvalidInput(_) => {
                    error(StatusCode::BAD_REQUEST, e.client_message())
                }
                // The original surface reports creation failures as 400.
                _ => {
                    tracing::error!("registration failed: {e}");
                    error(StatusCode::BAD_REQUEST, "Registration error")
                }
            })
        }
    }
}

/// Authenticate with email and password.
///
/// Unknown email and wrong password both produce `401` but keep their
/// distinct messages.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<SessionResponse>, ApiError> {
    match state.auth.login(&payload.email, &payload.password).await {
        Ok((_user, tokens)) => {
            metrics::login_attempts_total(true);
            Ok(Json(SessionResponse {
                success: true,
                access_token: tokens.access_token,
                refresh_token: tokens.refresh_token,
            }))
        }
        Err(e) => {
            metrics::login_attempts_total(false);
            Err(match e {
                AuthError::EmailNotFound => {
                    logging::log_security_event("failed_login", None, "Email not found");
                    error(StatusCode::UNAUTHORIZED, "Email not found")
                }
                AuthError::InvalidPassword => {
                    logging::log_security_event("failed_login", None, "Invalid password attempt");
                    error(StatusCode::UNAUTHORIZED, "Invalid password")
                }
                _ => {
                    tracing::error!("login failed: {e}");
                    error(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
                }
            })
        }
    }
}

/// Mint a new access token from a refresh token.
///
/// The new access token carries the subject only (no email) and a 15-minute
/// expiry; the refresh token itself stays valid until its own expiry.
///
/// # Errors
///
/// - `401 Unauthorized`: no refresh token in the body
/// - `403 Forbidden`: invalid or expired refresh token
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(payload): Json<RefreshPayload>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let Some(refresh_token) = payload.refresh_token.filter(|t| !t.is_empty()) else {
        metrics::token_refreshes_total(false);
        return Err(error(StatusCode::UNAUTHORIZED, "No refresh token provided"));
    };

    match state.tokens.refresh_access(&refresh_token) {
        Ok(access_token) => {
            metrics::token_refreshes_total(true);
            Ok(Json(RefreshResponse {
                success: true,
                access_token,
            }))
        }
        Err(e) => {
            metrics::token_refreshes_total(false);
            Err(match e {
                AuthError::TokenExpired | AuthError::TokenInvalid => {
                    logging::log_security_event(
                        "rejected_refresh_token",
                        None,
                        &e.client_message(),
                    );
                    error(
                        StatusCode::FORBIDDEN,
                        "Failed to authenticate refresh token",
                    )
                }
                _ => {
                    tracing::error!("token refresh failed: {e}");
                    error(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
                }
            })
        }
    }
}
