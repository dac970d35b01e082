//! Session guard for protected endpoints.
//!
//! ONE middleware guards every protected route: it extracts the bearer token
//! from the `Authorization` header, verifies it through the token service,
//! and injects the authenticated identity into request extensions. Handlers
//! never re-implement token handling inline.
//!
//! # Extracting the identity
//!
//! ```rust,no_run
//! use axum::extract::Extension;
//! use alt_server::api::middleware::AuthUser;
//!
//! async fn protected_handler(Extension(user): Extension<AuthUser>) -> String {
//!     format!("Authenticated as user {}", user.id)
//! }
//! # let _ = protected_handler;
//! ```

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use super::{ApiError, AppState, error};
use crate::logging;

/// Authenticated identity injected into request extensions by the guard.
///
/// `email` mirrors the access-token claims: present on tokens from initial
/// issuance, absent on refresh-minted ones.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: i64,
    pub email: Option<String>,
}

/// Session-guard middleware.
///
/// # Behavior
///
/// - Missing header → `401 {"success":false,"message":"No token provided"}`
/// - Invalid or expired token → `403 "Failed to authenticate token"`
/// - Valid token → [`AuthUser`] injected, next handler runs
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "No token provided"))?;

    match state.tokens.verify_access(token) {
        Ok(claims) => {
            request.extensions_mut().insert(AuthUser {
                id: claims.sub,
                email: claims.email,
            });
            Ok(next.run(request).await)
        }
        Err(e) => {
            logging::log_security_event("rejected_token", None, &e.client_message());
            Err(error(StatusCode::FORBIDDEN, "Failed to authenticate token"))
        }
    }
}

/// Optional-auth extractor for endpoints that serve both anonymous and
/// authenticated viewers.
///
/// Runs the SAME verification path as [`auth_middleware`]: no header yields
/// an anonymous request, but a header that fails verification is still
/// rejected with 403 rather than silently downgraded.
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            return Ok(MaybeAuthUser(None));
        };

        match state.tokens.verify_access(token) {
            Ok(claims) => Ok(MaybeAuthUser(Some(AuthUser {
                id: claims.sub,
                email: claims.email,
            }))),
            Err(e) => {
                logging::log_security_event("rejected_token", None, &e.client_message());
                Err(error(StatusCode::FORBIDDEN, "Failed to authenticate token"))
            }
        }
    }
}

fn bearer_token(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue};

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn test_bearer_token_missing_or_malformed() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);
    }
}
