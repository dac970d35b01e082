//! Token service implementation.
//!
//! Issues, verifies, and refreshes the two-token session pair. The service
//! holds two disjoint signing secrets: access tokens and refresh tokens are
//! never interchangeable.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};

use super::{
    errors::{AuthError, AuthResult},
    models::{AccessClaims, RefreshClaims, SessionTokens, User, UserId},
};

/// Stateless JWT issuer/verifier for the session token pair
#[derive(Clone)]
pub struct TokenService {
    access_secret: String,
    refresh_secret: String,
    access_token_duration: Duration,
    refresh_token_duration: Duration,
    refreshed_access_duration: Duration,
}

impl TokenService {
    /// Create a new token service.
    ///
    /// # Arguments
    ///
    /// * `access_secret` - Signing secret for access tokens
    /// * `refresh_secret` - Signing secret for refresh tokens (disjoint)
    pub fn new(access_secret: String, refresh_secret: String) -> Self {
        Self {
            access_secret,
            refresh_secret,
            access_token_duration: Duration::days(30),
            refresh_token_duration: Duration::days(7),
            // Refresh-minted access tokens use a much shorter window than
            // initial issuance. The asymmetry is inherited product behavior;
            // do not unify without a product decision.
            refreshed_access_duration: Duration::minutes(15),
        }
    }

    /// Issue the access/refresh pair for a user.
    ///
    /// Access claims carry `{sub, email}` and expire after 30 days; refresh
    /// claims carry `{sub}` only and expire after 7 days. No side effects
    /// beyond signing.
    ///
    /// # Errors
    ///
    /// * `AuthError::TokenCreation` - Signing failed
    pub fn issue_session_tokens(&self, user: &User) -> AuthResult<SessionTokens> {
        let now = Utc::now();

        let access_claims = AccessClaims {
            sub: user.id,
            email: Some(user.email.clone()),
            iat: now.timestamp(),
            exp: (now + self.access_token_duration).timestamp(),
        };
        let access_token = encode(
            &Header::default(),
            &access_claims,
            &EncodingKey::from_secret(self.access_secret.as_bytes()),
        )
        .map_err(AuthError::TokenCreation)?;

        let refresh_claims = RefreshClaims {
            sub: user.id,
            iat: now.timestamp(),
            exp: (now + self.refresh_token_duration).timestamp(),
        };
        let refresh_token = encode(
            &Header::default(),
            &refresh_claims,
            &EncodingKey::from_secret(self.refresh_secret.as_bytes()),
        )
        .map_err(AuthError::TokenCreation)?;

        Ok(SessionTokens {
            access_token,
            refresh_token,
        })
    }

    /// Verify an access token.
    ///
    /// # Errors
    ///
    /// * `AuthError::TokenExpired` - Past its expiry
    /// * `AuthError::TokenInvalid` - Signature or format verification failed
    pub fn verify_access(&self, token: &str) -> AuthResult<AccessClaims> {
        let data = decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(self.access_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(map_decode_error)?;

        Ok(data.claims)
    }

    /// Verify a refresh token against the refresh secret.
    ///
    /// # Errors
    ///
    /// * `AuthError::TokenExpired` - Past its expiry
    /// * `AuthError::TokenInvalid` - Signature or format verification failed
    pub fn verify_refresh(&self, token: &str) -> AuthResult<RefreshClaims> {
        let data = decode::<RefreshClaims>(
            token,
            &DecodingKey::from_secret(self.refresh_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(map_decode_error)?;

        Ok(data.claims)
    }

    /// Mint a new access token from a valid refresh token.
    ///
    /// The new token carries `{sub}` only (no email) and a 15-minute expiry.
    /// The refresh token itself is not rotated and remains usable until its
    /// own expiry.
    ///
    /// # Errors
    ///
    /// * `AuthError::TokenExpired` / `AuthError::TokenInvalid` - Refresh
    ///   token verification failed
    /// * `AuthError::TokenCreation` - Signing failed
    pub fn refresh_access(&self, refresh_token: &str) -> AuthResult<String> {
        let claims = self.verify_refresh(refresh_token)?;
        self.mint_refreshed_access(claims.sub)
    }

    fn mint_refreshed_access(&self, user_id: UserId) -> AuthResult<String> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: user_id,
            email: None,
            iat: now.timestamp(),
            exp: (now + self.refreshed_access_duration).timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.access_secret.as_bytes()),
        )
        .map_err(AuthError::TokenCreation)
    }
}

fn map_decode_error(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::TokenInvalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_user() -> User {
        User {
            id: 42,
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            avatar_url: String::new(),
            status: String::new(),
            role: super::super::models::Role::User,
            created_at: Utc::now(),
        }
    }

    fn service() -> TokenService {
        TokenService::new(
            "access_secret_for_tests".to_string(),
            "refresh_secret_for_tests".to_string(),
        )
    }

    #[test]
    fn issue_and_verify_roundtrip() {
        let svc = service();
        let user = test_user();

        let tokens = svc.issue_session_tokens(&user).unwrap();

        let access = svc.verify_access(&tokens.access_token).unwrap();
        assert_eq!(access.sub, user.id);
        assert_eq!(access.email.as_deref(), Some("test@example.com"));
        assert_eq!(access.exp - access.iat, 30 * 24 * 3600);

        let refresh = svc.verify_refresh(&tokens.refresh_token).unwrap();
        assert_eq!(refresh.sub, user.id);
        assert_eq!(refresh.exp - refresh.iat, 7 * 24 * 3600);
    }

    #[test]
    fn secrets_are_disjoint() {
        let svc = service();
        let tokens = svc.issue_session_tokens(&test_user()).unwrap();

        // An access token must not verify as a refresh token or vice versa.
        assert!(matches!(
            svc.verify_refresh(&tokens.access_token),
            Err(AuthError::TokenInvalid)
        ));
        assert!(matches!(
            svc.verify_access(&tokens.refresh_token),
            Err(AuthError::TokenInvalid)
        ));
    }

    #[test]
    fn refreshed_access_token_drops_email_and_shortens_expiry() {
        let svc = service();
        let tokens = svc.issue_session_tokens(&test_user()).unwrap();

        let new_access = svc.refresh_access(&tokens.refresh_token).unwrap();
        let claims = svc.verify_access(&new_access).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.email, None);
        assert_eq!(claims.exp - claims.iat, 15 * 60);

        // No rotation: the same refresh token works again immediately.
        assert!(svc.refresh_access(&tokens.refresh_token).is_ok());
    }

    #[test]
    fn expired_access_token_is_distinguished() {
        let svc = service();
        let now = Utc::now();
        // Well past the default validation leeway.
        let claims = AccessClaims {
            sub: 42,
            email: None,
            iat: (now - Duration::hours(2)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(svc.access_secret.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            svc.verify_access(&token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn tampered_token_is_invalid() {
        let svc = service();
        let tokens = svc.issue_session_tokens(&test_user()).unwrap();

        let mut tampered = tokens.access_token.clone();
        tampered.pop();
        tampered.push('x');

        assert!(matches!(
            svc.verify_access(&tampered),
            Err(AuthError::TokenInvalid)
        ));
        assert!(matches!(
            svc.verify_access("not.a.jwt"),
            Err(AuthError::TokenInvalid)
        ));
    }
}
