//! Integration tests for registration, login, and the token lifecycle.

use altairis::auth::{AuthError, AuthManager, TokenService};
use altairis::db::{Database, DatabaseConfig};
use sqlx::PgPool;
use std::sync::Arc;

/// Helper to create a test database pool
async fn setup_test_db() -> Arc<PgPool> {
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://postgres@localhost/altairis_test".to_string());

    let config = DatabaseConfig {
        database_url,
        max_connections: 5,
        min_connections: 1,
        connection_timeout_secs: 5,
        idle_timeout_secs: 300,
        max_lifetime_secs: 1800,
    };

    let db = Database::new(&config)
        .await
        .expect("Failed to create test database");
    db.migrate().await.expect("Failed to run migrations");

    Arc::new(db.pool().clone())
}

/// Helper to create a test auth manager
async fn setup_auth_manager() -> AuthManager {
    let pool = setup_test_db().await;
    let tokens = Arc::new(TokenService::new(
        "access_secret_for_integration_tests".to_string(),
        "refresh_secret_for_integration_tests".to_string(),
    ));
    AuthManager::new(pool, "test_pepper".to_string(), tokens)
}

/// Generate a unique email so tests don't collide
fn unique_email(prefix: &str) -> String {
    let rand_id: u32 = rand::random();
    format!("{}_{}@example.com", prefix, rand_id % 1_000_000)
}

#[tokio::test]
async fn test_register_new_user() {
    let auth = setup_auth_manager().await;
    let email = unique_email("register");

    let (user, tokens) = auth
        .register("Test User".to_string(), email.clone(), "Pass123!".to_string())
        .await
        .expect("Registration should succeed");

    assert!(user.id > 0, "User ID should be positive");
    assert_eq!(user.email, email);
    assert!(user.avatar_url.is_empty());
    assert!(user.status.is_empty());

    // The returned tokens resolve to the created record's identity.
    let claims = auth
        .tokens()
        .verify_access(&tokens.access_token)
        .expect("Access token should verify");
    assert_eq!(claims.sub, user.id);
    assert_eq!(claims.email.as_deref(), Some(email.as_str()));

    let refresh_claims = auth
        .tokens()
        .verify_refresh(&tokens.refresh_token)
        .expect("Refresh token should verify");
    assert_eq!(refresh_claims.sub, user.id);
}

#[tokio::test]
async fn test_register_normalizes_email_case() {
    let auth = setup_auth_manager().await;
    let email = unique_email("Mixed_Case");

    let (user, _) = auth
        .register(
            "Case User".to_string(),
            email.to_uppercase(),
            "Pass123!".to_string(),
        )
        .await
        .expect("Registration should succeed");

    assert_eq!(user.email, email.to_lowercase());
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let auth = setup_auth_manager().await;
    let email = unique_email("duplicate");

    auth.register("First".to_string(), email.clone(), "Pass123!".to_string())
        .await
        .expect("First registration should succeed");

    // Case-insensitive duplicate: normalization makes these collide.
    let result = auth
        .register("Second".to_string(), email.to_uppercase(), "Other456!".to_string())
        .await;

    assert!(
        matches!(result.unwrap_err(), AuthError::EmailTaken),
        "Should return EmailTaken error"
    );
}

#[tokio::test]
async fn test_register_blank_input_rejected() {
    let auth = setup_auth_manager().await;

    let result = auth
        .register("Blank".to_string(), "   ".to_string(), "Pass123!".to_string())
        .await;
    assert!(matches!(result.unwrap_err(), AuthError::InvalidInput(_)));

    let result = auth
        .register("Blank".to_string(), unique_email("blankpw"), String::new())
        .await;
    assert!(matches!(result.unwrap_err(), AuthError::InvalidInput(_)));
}

#[tokio::test]
async fn test_concurrent_registrations_same_email() {
    let auth = Arc::new(setup_auth_manager().await);
    let email = unique_email("concurrent");

    // Both tasks pass any in-process check simultaneously; the unique index
    // must let exactly one INSERT through.
    let mut handles = vec![];
    for i in 0..2 {
        let auth_clone = Arc::clone(&auth);
        let email_clone = email.clone();
        handles.push(tokio::spawn(async move {
            auth_clone
                .register(format!("Racer {i}"), email_clone, "Pass123!".to_string())
                .await
        }));
    }

    let mut ok_count = 0;
    let mut taken_count = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => ok_count += 1,
            Err(AuthError::EmailTaken) => taken_count += 1,
            Err(e) => panic!("Unexpected error: {e}"),
        }
    }

    assert_eq!(ok_count, 1, "Exactly one registration should succeed");
    assert_eq!(taken_count, 1, "The loser should observe EmailTaken");
}

#[tokio::test]
async fn test_login_success() {
    let auth = setup_auth_manager().await;
    let email = unique_email("login");

    auth.register("Login User".to_string(), email.clone(), "Pass123!".to_string())
        .await
        .expect("Registration should succeed");

    let (user, tokens) = auth
        .login(&email, "Pass123!")
        .await
        .expect("Login should succeed");

    assert_eq!(user.email, email);
    assert!(!tokens.access_token.is_empty());
    assert!(!tokens.refresh_token.is_empty());
}

#[tokio::test]
async fn test_login_wrong_password() {
    let auth = setup_auth_manager().await;
    let email = unique_email("wrongpw");

    auth.register("PW User".to_string(), email.clone(), "Correct123!".to_string())
        .await
        .expect("Registration should succeed");

    let result = auth.login(&email, "Wrong456!").await;

    assert!(
        matches!(result.unwrap_err(), AuthError::InvalidPassword),
        "Should return InvalidPassword error"
    );
}

#[tokio::test]
async fn test_login_unknown_email() {
    let auth = setup_auth_manager().await;

    let result = auth
        .login(&unique_email("never_registered"), "Whatever1!")
        .await;

    assert!(
        matches!(result.unwrap_err(), AuthError::EmailNotFound),
        "Should return EmailNotFound error"
    );
}

#[tokio::test]
async fn test_refresh_token_flow() {
    let auth = setup_auth_manager().await;
    let email = unique_email("refresh");

    let (user, tokens) = auth
        .register("Refresh User".to_string(), email, "Pass123!".to_string())
        .await
        .expect("Registration should succeed");

    let new_access = auth
        .tokens()
        .refresh_access(&tokens.refresh_token)
        .expect("Token refresh should succeed");

    let claims = auth
        .tokens()
        .verify_access(&new_access)
        .expect("Refreshed access token should verify");
    assert_eq!(claims.sub, user.id, "Claims resolve to the same subject");
    assert_eq!(claims.email, None, "Refresh-minted tokens carry no email");

    // No rotation: the original refresh token remains usable immediately.
    auth.tokens()
        .refresh_access(&tokens.refresh_token)
        .expect("Refresh token should remain valid after use");
}
