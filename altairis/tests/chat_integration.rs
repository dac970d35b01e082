//! Integration tests for the chat append log.

use altairis::auth::{AuthManager, TokenService, User};
use altairis::chat::{ChatError, ChatManager};
use altairis::db::{Database, DatabaseConfig};
use altairis::profile::ProfileManager;
use sqlx::PgPool;
use std::sync::Arc;

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

async fn setup_managers() -> (Arc<PgPool>, AuthManager, ChatManager) {
    let pool = setup_test_db().await;
    let tokens = Arc::new(TokenService::new(
        "access_secret_for_integration_tests".to_string(),
        "refresh_secret_for_integration_tests".to_string(),
    ));
    let auth = AuthManager::new(pool.clone(), "test_pepper".to_string(), tokens);
    let chats = ChatManager::new(pool.clone());
    (pool, auth, chats)
}

async fn register_user(auth: &AuthManager, name: &str) -> User {
    let rand_id: u32 = rand::random();
    let email = format!("{}_{}@example.com", name, rand_id % 1_000_000);
    let (user, _) = auth
        .register(name.to_string(), email, "Pass123!".to_string())
        .await
        .expect("Registration should succeed");
    user
}

#[tokio::test]
async fn test_messages_converge_on_one_chat() {
    let (_pool, auth, chats) = setup_managers().await;
    let alice = register_user(&auth, "alice_chat").await;
    let bob = register_user(&auth, "bob_chat").await;

    // Either side initiating must land in the same chat.
    let first = chats
        .send_message(alice.id, bob.id, "hi")
        .await
        .expect("First message should succeed");
    let second = chats
        .send_message(bob.id, alice.id, "yo")
        .await
        .expect("Second message should succeed");

    assert_eq!(first.chat_id, second.chat_id, "One chat per unordered pair");

    let alice_chats = chats.list_chats(alice.id).await.unwrap();
    let chat = alice_chats
        .iter()
        .find(|c| c.id == first.chat_id)
        .expect("Chat should appear in the sender's listing");

    assert_eq!(chat.messages.len(), 2);
    assert_eq!(chat.messages[0].body, "hi");
    assert_eq!(chat.messages[1].body, "yo");
    assert_eq!(chat.messages[0].sender_id, alice.id);
    assert_eq!(chat.messages[1].sender_id, bob.id);

    let participant_ids: Vec<i64> = chat.participants.iter().map(|p| p.id).collect();
    assert!(participant_ids.contains(&alice.id));
    assert!(participant_ids.contains(&bob.id));
}

#[tokio::test]
async fn test_concurrent_first_messages_create_one_chat() {
    let (_pool, auth, chats) = setup_managers().await;
    let chats = Arc::new(chats);
    let a = register_user(&auth, "race_a").await.id;
    let b = register_user(&auth, "race_b").await.id;

    // Two concurrent first messages between the pair: the upsert keyed by
    // the canonical sorted pair must converge on a single chat row.
    let chats_1 = Arc::clone(&chats);
    let chats_2 = Arc::clone(&chats);
    let (m1, m2) = tokio::join!(
        tokio::spawn(async move { chats_1.send_message(a, b, "first").await }),
        tokio::spawn(async move { chats_2.send_message(b, a, "also first").await }),
    );

    let m1 = m1.unwrap().expect("Concurrent send should succeed");
    let m2 = m2.unwrap().expect("Concurrent send should succeed");
    assert_eq!(m1.chat_id, m2.chat_id, "Both messages share one chat");
}

#[tokio::test]
async fn test_message_validation() {
    let (_pool, auth, chats) = setup_managers().await;
    let user = register_user(&auth, "validator").await;
    let other = register_user(&auth, "validatee").await;

    let result = chats.send_message(user.id, other.id, "").await;
    assert!(matches!(result.unwrap_err(), ChatError::EmptyMessage));

    let result = chats.send_message(user.id, user.id, "talking to myself").await;
    assert!(matches!(result.unwrap_err(), ChatError::SelfMessage));
}

#[tokio::test]
async fn test_deleted_participant_is_tombstoned() {
    let (pool, auth, chats) = setup_managers().await;
    let keeper = register_user(&auth, "keeper").await;
    let leaver = register_user(&auth, "leaver").await;

    chats
        .send_message(leaver.id, keeper.id, "goodbye")
        .await
        .expect("Message should succeed");

    let profiles = ProfileManager::new(pool);
    profiles
        .delete_account(leaver.id)
        .await
        .expect("Account deletion should succeed");

    // The chat survives account deletion; the missing participant resolves
    // to a placeholder instead of dropping the chat.
    let listing = chats.list_chats(keeper.id).await.unwrap();
    let chat = listing
        .iter()
        .find(|c| c.participants.iter().any(|p| p.id == leaver.id))
        .expect("Orphaned chat should still be listed");

    let ghost = chat
        .participants
        .iter()
        .find(|p| p.id == leaver.id)
        .unwrap();
    assert_eq!(ghost.name, "Deleted user");
    assert!(ghost.avatar_url.is_empty());
    assert_eq!(chat.messages.len(), 1, "Messages are not scrubbed");
}
