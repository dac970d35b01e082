//! Profile manager implementation.

use sqlx::{PgPool, Row, postgres::PgRow};
use std::sync::Arc;

use super::{
    errors::{ProfileError, ProfileResult},
    models::{FeedPage, FeedPost, Post, Profile, ProfileView, PublicProfile},
};
use crate::auth::{User, UserId, manager::user_from_row};

/// Profile manager: projections, posts, the global feed, account deletion.
#[derive(Clone)]
pub struct ProfileManager {
    pool: Arc<PgPool>,
}

impl ProfileManager {
    /// Create a new profile manager
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Fetch a user record by id. The password hash is not part of the model.
    pub async fn find_user(&self, user_id: UserId) -> ProfileResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, avatar_url, status, role, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(|r| user_from_row(&r)))
    }

    /// The caller's own profile, posts included.
    ///
    /// # Errors
    ///
    /// * `ProfileError::UserNotFound` - No record for the subject
    pub async fn own_profile(&self, subject: UserId) -> ProfileResult<Profile> {
        let user = self
            .find_user(subject)
            .await?
            .ok_or(ProfileError::UserNotFound)?;
        let posts = self.posts_for(subject).await?;

        Ok(Profile {
            id: user.id,
            name: user.name,
            email: user.email,
            avatar_url: user.avatar_url,
            status: user.status,
            posts,
        })
    }

    /// View another user's profile.
    ///
    /// A viewer looking at their own id gets the [`ProfileView::SameUser`]
    /// sentinel. A viewer whose stored role grants the full-profile
    /// capability gets the complete record; everyone else (including
    /// anonymous viewers) gets the restricted projection with the email
    /// withheld.
    pub async fn view_profile(
        &self,
        target: UserId,
        viewer: Option<UserId>,
    ) -> ProfileResult<ProfileView> {
        if viewer == Some(target) {
            return Ok(ProfileView::SameUser);
        }

        let user = self
            .find_user(target)
            .await?
            .ok_or(ProfileError::UserNotFound)?;
        let posts = self.posts_for(target).await?;

        let privileged = match viewer {
            Some(viewer_id) => self
                .find_user(viewer_id)
                .await?
                .is_some_and(|v| v.role.can_view_full_profile()),
            None => false,
        };

        if privileged {
            Ok(ProfileView::Full(Profile {
                id: user.id,
                name: user.name,
                email: user.email,
                avatar_url: user.avatar_url,
                status: user.status,
                posts,
            }))
        } else {
            Ok(ProfileView::Restricted(PublicProfile {
                id: user.id,
                name: user.name,
                avatar_url: user.avatar_url,
                status: user.status,
                posts,
            }))
        }
    }

    /// Update the caller's email, returning the normalized value.
    ///
    /// The UPDATE itself fails atomically on a duplicate via the unique
    /// index; there is no separate existence pre-check to race against.
    ///
    /// # Errors
    ///
    /// * `ProfileError::InvalidEmail` - Blank input
    /// * `ProfileError::EmailTaken` - Another record holds the email
    /// * `ProfileError::UserNotFound` - No record for the subject
    pub async fn update_email(&self, subject: UserId, new_email: &str) -> ProfileResult<String> {
        if new_email.trim().is_empty() {
            return Err(ProfileError::InvalidEmail);
        }
        let email = new_email.trim().to_lowercase();

        let row = sqlx::query("UPDATE users SET email = $1 WHERE id = $2 RETURNING email")
            .bind(&email)
            .bind(subject)
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(unique_email_to_taken)?
            .ok_or(ProfileError::UserNotFound)?;

        Ok(row.get("email"))
    }

    /// Update the caller's free-text status.
    pub async fn update_status(&self, subject: UserId, status: &str) -> ProfileResult<String> {
        let row = sqlx::query("UPDATE users SET status = $1 WHERE id = $2 RETURNING status")
            .bind(status)
            .bind(subject)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or(ProfileError::UserNotFound)?;

        Ok(row.get("status"))
    }

    /// Store the durable URL returned by the object-storage collaborator.
    pub async fn update_avatar(&self, subject: UserId, avatar_url: &str) -> ProfileResult<String> {
        let row = sqlx::query("UPDATE users SET avatar_url = $1 WHERE id = $2 RETURNING avatar_url")
            .bind(avatar_url)
            .bind(subject)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or(ProfileError::UserNotFound)?;

        Ok(row.get("avatar_url"))
    }

    /// Append a post to the caller's record with a server-generated
    /// timestamp. An empty description is allowed; a missing one is rejected
    /// upstream at the request boundary.
    ///
    /// # Errors
    ///
    /// * `ProfileError::UserNotFound` - Subject no longer exists
    pub async fn create_post(
        &self,
        subject: UserId,
        image_url: &str,
        description: &str,
    ) -> ProfileResult<Post> {
        let row = sqlx::query(
            r#"
            INSERT INTO posts (user_id, image_url, description)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, image_url, description, created_at
            "#,
        )
        .bind(subject)
        .bind(image_url)
        .bind(description)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                ProfileError::UserNotFound
            }
            _ => ProfileError::Database(e),
        })?;

        Ok(post_from_row(&row))
    }

    /// Remove a post by id, scoped to the caller's own record. A non-owner
    /// deleting an existing post id gets `PostNotFound`.
    pub async fn delete_post(&self, subject: UserId, post_id: i64) -> ProfileResult<()> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(subject)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(ProfileError::PostNotFound);
        }
        Ok(())
    }

    /// One page of every user's posts, newest first, plus the total count
    /// before pagination.
    ///
    /// `page` is clamped to at least 1. `limit` is intentionally unbounded
    /// above; a caller may request the entire feed in one page.
    pub async fn list_feed(&self, page: i64, limit: i64) -> ProfileResult<FeedPage> {
        let limit = limit.max(0);
        let skip = (page.max(1) - 1) * limit;

        let rows = sqlx::query(
            r#"
            SELECT p.id, p.user_id, u.name AS author_name,
                   u.avatar_url AS author_avatar_url,
                   p.image_url, p.description, p.created_at
            FROM posts p
            JOIN users u ON u.id = p.user_id
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(skip)
        .fetch_all(self.pool.as_ref())
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(self.pool.as_ref())
            .await?;

        let posts = rows
            .iter()
            .map(|r| FeedPost {
                id: r.get("id"),
                user_id: r.get("user_id"),
                author_name: r.get("author_name"),
                author_avatar_url: r.get("author_avatar_url"),
                image_url: r.get("image_url"),
                description: r.get("description"),
                created_at: r.get("created_at"),
            })
            .collect();

        Ok(FeedPage { posts, total })
    }

    /// Hard-delete the caller's account. Posts cascade with the record;
    /// chats and messages keep their raw participant ids (read paths
    /// tombstone deleted users).
    pub async fn delete_account(&self, subject: UserId) -> ProfileResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(subject)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(ProfileError::UserNotFound);
        }
        log::info!("deleted account {subject}");
        Ok(())
    }

    async fn posts_for(&self, user_id: UserId) -> ProfileResult<Vec<Post>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, image_url, description, created_at
            FROM posts
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.iter().map(post_from_row).collect())
    }
}

/// Map a unique-index violation on the email column to `EmailTaken`.
fn unique_email_to_taken(err: sqlx::Error) -> ProfileError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => ProfileError::EmailTaken,
        _ => ProfileError::Database(err),
    }
}

fn post_from_row(row: &PgRow) -> Post {
    Post {
        id: row.get("id"),
        user_id: row.get("user_id"),
        image_url: row.get("image_url"),
        description: row.get("description"),
        created_at: row.get("created_at"),
    }
}
