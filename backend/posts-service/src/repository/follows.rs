use crate::domain::models::{Follow, NewFollow};
use crate::error::{ServiceError, ServiceResult};
use sqlx::PgPool;
use tracing::{debug, warn};

/// Repository for follow edges.
///
/// A (user, author) pair exists at most once; the `twice_follow_impossible`
/// constraint rejects duplicates at the storage layer.
#[derive(Clone)]
pub struct FollowRepository {
    pool: PgPool,
}

impl FollowRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a follow edge. A duplicate pair fails with
    /// [`ServiceError::UniqueViolation`].
    pub async fn create_follow(&self, new_follow: NewFollow) -> ServiceResult<Follow> {
        new_follow.validate()?;

        let result = sqlx::query_as::<_, Follow>(
            r#"
            INSERT INTO follows (user_id, author_id)
            VALUES ($1, $2)
            RETURNING id, user_id, author_id
            "#,
        )
        .bind(new_follow.user_id)
        .bind(new_follow.author_id)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(follow) => {
                debug!("Created follow {} -> {}", follow.user_id, follow.author_id);
                Ok(follow)
            }
            Err(e) => {
                let err = ServiceError::from(e);
                if err.is_unique_violation() {
                    warn!(
                        user_id = new_follow.user_id,
                        author_id = new_follow.author_id,
                        "Rejected duplicate follow"
                    );
                }
                Err(err)
            }
        }
    }

    /// Remove a follow edge; returns true if a row was removed.
    pub async fn delete_follow(&self, user_id: i64, author_id: i64) -> ServiceResult<bool> {
        let affected = sqlx::query(
            r#"
            DELETE FROM follows
            WHERE user_id = $1 AND author_id = $2
            "#,
        )
        .bind(user_id)
        .bind(author_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected > 0)
    }

    pub async fn is_following(&self, user_id: i64, author_id: i64) -> ServiceResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM follows
                WHERE user_id = $1 AND author_id = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Edges where `user_id` is the follower
    pub async fn list_following(&self, user_id: i64) -> ServiceResult<Vec<Follow>> {
        let follows = sqlx::query_as::<_, Follow>(
            r#"
            SELECT id, user_id, author_id
            FROM follows
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(follows)
    }

    /// Edges where `author_id` is the followed account
    pub async fn list_followers(&self, author_id: i64) -> ServiceResult<Vec<Follow>> {
        let follows = sqlx::query_as::<_, Follow>(
            r#"
            SELECT id, user_id, author_id
            FROM follows
            WHERE author_id = $1
            ORDER BY id
            "#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(follows)
    }
}
