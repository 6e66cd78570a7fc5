use crate::domain::models::{NewUser, User};
use crate::error::ServiceResult;
use sqlx::PgPool;
use tracing::{debug, info};

/// Repository for the local user mirror
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a user. Duplicate usernames fail with a uniqueness violation.
    pub async fn create_user(&self, new_user: NewUser) -> ServiceResult<User> {
        new_user.validate()?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username)
            VALUES ($1)
            RETURNING id, username, created_at
            "#,
        )
        .bind(new_user.username.trim())
        .fetch_one(&self.pool)
        .await?;

        debug!("Created user {} ({})", user.id, user.username);
        Ok(user)
    }

    pub async fn get_user(&self, user_id: i64) -> ServiceResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Hard delete. Posts, comments and follow edges in both directions go
    /// with the user through the foreign keys.
    pub async fn delete_user(&self, user_id: i64) -> ServiceResult<bool> {
        let affected = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if affected > 0 {
            info!(user_id, "Deleted user and dependent records");
        }
        Ok(affected > 0)
    }
}
