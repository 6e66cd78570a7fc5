use crate::domain::models::{Comment, CommentChanges, NewComment};
use crate::error::{ServiceError, ServiceResult};
use sqlx::PgPool;
use tracing::debug;

/// Repository for Comment operations
#[derive(Clone)]
pub struct CommentRepository {
    pool: PgPool,
}

impl CommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new comment
    pub async fn create_comment(&self, new_comment: NewComment) -> ServiceResult<Comment> {
        new_comment.validate()?;

        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (post_id, author_id, text, active)
            VALUES ($1, $2, $3, $4)
            RETURNING id, post_id, author_id, text, created, active
            "#,
        )
        .bind(new_comment.post_id)
        .bind(new_comment.author_id)
        .bind(&new_comment.text)
        .bind(new_comment.active)
        .fetch_one(&self.pool)
        .await?;

        debug!("Created comment {} on post {}", comment.id, comment.post_id);
        Ok(comment)
    }

    /// Get a single comment by ID
    pub async fn get_comment(&self, comment_id: i64) -> ServiceResult<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, author_id, text, created, active
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    /// Comments on a post, newest first
    pub async fn list_comments_for_post(&self, post_id: i64) -> ServiceResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, author_id, text, created, active
            FROM comments
            WHERE post_id = $1
            ORDER BY created DESC, id DESC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    pub async fn list_comments_by_author(&self, author_id: i64) -> ServiceResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, author_id, text, created, active
            FROM comments
            WHERE author_id = $1
            ORDER BY created DESC, id DESC
            "#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    /// Update text or visibility. Post, author and `created` are fixed.
    pub async fn update_comment(
        &self,
        comment_id: i64,
        changes: CommentChanges,
    ) -> ServiceResult<Comment> {
        let mut comment = self
            .get_comment(comment_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("comment {}", comment_id)))?;
        comment.apply(changes);
        comment.validate()?;

        let comment = sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET text = $2, active = $3
            WHERE id = $1
            RETURNING id, post_id, author_id, text, created, active
            "#,
        )
        .bind(comment_id)
        .bind(&comment.text)
        .bind(comment.active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("comment {}", comment_id)))?;

        Ok(comment)
    }

    pub async fn delete_comment(&self, comment_id: i64) -> ServiceResult<bool> {
        let affected = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(affected > 0)
    }
}
