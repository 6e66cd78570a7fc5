use crate::domain::models::{NewPost, Post, PostChanges};
use crate::error::{ServiceError, ServiceResult};
use sqlx::PgPool;
use tracing::{debug, info};

/// Repository for Post operations
#[derive(Clone)]
pub struct PostRepository {
    pool: PgPool,
}

impl PostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a post.
    ///
    /// A missing title is derived from the text before the insert; `pub_date`
    /// comes from the database clock. Unknown author or group ids fail with a
    /// reference integrity violation.
    pub async fn create_post(&self, mut new_post: NewPost) -> ServiceResult<Post> {
        new_post.normalize();
        new_post.validate()?;

        let image = new_post.image.as_ref().map(|i| i.as_str().to_string());
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (title, text, author_id, group_id, image, active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, text, pub_date, author_id, group_id, image, active
            "#,
        )
        .bind(new_post.title.as_deref())
        .bind(&new_post.text)
        .bind(new_post.author_id)
        .bind(new_post.group_id)
        .bind(image)
        .bind(new_post.active)
        .fetch_one(&self.pool)
        .await?;

        debug!(
            "Created post {} by author {} (group={:?})",
            post.id, post.author_id, post.group_id
        );
        Ok(post)
    }

    pub async fn get_post(&self, post_id: i64) -> ServiceResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, text, pub_date, author_id, group_id, image, active
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    /// All posts, newest first
    pub async fn list_posts(&self, active_only: bool) -> ServiceResult<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, text, pub_date, author_id, group_id, image, active
            FROM posts
            WHERE ($1 = FALSE OR active = TRUE)
            ORDER BY pub_date DESC, id DESC
            "#,
        )
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    /// Posts written by one author, newest first
    pub async fn list_posts_by_author(&self, author_id: i64) -> ServiceResult<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, text, pub_date, author_id, group_id, image, active
            FROM posts
            WHERE author_id = $1
            ORDER BY pub_date DESC, id DESC
            "#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    /// Posts filed under one group, newest first
    pub async fn list_posts_by_group(&self, group_id: i64) -> ServiceResult<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, text, pub_date, author_id, group_id, image, active
            FROM posts
            WHERE group_id = $1
            ORDER BY pub_date DESC, id DESC
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    /// Posts by every author `user_id` follows, newest first
    pub async fn list_followed_posts(&self, user_id: i64) -> ServiceResult<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT p.id, p.title, p.text, p.pub_date, p.author_id, p.group_id, p.image, p.active
            FROM posts p
            INNER JOIN follows f ON f.author_id = p.author_id
            WHERE f.user_id = $1
            ORDER BY p.pub_date DESC, p.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    /// Apply a partial update under a row lock.
    ///
    /// The title is re-derived only if the update leaves it empty; `pub_date`
    /// and the author never change.
    pub async fn update_post(&self, post_id: i64, changes: PostChanges) -> ServiceResult<Post> {
        let mut tx = self.pool.begin().await?;

        let mut post = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, text, pub_date, author_id, group_id, image, active
            FROM posts
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(post_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("post {}", post_id)))?;

        post.apply(changes);
        post.ensure_title();
        post.validate()?;

        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET title = $2, text = $3, group_id = $4, image = $5, active = $6
            WHERE id = $1
            RETURNING id, title, text, pub_date, author_id, group_id, image, active
            "#,
        )
        .bind(post_id)
        .bind(&post.title)
        .bind(&post.text)
        .bind(post.group_id)
        .bind(&post.image)
        .bind(post.active)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!("Updated post {}", post.id);
        Ok(post)
    }

    /// Delete a post together with its comments
    pub async fn delete_post(&self, post_id: i64) -> ServiceResult<bool> {
        let affected = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if affected > 0 {
            info!(post_id, "Deleted post and its comments");
        }
        Ok(affected > 0)
    }
}
