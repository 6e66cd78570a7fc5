use crate::domain::models::{Group, GroupChanges, NewGroup};
use crate::error::{ServiceError, ServiceResult};
use sqlx::PgPool;
use tracing::{debug, info};

/// Repository for Group operations
#[derive(Clone)]
pub struct GroupRepository {
    pool: PgPool,
}

impl GroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a group. A taken slug fails with a uniqueness violation.
    pub async fn create_group(&self, new_group: NewGroup) -> ServiceResult<Group> {
        new_group.validate()?;

        let group = sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO post_groups (title, slug, description, active)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, slug, description, active
            "#,
        )
        .bind(&new_group.title)
        .bind(&new_group.slug)
        .bind(&new_group.description)
        .bind(new_group.active)
        .fetch_one(&self.pool)
        .await?;

        debug!("Created group {} ({})", group.id, group.slug);
        Ok(group)
    }

    pub async fn get_group(&self, group_id: i64) -> ServiceResult<Option<Group>> {
        let group = sqlx::query_as::<_, Group>(
            r#"
            SELECT id, title, slug, description, active
            FROM post_groups
            WHERE id = $1
            "#,
        )
        .bind(group_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(group)
    }

    /// Look up a group by its URL key
    pub async fn get_group_by_slug(&self, slug: &str) -> ServiceResult<Option<Group>> {
        let group = sqlx::query_as::<_, Group>(
            r#"
            SELECT id, title, slug, description, active
            FROM post_groups
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(group)
    }

    /// Groups ordered alphabetically by title
    pub async fn list_groups(&self, active_only: bool) -> ServiceResult<Vec<Group>> {
        let groups = sqlx::query_as::<_, Group>(
            r#"
            SELECT id, title, slug, description, active
            FROM post_groups
            WHERE ($1 = FALSE OR active = TRUE)
            ORDER BY title ASC, id ASC
            "#,
        )
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(groups)
    }

    pub async fn update_group(&self, group_id: i64, changes: GroupChanges) -> ServiceResult<Group> {
        let mut group = self
            .get_group(group_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("group {}", group_id)))?;
        group.apply(changes);
        group.validate()?;

        let group = sqlx::query_as::<_, Group>(
            r#"
            UPDATE post_groups
            SET title = $2, slug = $3, description = $4, active = $5
            WHERE id = $1
            RETURNING id, title, slug, description, active
            "#,
        )
        .bind(group_id)
        .bind(&group.title)
        .bind(&group.slug)
        .bind(&group.description)
        .bind(group.active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("group {}", group_id)))?;

        Ok(group)
    }

    /// Delete a group. Its posts stay and lose their group reference.
    pub async fn delete_group(&self, group_id: i64) -> ServiceResult<bool> {
        let affected = sqlx::query("DELETE FROM post_groups WHERE id = $1")
            .bind(group_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if affected > 0 {
            info!(group_id, "Deleted group; posts detached");
        }
        Ok(affected > 0)
    }
}
