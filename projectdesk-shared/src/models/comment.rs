/// Comment model and database operations
///
/// Comments hang off tasks; visibility follows `comment → task → project`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE comments (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     content VARCHAR(1000) NOT NULL,
///     user_id UUID NOT NULL REFERENCES users(id),
///     task_id UUID NOT NULL REFERENCES tasks(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::auth::scope::visible_project;
use crate::auth::Principal;

const COMMENT_COLUMNS: &str = "c.id, c.content, c.user_id, c.task_id, c.created_at";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,

    /// Trimmed, 1 to 1000 characters
    pub content: String,

    /// Author
    pub user_id: Uuid,

    pub task_id: Uuid,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComment {
    pub content: String,

    pub user_id: Uuid,

    pub task_id: Uuid,
}

impl Comment {
    pub async fn create(pool: &PgPool, data: NewComment) -> Result<Self, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (content, user_id, task_id)
            VALUES ($1, $2, $3)
            RETURNING id, content, user_id, task_id, created_at
            "#,
        )
        .bind(data.content)
        .bind(data.user_id)
        .bind(data.task_id)
        .fetch_one(pool)
        .await?;

        Ok(comment)
    }

    /// Finds a comment whose task's project the principal can see
    pub async fn find_visible(
        pool: &PgPool,
        id: Uuid,
        principal: &Principal,
    ) -> Result<Option<Self>, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments c \
             JOIN tasks t ON t.id = c.task_id \
             JOIN projects p ON p.id = t.project_id \
             WHERE c.id = $2 AND {}",
            visible_project(1)
        ))
        .bind(principal.user_id)
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(comment)
    }

    /// Lists visible comments, newest first
    ///
    /// With `task_id` the listing is scoped to that task; a task the principal
    /// cannot see yields an empty list.
    pub async fn list_visible(
        pool: &PgPool,
        principal: &Principal,
        task_id: Option<Uuid>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let comments = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments c \
             JOIN tasks t ON t.id = c.task_id \
             JOIN projects p ON p.id = t.project_id \
             WHERE {} AND ($2::uuid IS NULL OR c.task_id = $2) \
             ORDER BY c.created_at DESC",
            visible_project(1)
        ))
        .bind(principal.user_id)
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(comments)
    }

    pub async fn update_content(
        pool: &PgPool,
        id: Uuid,
        content: String,
    ) -> Result<Option<Self>, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments SET content = $2
            WHERE id = $1
            RETURNING id, content, user_id, task_id, created_at
            "#,
        )
        .bind(id)
        .bind(content)
        .fetch_optional(pool)
        .await?;

        Ok(comment)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes every comment of a task (cascade step)
    pub(crate) async fn delete_by_task(
        conn: &mut PgConnection,
        task_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE task_id = $1")
            .bind(task_id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected())
    }

    /// Deletes every comment under any task of a project (cascade step)
    pub(crate) async fn delete_by_project(
        conn: &mut PgConnection,
        project_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM comments WHERE task_id IN (SELECT id FROM tasks WHERE project_id = $1)",
        )
        .bind(project_id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }
}
