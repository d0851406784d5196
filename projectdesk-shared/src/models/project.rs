/// Project model and database operations
///
/// Projects are the root of the ownership hierarchy:
///
/// ```text
/// Project ─┬─ ProjectMembership (role Admin | Member)
///          └─ Task ── Comment
/// ```
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     owner_id UUID NOT NULL REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use projectdesk_shared::models::project::{NewProject, Project};
/// use projectdesk_shared::auth::Principal;
/// use projectdesk_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// let owner = Principal::new(Uuid::new_v4());
///
/// let project = Project::create_with_owner(&pool, owner.user_id, NewProject {
///     name: "Alpha".to_string(),
///     description: String::new(),
/// }).await?;
///
/// let mine = Project::list_visible(&pool, &owner).await?;
/// assert!(mine.iter().any(|p| p.id == project.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use super::membership::ensure_owner_is_admin;
use crate::auth::scope::visible_project;
use crate::auth::Principal;

const PROJECT_COLUMNS: &str = "p.id, p.name, p.description, p.owner_id, p.created_at";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: Uuid,

    pub name: String,

    /// May be empty
    pub description: String,

    /// Creator; always also holds an Admin membership
    pub owner_id: Uuid,

    pub created_at: DateTime<Utc>,
}

/// Validated fields for a new project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,

    pub description: String,
}

/// Validated partial update; `None` leaves the column untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectChanges {
    pub name: Option<String>,

    pub description: Option<String>,
}

impl Project {
    /// Creates a project and seeds the owner's Admin membership atomically
    ///
    /// Both rows are written in one transaction; if seeding fails the project
    /// insert is rolled back.
    ///
    /// # Errors
    ///
    /// Returns an error if the owner does not exist or the database fails
    pub async fn create_with_owner(
        pool: &PgPool,
        owner_id: Uuid,
        data: NewProject,
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let project = Self::insert(&mut tx, owner_id, data).await?;
        ensure_owner_is_admin(&mut tx, project.id, owner_id).await?;

        tx.commit().await?;

        info!(project_id = %project.id, owner_id = %owner_id, "Project created");
        Ok(project)
    }

    async fn insert(
        conn: &mut PgConnection,
        owner_id: Uuid,
        data: NewProject,
    ) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (name, description, owner_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, owner_id, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(owner_id)
        .fetch_one(conn)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID, ignoring visibility
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects p WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project the principal can see
    pub async fn find_visible(
        pool: &PgPool,
        id: Uuid,
        principal: &Principal,
    ) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects p WHERE p.id = $2 AND {}",
            visible_project(1)
        ))
        .bind(principal.user_id)
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Lists projects the principal owns or belongs to, newest first
    pub async fn list_visible(
        pool: &PgPool,
        principal: &Principal,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects p WHERE {} ORDER BY p.created_at DESC",
            visible_project(1)
        ))
        .bind(principal.user_id)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Applies a partial update
    ///
    /// # Returns
    ///
    /// The updated project, `None` if it no longer exists
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        changes: ProjectChanges,
    ) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET name = COALESCE($2, name),
                description = COALESCE($3, description)
            WHERE id = $1
            RETURNING id, name, description, owner_id, created_at
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.description)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Deletes the project row only; dependants must already be gone
    pub(crate) async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
