/// Project membership model and registry operations
///
/// This module is the membership registry: it records which users belong to
/// which projects and in what role, and answers role and existence queries.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE project_role AS ENUM ('Admin', 'Member');
///
/// CREATE TABLE project_memberships (
///     project_id UUID NOT NULL REFERENCES projects(id),
///     user_id UUID NOT NULL REFERENCES users(id),
///     role project_role NOT NULL DEFAULT 'Member',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (project_id, user_id)
/// );
/// ```
///
/// # Roles
///
/// - **Admin**: may manage membership and edit the project
/// - **Member**: may read project contents and work on tasks
///
/// # Example
///
/// ```no_run
/// use projectdesk_shared::models::membership::{add_member, ProjectMembership};
/// use projectdesk_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let project_id = Uuid::new_v4();
/// let user_id = Uuid::new_v4();
///
/// add_member(&pool, project_id, user_id, "Member").await?;
/// assert!(ProjectMembership::is_member(&pool, project_id, user_id).await?);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};

/// Role held by a user inside one project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_role")]
pub enum ProjectRole {
    /// Manages membership and project settings
    Admin,

    /// Regular participant
    Member,
}

impl ProjectRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectRole::Admin => "Admin",
            ProjectRole::Member => "Member",
        }
    }

    /// Checks if this role has the permission level of the required role
    ///
    /// Hierarchy: Admin > Member
    pub fn has_permission(&self, required: &ProjectRole) -> bool {
        self.permission_level() >= required.permission_level()
    }

    fn permission_level(&self) -> u8 {
        match self {
            ProjectRole::Admin => 2,
            ProjectRole::Member => 1,
        }
    }
}

impl Default for ProjectRole {
    fn default() -> Self {
        ProjectRole::Member
    }
}

impl FromStr for ProjectRole {
    type Err = DomainError;

    /// Parses the exact wire spelling (`Admin` / `Member`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(ProjectRole::Admin),
            "Member" => Ok(ProjectRole::Member),
            other => Err(DomainError::InvalidRole(other.to_string())),
        }
    }
}

/// One (project, user, role) row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectMembership {
    pub project_id: Uuid,

    pub user_id: Uuid,

    pub role: ProjectRole,

    /// When the user joined the project
    pub created_at: DateTime<Utc>,
}

/// Input for inserting a membership
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMembership {
    pub project_id: Uuid,

    pub user_id: Uuid,

    #[serde(default)]
    pub role: ProjectRole,
}

impl ProjectMembership {
    /// Inserts a membership unless the (project, user) pair already exists
    ///
    /// Uses `ON CONFLICT DO NOTHING` so two concurrent calls for the same pair
    /// leave exactly one row; the loser observes `None`.
    ///
    /// # Returns
    ///
    /// The new membership, or `None` if the user was already a member
    ///
    /// # Errors
    ///
    /// Returns an error if the project or user row is missing (foreign key
    /// violation) or the database connection fails
    pub async fn insert_if_absent(
        pool: &PgPool,
        data: NewMembership,
    ) -> Result<Option<Self>, sqlx::Error> {
        let membership = sqlx::query_as::<_, ProjectMembership>(
            r#"
            INSERT INTO project_memberships (project_id, user_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (project_id, user_id) DO NOTHING
            RETURNING project_id, user_id, role, created_at
            "#,
        )
        .bind(data.project_id)
        .bind(data.user_id)
        .bind(data.role)
        .fetch_optional(pool)
        .await?;

        Ok(membership)
    }

    /// Checks if a user holds any role in a project
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use projectdesk_shared::models::membership::ProjectMembership;
    /// # use sqlx::PgPool;
    /// # use uuid::Uuid;
    /// # async fn example(pool: PgPool, project_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
    /// if ProjectMembership::is_member(&pool, project_id, user_id).await? {
    ///     println!("User participates in the project");
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn is_member(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM project_memberships
                WHERE project_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Gets a user's role in a project, `None` if not a member
    pub async fn role_of(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ProjectRole>, sqlx::Error> {
        let role: Option<ProjectRole> = sqlx::query_scalar(
            r#"
            SELECT role FROM project_memberships
            WHERE project_id = $1 AND user_id = $2
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(role)
    }

    /// Lists all members of a project, earliest first
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let memberships = sqlx::query_as::<_, ProjectMembership>(
            r#"
            SELECT project_id, user_id, role, created_at
            FROM project_memberships
            WHERE project_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(memberships)
    }

    /// Counts members in a project
    pub async fn count_by_project(pool: &PgPool, project_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM project_memberships WHERE project_id = $1")
                .bind(project_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }

    /// Removes every membership of a project (cascade step)
    pub(crate) async fn delete_by_project(
        conn: &mut PgConnection,
        project_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM project_memberships WHERE project_id = $1")
            .bind(project_id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected())
    }
}

/// Seeds the owner's Admin membership
///
/// Called exactly once, inside the transaction that creates the project, so a
/// project never exists without its owner's membership.
pub async fn ensure_owner_is_admin(
    conn: &mut PgConnection,
    project_id: Uuid,
    owner_id: Uuid,
) -> Result<ProjectMembership, sqlx::Error> {
    let membership = sqlx::query_as::<_, ProjectMembership>(
        r#"
        INSERT INTO project_memberships (project_id, user_id, role)
        VALUES ($1, $2, 'Admin')
        RETURNING project_id, user_id, role, created_at
        "#,
    )
    .bind(project_id)
    .bind(owner_id)
    .fetch_one(conn)
    .await?;

    Ok(membership)
}

/// Registry-level add-member
///
/// Parses the role, then inserts the pair atomically.
///
/// # Errors
///
/// - `InvalidRole` if `role` is not `Admin` or `Member`
/// - `DuplicateMember` if the pair already exists (the existing role is left
///   untouched)
pub async fn add_member(
    pool: &PgPool,
    project_id: Uuid,
    user_id: Uuid,
    role: &str,
) -> DomainResult<ProjectMembership> {
    let role: ProjectRole = role.parse()?;

    match ProjectMembership::insert_if_absent(
        pool,
        NewMembership {
            project_id,
            user_id,
            role,
        },
    )
    .await?
    {
        Some(membership) => {
            info!(
                project_id = %project_id,
                user_id = %user_id,
                role = role.as_str(),
                "Member added to project"
            );
            Ok(membership)
        }
        None => {
            debug!(project_id = %project_id, user_id = %user_id, "User is already a member");
            Err(DomainError::DuplicateMember)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_role_as_str() {
        assert_eq!(ProjectRole::Admin.as_str(), "Admin");
        assert_eq!(ProjectRole::Member.as_str(), "Member");
    }

    #[test]
    fn test_role_hierarchy() {
        assert!(ProjectRole::Admin.has_permission(&ProjectRole::Admin));
        assert!(ProjectRole::Admin.has_permission(&ProjectRole::Member));
        assert!(ProjectRole::Member.has_permission(&ProjectRole::Member));
        assert!(!ProjectRole::Member.has_permission(&ProjectRole::Admin));
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("Admin".parse::<ProjectRole>().unwrap(), ProjectRole::Admin);
        assert_eq!("Member".parse::<ProjectRole>().unwrap(), ProjectRole::Member);

        for bad in ["admin", "Owner", "", "Viewer"] {
            match bad.parse::<ProjectRole>() {
                Err(DomainError::InvalidRole(value)) => assert_eq!(value, bad),
                other => panic!("expected InvalidRole for {:?}, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_default_role_is_member() {
        assert_eq!(ProjectRole::default(), ProjectRole::Member);
    }

    #[test]
    fn test_role_wire_format() {
        assert_eq!(serde_json::to_string(&ProjectRole::Admin).unwrap(), "\"Admin\"");
        let role: ProjectRole = serde_json::from_str("\"Member\"").unwrap();
        assert_eq!(role, ProjectRole::Member);
    }
}
