/// Resource scoping engine
///
/// Decides which projects, tasks and comments a principal may read.
///
/// # Visibility
///
/// ```text
/// project visible  ⇔  owner == P  OR  membership(project, P) exists
/// task visible     ⇔  task.project visible
/// comment visible  ⇔  comment.task visible
/// ```
///
/// Ownership and membership are OR'd and not role-gated: any participant can
/// read. The same SQL predicate ([`visible_project`]) backs every query, so
/// global listings and parent-scoped listings derive the transitive closure
/// identically.

use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::principal::Principal;
use crate::models::membership::ProjectRole;

/// SQL predicate over a project row aliased `p`
///
/// `param` is the positional bind index holding the principal's user id.
///
/// # Example
///
/// ```
/// use projectdesk_shared::auth::scope::visible_project;
///
/// let clause = visible_project(1);
/// assert!(clause.contains("p.owner_id = $1"));
/// ```
pub fn visible_project(param: usize) -> String {
    format!(
        "(p.owner_id = ${param} OR EXISTS (\
            SELECT 1 FROM project_memberships vm \
            WHERE vm.project_id = p.id AND vm.user_id = ${param}))"
    )
}

/// A principal's standing in one project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectAccess {
    pub project_id: Uuid,

    pub owner_id: Uuid,

    pub user_id: Uuid,

    /// Membership role, `None` when not a member
    pub role: Option<ProjectRole>,
}

impl ProjectAccess {
    pub fn is_owner(&self) -> bool {
        self.owner_id == self.user_id
    }

    pub fn is_member(&self) -> bool {
        self.role.is_some()
    }

    /// Visibility predicate evaluated in memory
    pub fn is_visible(&self) -> bool {
        self.is_owner() || self.is_member()
    }

    /// Loads the standing of `principal` in `project_id`
    ///
    /// Returns `None` only if the project does not exist. Callers that must
    /// not leak existence use [`visible_access`] instead.
    pub async fn load(
        pool: &PgPool,
        project_id: Uuid,
        principal: &Principal,
    ) -> Result<Option<Self>, sqlx::Error> {
        let row: Option<(Uuid, Option<ProjectRole>)> = sqlx::query_as(
            r#"
            SELECT p.owner_id, m.role
            FROM projects p
            LEFT JOIN project_memberships m
                ON m.project_id = p.id AND m.user_id = $2
            WHERE p.id = $1
            "#,
        )
        .bind(project_id)
        .bind(principal.user_id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(|(owner_id, role)| Self {
            project_id,
            owner_id,
            user_id: principal.user_id,
            role,
        }))
    }
}

/// Standing of `principal` in `project_id`, or `None` if absent or hidden
pub async fn visible_access(
    pool: &PgPool,
    project_id: Uuid,
    principal: &Principal,
) -> Result<Option<ProjectAccess>, sqlx::Error> {
    let access = ProjectAccess::load(pool, project_id, principal)
        .await?
        .filter(ProjectAccess::is_visible);

    if access.is_none() {
        debug!(
            project_id = %project_id,
            user_id = %principal.user_id,
            "Project not visible to principal"
        );
    }

    Ok(access)
}
