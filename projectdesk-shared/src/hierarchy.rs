/// Entity hierarchy manager
///
/// Owns parent/child integrity for `Project → Task → Comment`:
///
/// - **Parent resolution** for creation. Under a nested route the route's
///   parent id wins over anything in the body; on direct creation the body's
///   id is used. Either way the parent is re-checked against the visibility
///   predicate, and a hidden parent is reported exactly like a missing one.
/// - **Cascading deletes**, run as explicit transaction scripts in a fixed
///   order (comments, tasks, memberships, project) so that the store's plain
///   foreign keys never see a dangling child.

use serde::Serialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::scope::{visible_access, ProjectAccess};
use crate::auth::Principal;
use crate::error::{DomainError, DomainResult, FieldErrors, Resource};
use crate::models::comment::Comment;
use crate::models::membership::ProjectMembership;
use crate::models::project::Project;
use crate::models::task::Task;
use crate::validation::REQUIRED;

/// Where a parent id came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentRef {
    /// Path segment of a nested route; overrides the body
    Route(Uuid),

    /// Body field on direct creation, possibly missing
    Payload(Option<Uuid>),
}

impl ParentRef {
    /// Picks the route id when present, otherwise the payload id
    pub fn new(route: Option<Uuid>, payload: Option<Uuid>) -> Self {
        match route {
            Some(id) => ParentRef::Route(id),
            None => ParentRef::Payload(payload),
        }
    }

    fn id(self, field: &str) -> DomainResult<Uuid> {
        match self {
            ParentRef::Route(id) | ParentRef::Payload(Some(id)) => Ok(id),
            ParentRef::Payload(None) => Err(FieldErrors::single(field, REQUIRED).into()),
        }
    }
}

/// Resolves the project a new task will belong to
///
/// # Errors
///
/// - `Validation` on `project_id` if no id was supplied on direct creation
/// - `NotFound(Project)` if the project is missing or not visible
pub async fn resolve_project_parent(
    pool: &PgPool,
    principal: &Principal,
    parent: ParentRef,
) -> DomainResult<ProjectAccess> {
    let project_id = parent.id("project_id")?;

    visible_access(pool, project_id, principal)
        .await?
        .ok_or(DomainError::NotFound(Resource::Project))
}

/// Resolves the task a new comment will belong to
///
/// # Errors
///
/// - `Validation` on `task_id` if no id was supplied on direct creation
/// - `NotFound(Task)` if the task is missing or its project is not visible
pub async fn resolve_task_parent(
    pool: &PgPool,
    principal: &Principal,
    parent: ParentRef,
) -> DomainResult<Task> {
    let task_id = parent.id("task_id")?;

    Task::find_visible(pool, task_id, principal)
        .await?
        .ok_or(DomainError::NotFound(Resource::Task))
}

/// Rows removed by a cascading delete
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CascadeReport {
    pub comments: u64,

    pub tasks: u64,

    pub memberships: u64,
}

/// Deletes a project and everything under it in one transaction
///
/// Order: comments, tasks, memberships, project.
///
/// # Returns
///
/// `None` if the project row was already gone; nothing is committed then
pub async fn delete_project_tree(
    pool: &PgPool,
    project_id: Uuid,
) -> Result<Option<CascadeReport>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let report = CascadeReport {
        comments: Comment::delete_by_project(&mut tx, project_id).await?,
        tasks: Task::delete_by_project(&mut tx, project_id).await?,
        memberships: ProjectMembership::delete_by_project(&mut tx, project_id).await?,
    };

    if !Project::delete(&mut tx, project_id).await? {
        tx.rollback().await?;
        return Ok(None);
    }

    tx.commit().await?;

    info!(
        project_id = %project_id,
        comments = report.comments,
        tasks = report.tasks,
        memberships = report.memberships,
        "Project deleted with dependants"
    );
    Ok(Some(report))
}

/// Deletes a task and its comments in one transaction
///
/// # Returns
///
/// `None` if the task row was already gone
pub async fn delete_task_tree(
    pool: &PgPool,
    task_id: Uuid,
) -> Result<Option<CascadeReport>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let comments = Comment::delete_by_task(&mut tx, task_id).await?;

    if !Task::delete(&mut tx, task_id).await? {
        tx.rollback().await?;
        return Ok(None);
    }

    tx.commit().await?;

    info!(task_id = %task_id, comments, "Task deleted with comments");
    Ok(Some(CascadeReport {
        comments,
        tasks: 1,
        memberships: 0,
    }))
}
