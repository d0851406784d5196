/// Task operations
///
/// Tasks inherit visibility from their project. A task whose project the
/// principal cannot see does not exist as far as these operations are
/// concerned.

use chrono::Utc;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::policy::{authorize, Action};
use crate::auth::scope::ProjectAccess;
use crate::auth::Principal;
use crate::error::{DomainError, DomainResult, Resource};
use crate::hierarchy::{delete_task_tree, resolve_project_parent, CascadeReport, ParentRef};
use crate::models::task::{NewTask, Task};
use crate::validation::{check_assignee, TaskPatch, TaskPayload};

async fn visible_task(pool: &PgPool, principal: &Principal, task_id: Uuid) -> DomainResult<Task> {
    Task::find_visible(pool, task_id, principal)
        .await?
        .ok_or(DomainError::NotFound(Resource::Task))
}

async fn authorize_on_task(
    pool: &PgPool,
    principal: &Principal,
    task: &Task,
    action: Action,
) -> DomainResult<()> {
    let access = ProjectAccess::load(pool, task.project_id, principal)
        .await?
        .ok_or(DomainError::NotFound(Resource::Task))?;

    authorize(action, &access).map_err(|e| match e {
        DomainError::NotFound(_) => DomainError::NotFound(Resource::Task),
        other => other,
    })
}

/// Visible tasks, newest first
///
/// `project_id` scopes the listing to one project; a hidden or missing
/// project gives an empty list.
pub async fn list_tasks(
    pool: &PgPool,
    principal: &Principal,
    project_id: Option<Uuid>,
) -> DomainResult<Vec<Task>> {
    Ok(Task::list_visible(pool, principal, project_id).await?)
}

/// Creates a task
///
/// `route_project` is the project of a nested route and overrides
/// `payload.project_id`.
pub async fn create_task(
    pool: &PgPool,
    principal: &Principal,
    route_project: Option<Uuid>,
    payload: TaskPayload,
) -> DomainResult<Task> {
    let parent = ParentRef::new(route_project, payload.project_id);
    let access = resolve_project_parent(pool, principal, parent).await?;
    authorize(Action::CreateTask, &access)?;

    let fields = payload.into_fields(Utc::now())?;
    if let Some(assignee) = fields.assigned_to {
        check_assignee(pool, access.project_id, assignee).await?;
    }

    let task = Task::create(
        pool,
        NewTask {
            title: fields.title,
            description: fields.description,
            status: fields.status,
            priority: fields.priority,
            assigned_to: fields.assigned_to,
            project_id: access.project_id,
            due_date: fields.due_date,
        },
    )
    .await?;

    info!(
        task_id = %task.id,
        project_id = %task.project_id,
        user_id = %principal.user_id,
        "Task created"
    );
    Ok(task)
}

pub async fn get_task(pool: &PgPool, principal: &Principal, task_id: Uuid) -> DomainResult<Task> {
    visible_task(pool, principal, task_id).await
}

/// Partially updates a task
///
/// A new assignee is checked against the task's current project.
pub async fn update_task(
    pool: &PgPool,
    principal: &Principal,
    task_id: Uuid,
    patch: TaskPatch,
) -> DomainResult<Task> {
    let task = visible_task(pool, principal, task_id).await?;
    authorize_on_task(pool, principal, &task, Action::UpdateTask).await?;

    let changes = patch.into_changes(Utc::now())?;
    if let Some(Some(assignee)) = changes.assigned_to {
        check_assignee(pool, task.project_id, assignee).await?;
    }

    if changes.is_empty() {
        return Ok(task);
    }

    let task = Task::update(pool, task_id, changes)
        .await?
        .ok_or(DomainError::NotFound(Resource::Task))?;

    info!(task_id = %task_id, user_id = %principal.user_id, "Task updated");
    Ok(task)
}

/// Deletes a task and its comments
pub async fn delete_task(
    pool: &PgPool,
    principal: &Principal,
    task_id: Uuid,
) -> DomainResult<CascadeReport> {
    let task = visible_task(pool, principal, task_id).await?;
    authorize_on_task(pool, principal, &task, Action::DeleteTask).await?;

    delete_task_tree(pool, task_id)
        .await?
        .ok_or(DomainError::NotFound(Resource::Task))
}
