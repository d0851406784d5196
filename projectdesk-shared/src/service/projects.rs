/// Project and membership operations

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::policy::{authorize, Action};
use crate::auth::scope::{visible_access, ProjectAccess};
use crate::auth::Principal;
use crate::error::{DomainError, DomainResult, Resource};
use crate::hierarchy::{delete_project_tree, CascadeReport};
use crate::models::membership::{self, ProjectMembership, ProjectRole};
use crate::models::project::Project;
use crate::models::user::User;
use crate::validation::{AddMemberPayload, ProjectPatch, ProjectPayload};

async fn require_visible(
    pool: &PgPool,
    principal: &Principal,
    project_id: Uuid,
) -> DomainResult<ProjectAccess> {
    visible_access(pool, project_id, principal)
        .await?
        .ok_or(DomainError::NotFound(Resource::Project))
}

/// Runs the policy table for one action on an existing project
///
/// Role-gated actions report `Forbidden` to non-members; participant and
/// owner actions report `NotFound` when the project is not visible.
pub async fn authorize_project(
    pool: &PgPool,
    principal: &Principal,
    project_id: Uuid,
    action: Action,
) -> DomainResult<ProjectAccess> {
    let access = ProjectAccess::load(pool, project_id, principal)
        .await?
        .ok_or(DomainError::NotFound(Resource::Project))?;
    authorize(action, &access)?;
    Ok(access)
}

/// Projects the principal owns or belongs to, newest first
pub async fn list_projects(pool: &PgPool, principal: &Principal) -> DomainResult<Vec<Project>> {
    Ok(Project::list_visible(pool, principal).await?)
}

/// Creates a project owned by the principal, with its Admin membership
pub async fn create_project(
    pool: &PgPool,
    principal: &Principal,
    payload: ProjectPayload,
) -> DomainResult<Project> {
    let data = payload.into_new_project()?;
    Ok(Project::create_with_owner(pool, principal.user_id, data).await?)
}

pub async fn get_project(
    pool: &PgPool,
    principal: &Principal,
    project_id: Uuid,
) -> DomainResult<Project> {
    Project::find_visible(pool, project_id, principal)
        .await?
        .ok_or(DomainError::NotFound(Resource::Project))
}

/// Renames or re-describes a project; Admin only
pub async fn update_project(
    pool: &PgPool,
    principal: &Principal,
    project_id: Uuid,
    patch: ProjectPatch,
) -> DomainResult<Project> {
    let access = require_visible(pool, principal, project_id).await?;
    authorize(Action::UpdateProject, &access)?;

    let changes = patch.into_changes()?;
    let project = Project::update(pool, project_id, changes)
        .await?
        .ok_or(DomainError::NotFound(Resource::Project))?;

    info!(project_id = %project_id, user_id = %principal.user_id, "Project updated");
    Ok(project)
}

/// Deletes a project and all of its dependants; owner only
pub async fn delete_project(
    pool: &PgPool,
    principal: &Principal,
    project_id: Uuid,
) -> DomainResult<CascadeReport> {
    let access = require_visible(pool, principal, project_id).await?;
    authorize(Action::DeleteProject, &access)?;

    delete_project_tree(pool, project_id)
        .await?
        .ok_or(DomainError::NotFound(Resource::Project))
}

/// Members of a visible project, in join order
pub async fn list_members(
    pool: &PgPool,
    principal: &Principal,
    project_id: Uuid,
) -> DomainResult<Vec<ProjectMembership>> {
    let access = require_visible(pool, principal, project_id).await?;
    authorize(Action::ListMembers, &access)?;

    Ok(ProjectMembership::list_by_project(pool, project_id).await?)
}

/// Adds a user to a project
///
/// Checks run in this order:
///
/// 1. project exists (`NotFound`)
/// 2. principal is an Admin member (`Forbidden`, reason `NotMember` or
///    `InsufficientRole`)
/// 3. `user_id` supplied (`Validation`)
/// 4. role is `Admin` or `Member` (`InvalidRole`), defaulting to `Member`
/// 5. target user exists (`UserNotFound`)
/// 6. pair not yet registered (`DuplicateMember`)
pub async fn add_member(
    pool: &PgPool,
    principal: &Principal,
    project_id: Uuid,
    payload: AddMemberPayload,
) -> DomainResult<ProjectMembership> {
    authorize_project(pool, principal, project_id, Action::AddMember).await?;

    let (user_id, role) = payload.into_parts()?;
    let role: ProjectRole = role.parse()?;

    if !User::exists(pool, user_id).await? {
        return Err(DomainError::UserNotFound);
    }

    membership::add_member(pool, project_id, user_id, role.as_str()).await
}
