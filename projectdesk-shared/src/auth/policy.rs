/// Authorization decision table
///
/// Every write and privileged read is checked by one routine, [`authorize`],
/// evaluating a role × action table:
///
/// | Action          | Requirement                        |
/// |-----------------|------------------------------------|
/// | `ViewProject`   | participant (owner or any member)  |
/// | `ListMembers`   | participant                        |
/// | `CreateTask`    | participant                        |
/// | `UpdateTask`    | participant                        |
/// | `DeleteTask`    | participant                        |
/// | `CreateComment` | participant                        |
/// | `UpdateProject` | membership role Admin              |
/// | `AddMember`     | membership role Admin              |
/// | `DeleteProject` | project owner                      |
///
/// Participant and owner requirements check visibility first, so a principal
/// who cannot see the project gets `NotFound`. Role requirements are the
/// privileged-action predicate (`isMember AND role >= required`) and report
/// `NotMember` or `InsufficientRole`; callers decide whether an outsider may
/// reach that check at all.
///
/// # Example
///
/// ```no_run
/// use projectdesk_shared::auth::policy::{authorize, Action};
/// use projectdesk_shared::auth::scope::visible_access;
/// use projectdesk_shared::auth::Principal;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, principal: Principal, project_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// if let Some(access) = visible_access(&pool, project_id, &principal).await? {
///     authorize(Action::AddMember, &access)?;
/// }
/// # Ok(())
/// # }
/// ```

use uuid::Uuid;

use super::principal::Principal;
use super::scope::ProjectAccess;
use crate::error::{DomainError, DomainResult, ForbiddenReason, Resource};
use crate::models::membership::ProjectRole;

/// Actions gated by the decision table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ViewProject,
    ListMembers,
    UpdateProject,
    DeleteProject,
    AddMember,
    CreateTask,
    UpdateTask,
    DeleteTask,
    CreateComment,
}

/// What a principal needs for an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Owner or any member
    Participant,

    /// A membership with at least this role
    Role(ProjectRole),

    /// The project owner
    Owner,
}

impl Action {
    /// Row of the decision table
    pub fn requirement(&self) -> Requirement {
        match self {
            Action::ViewProject
            | Action::ListMembers
            | Action::CreateTask
            | Action::UpdateTask
            | Action::DeleteTask
            | Action::CreateComment => Requirement::Participant,
            Action::UpdateProject | Action::AddMember => Requirement::Role(ProjectRole::Admin),
            Action::DeleteProject => Requirement::Owner,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::ViewProject => "view_project",
            Action::ListMembers => "list_members",
            Action::UpdateProject => "update_project",
            Action::DeleteProject => "delete_project",
            Action::AddMember => "add_member",
            Action::CreateTask => "create_task",
            Action::UpdateTask => "update_task",
            Action::DeleteTask => "delete_task",
            Action::CreateComment => "create_comment",
        }
    }
}

/// Evaluates the decision table for one action
///
/// # Errors
///
/// - `NotFound(Project)` if a participant or owner requirement meets a
///   project the principal cannot see
/// - `Forbidden(NotMember)` if a role is required and the principal holds none
/// - `Forbidden(InsufficientRole)` if the held role is too low
/// - `Forbidden(NotOwner)` if ownership is required
pub fn authorize(action: Action, access: &ProjectAccess) -> DomainResult<()> {
    let requirement = action.requirement();

    if !matches!(requirement, Requirement::Role(_)) && !access.is_visible() {
        return Err(DomainError::NotFound(Resource::Project));
    }

    let denial = match requirement {
        Requirement::Participant => None,
        Requirement::Role(required) => match access.role {
            None => Some(ForbiddenReason::NotMember),
            Some(role) if !role.has_permission(&required) => Some(ForbiddenReason::InsufficientRole),
            Some(_) => None,
        },
        Requirement::Owner => (!access.is_owner()).then_some(ForbiddenReason::NotOwner),
    };

    match denial {
        None => Ok(()),
        Some(reason) => {
            tracing::debug!(
                project_id = %access.project_id,
                user_id = %access.user_id,
                action = action.as_str(),
                reason = reason.code(),
                "Action denied"
            );
            Err(DomainError::Forbidden(reason))
        }
    }
}

/// Checks that the principal authored a resource
pub fn require_author(principal: &Principal, author_id: Uuid) -> DomainResult<()> {
    if principal.user_id != author_id {
        return Err(DomainError::Forbidden(ForbiddenReason::NotAuthor));
    }

    Ok(())
}
