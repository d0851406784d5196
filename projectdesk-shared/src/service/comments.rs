/// Comment operations
///
/// Any participant of the task's project may read and post. Editing and
/// deleting are reserved to the author.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::policy::{authorize, require_author, Action};
use crate::auth::scope::ProjectAccess;
use crate::auth::Principal;
use crate::error::{DomainError, DomainResult, Resource};
use crate::hierarchy::{resolve_task_parent, ParentRef};
use crate::models::comment::{Comment, NewComment};
use crate::validation::{CommentPatch, CommentPayload};

async fn visible_comment(
    pool: &PgPool,
    principal: &Principal,
    comment_id: Uuid,
) -> DomainResult<Comment> {
    Comment::find_visible(pool, comment_id, principal)
        .await?
        .ok_or(DomainError::NotFound(Resource::Comment))
}

/// Visible comments, newest first
///
/// `task_id` scopes the listing to one task; a hidden or missing task gives
/// an empty list.
pub async fn list_comments(
    pool: &PgPool,
    principal: &Principal,
    task_id: Option<Uuid>,
) -> DomainResult<Vec<Comment>> {
    Ok(Comment::list_visible(pool, principal, task_id).await?)
}

/// Posts a comment authored by the principal
///
/// `route_task` is the task of a nested route and overrides
/// `payload.task_id`.
pub async fn create_comment(
    pool: &PgPool,
    principal: &Principal,
    route_task: Option<Uuid>,
    payload: CommentPayload,
) -> DomainResult<Comment> {
    let parent = ParentRef::new(route_task, payload.task_id);
    let task = resolve_task_parent(pool, principal, parent).await?;

    let access = ProjectAccess::load(pool, task.project_id, principal)
        .await?
        .ok_or(DomainError::NotFound(Resource::Task))?;
    authorize(Action::CreateComment, &access)?;

    let fields = payload.into_fields()?;
    let comment = Comment::create(
        pool,
        NewComment {
            content: fields.content,
            user_id: principal.user_id,
            task_id: task.id,
        },
    )
    .await?;

    info!(comment_id = %comment.id, task_id = %task.id, user_id = %principal.user_id, "Comment created");
    Ok(comment)
}

pub async fn get_comment(
    pool: &PgPool,
    principal: &Principal,
    comment_id: Uuid,
) -> DomainResult<Comment> {
    visible_comment(pool, principal, comment_id).await
}

/// Edits a comment; author only
pub async fn update_comment(
    pool: &PgPool,
    principal: &Principal,
    comment_id: Uuid,
    patch: CommentPatch,
) -> DomainResult<Comment> {
    let comment = visible_comment(pool, principal, comment_id).await?;
    require_author(principal, comment.user_id)?;

    let Some(content) = patch.into_content()? else {
        return Ok(comment);
    };

    Comment::update_content(pool, comment_id, content)
        .await?
        .ok_or(DomainError::NotFound(Resource::Comment))
}

/// Deletes a comment; author only
pub async fn delete_comment(
    pool: &PgPool,
    principal: &Principal,
    comment_id: Uuid,
) -> DomainResult<()> {
    let comment = visible_comment(pool, principal, comment_id).await?;
    require_author(principal, comment.user_id)?;

    if !Comment::delete(pool, comment_id).await? {
        return Err(DomainError::NotFound(Resource::Comment));
    }

    info!(comment_id = %comment_id, user_id = %principal.user_id, "Comment deleted");
    Ok(())
}
