/// Comment endpoints
///
/// - `GET /v1/comments`, `POST /v1/comments` (body carries `task_id`)
/// - `GET /v1/tasks/:id/comments`, `POST /v1/tasks/:id/comments` (path wins)
/// - `GET|PATCH|DELETE /v1/comments/:id`; edits and deletes by the author only

use crate::{app::AppState, error::ApiResult, extract::ValidJson};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use projectdesk_shared::{
    auth::Principal,
    models::comment::Comment,
    service,
    validation::{CommentPatch, CommentPayload},
};
use uuid::Uuid;

pub async fn list_comments(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<Comment>>> {
    Ok(Json(service::list_comments(&state.db, &principal, None).await?))
}

pub async fn list_task_comments(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Comment>>> {
    Ok(Json(
        service::list_comments(&state.db, &principal, Some(task_id)).await?,
    ))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ValidJson(req): ValidJson<CommentPayload>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let comment = service::create_comment(&state.db, &principal, None, req).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn create_task_comment(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(task_id): Path<Uuid>,
    ValidJson(req): ValidJson<CommentPayload>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let comment = service::create_comment(&state.db, &principal, Some(task_id), req).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn get_comment(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Comment>> {
    Ok(Json(service::get_comment(&state.db, &principal, id).await?))
}

pub async fn update_comment(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<CommentPatch>,
) -> ApiResult<Json<Comment>> {
    Ok(Json(
        service::update_comment(&state.db, &principal, id, req).await?,
    ))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    service::delete_comment(&state.db, &principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
