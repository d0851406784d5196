/// Task endpoints
///
/// # Endpoints
///
/// - `GET /v1/tasks` - every task in a visible project
/// - `POST /v1/tasks` - direct creation, `project_id` taken from the body
/// - `GET /v1/projects/:id/tasks` - empty when the project is not visible
/// - `POST /v1/projects/:id/tasks` - nested creation, the path wins over the body
/// - `GET /v1/tasks/:id`
/// - `PATCH /v1/tasks/:id` - `"assigned_to_id": null` clears the assignee
/// - `DELETE /v1/tasks/:id` - also removes its comments

use crate::{app::AppState, error::ApiResult, extract::ValidJson};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use projectdesk_shared::{
    auth::Principal,
    models::task::Task,
    service,
    validation::{TaskPatch, TaskPayload},
};
use uuid::Uuid;

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(service::list_tasks(&state.db, &principal, None).await?))
}

pub async fn list_project_tasks(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(
        service::list_tasks(&state.db, &principal, Some(project_id)).await?,
    ))
}

/// Create task
///
/// # Errors
///
/// - `404 Not Found`: project missing or not visible, or assignee unknown
/// - `422 Unprocessable Entity`: field errors, or assignee not a project member
pub async fn create_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ValidJson(req): ValidJson<TaskPayload>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let task = service::create_task(&state.db, &principal, None, req).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn create_project_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(project_id): Path<Uuid>,
    ValidJson(req): ValidJson<TaskPayload>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let task = service::create_task(&state.db, &principal, Some(project_id), req).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    Ok(Json(service::get_task(&state.db, &principal, id).await?))
}

pub async fn update_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<TaskPatch>,
) -> ApiResult<Json<Task>> {
    Ok(Json(service::update_task(&state.db, &principal, id, req).await?))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    service::delete_task(&state.db, &principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
