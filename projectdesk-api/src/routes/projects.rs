/// Project and membership endpoints
///
/// # Endpoints
///
/// - `GET /v1/projects` - projects the caller owns or belongs to
/// - `POST /v1/projects` - create; the caller becomes owner and Admin
/// - `GET /v1/projects/:id`
/// - `PATCH /v1/projects/:id` - project Admins only
/// - `DELETE /v1/projects/:id` - owner only, removes tasks, comments, members
/// - `GET /v1/projects/:id/members`
/// - `POST /v1/projects/:id/members` - project Admins only
///
/// Projects the caller cannot see answer 404; only add-member tells a
/// non-member `403 not_a_member`.

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{parse_json, ValidJson},
};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use projectdesk_shared::{
    auth::{policy::Action, Principal},
    models::{membership::ProjectMembership, project::Project},
    service,
    validation::{AddMemberPayload, ProjectPatch, ProjectPayload},
};
use serde::Serialize;
use uuid::Uuid;

/// Add member response
///
/// ```json
/// {
///   "message": "Member added successfully",
///   "membership": { "project_id": "uuid", "user_id": "uuid", "role": "Member", "created_at": "..." }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct AddMemberResponse {
    pub message: String,

    pub membership: ProjectMembership,
}

pub async fn list_projects(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<Project>>> {
    Ok(Json(service::list_projects(&state.db, &principal).await?))
}

/// Create project
///
/// # Errors
///
/// - `422 Unprocessable Entity`: `name` missing, blank or too long
pub async fn create_project(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ValidJson(req): ValidJson<ProjectPayload>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let project = service::create_project(&state.db, &principal, req).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn get_project(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Project>> {
    Ok(Json(service::get_project(&state.db, &principal, id).await?))
}

pub async fn update_project(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<ProjectPatch>,
) -> ApiResult<Json<Project>> {
    Ok(Json(
        service::update_project(&state.db, &principal, id, req).await?,
    ))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    service::delete_project(&state.db, &principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_members(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<ProjectMembership>>> {
    Ok(Json(service::list_members(&state.db, &principal, id).await?))
}

/// Add member
///
/// # Request
///
/// ```json
/// { "user_id": "uuid", "role": "Member" }
/// ```
///
/// # Errors
///
/// The Admin check runs before the body is parsed.
///
/// - `400 Bad Request`: role is not `Admin` or `Member`, or the body is not JSON
/// - `403 Forbidden`: caller is not a member, or not an Admin (`reason`
///   is `not_a_member` or `insufficient_role`)
/// - `404 Not Found`: project or target user does not exist
/// - `409 Conflict`: user is already a member
/// - `422 Unprocessable Entity`: `user_id` missing or not a UUID
pub async fn add_member(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<AddMemberResponse>)> {
    service::authorize_project(&state.db, &principal, id, Action::AddMember).await?;

    let req: AddMemberPayload = parse_json(&body)?;
    let membership = service::add_member(&state.db, &principal, id, req).await?;

    Ok((
        StatusCode::CREATED,
        Json(AddMemberResponse {
            message: "Member added successfully".to_string(),
            membership,
        }),
    ))
}
