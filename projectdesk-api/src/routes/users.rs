/// User directory endpoints
///
/// - `GET /v1/users` - staff see everyone, others see themselves
/// - `GET /v1/users/:id` - staff or self, otherwise 404

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use projectdesk_shared::{auth::Principal, models::user::User, service};
use uuid::Uuid;

pub async fn list_users(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(service::list_users(&state.db, &principal).await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<User>> {
    Ok(Json(service::get_user(&state.db, &principal, id).await?))
}
