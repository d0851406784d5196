/// User directory
///
/// Staff see every user. Everyone else sees only themselves; asking for
/// another user reads as not found.

use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::Principal;
use crate::error::{DomainError, DomainResult, Resource};
use crate::models::user::User;

pub async fn list_users(pool: &PgPool, principal: &Principal) -> DomainResult<Vec<User>> {
    if principal.is_staff {
        return Ok(User::list_all(pool).await?);
    }

    let me = User::find_by_id(pool, principal.user_id).await?;
    Ok(me.into_iter().collect())
}

pub async fn get_user(pool: &PgPool, principal: &Principal, user_id: Uuid) -> DomainResult<User> {
    if !principal.is_staff && principal.user_id != user_id {
        return Err(DomainError::NotFound(Resource::User));
    }

    User::find_by_id(pool, user_id)
        .await?
        .ok_or(DomainError::NotFound(Resource::User))
}
