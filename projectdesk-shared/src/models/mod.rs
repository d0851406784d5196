/// Database models for projectdesk
///
/// Each model owns its SQL. Reads that take a [`crate::auth::Principal`] apply
/// the visibility predicate from [`crate::auth::scope`]; the unscoped lookups
/// (`find_by_id`) are for the hierarchy manager and tests.
///
/// # Models
///
/// - `user`: principals provisioned by the identity provider
/// - `project`: root of the ownership hierarchy
/// - `membership`: (project, user, role) registry
/// - `task`: work items owned by a project
/// - `comment`: discussion owned by a task
///
/// # Example
///
/// ```no_run
/// use projectdesk_shared::models::user::{CreateUser, User};
/// use projectdesk_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     username: "alice".to_string(),
///     is_staff: false,
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod comment;
pub mod membership;
pub mod project;
pub mod task;
pub mod user;
