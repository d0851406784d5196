/// API route handlers
///
/// Handlers are thin: extract the [`Principal`](projectdesk_shared::auth::Principal),
/// path and body, call `projectdesk_shared::service`, and serialize the result.
///
/// - `health`: health check
/// - `users`: user directory
/// - `projects`: projects and membership
/// - `tasks`: tasks, globally and nested under a project
/// - `comments`: comments, globally and nested under a task

pub mod comments;
pub mod health;
pub mod projects;
pub mod tasks;
pub mod users;
