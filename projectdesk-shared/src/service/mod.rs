/// Transport-agnostic operation surface
///
/// Each operation takes the store, the [`Principal`](crate::auth::Principal)
/// issuing the request and typed inputs, and returns a
/// [`DomainResult`](crate::error::DomainResult). HTTP handlers are thin
/// wrappers around these.
///
/// | Operation        | Failure modes                                                  |
/// |------------------|----------------------------------------------------------------|
/// | `list_projects`  | none                                                           |
/// | `create_project` | Validation                                                     |
/// | `get_project`    | NotFound                                                       |
/// | `update_project` | NotFound, Forbidden, Validation                                |
/// | `delete_project` | NotFound, Forbidden                                            |
/// | `list_members`   | NotFound                                                       |
/// | `add_member`     | NotFound, Forbidden, Validation, InvalidRole, UserNotFound, DuplicateMember |
/// | `authorize_project` | NotFound, Forbidden                                          |
/// | `list_tasks`     | none; empty when the parent is hidden                          |
/// | `create_task`    | NotFound(parent), Validation, UserNotFound                     |
/// | `get_task`       | NotFound                                                       |
/// | `update_task`    | NotFound, Validation, UserNotFound                             |
/// | `delete_task`    | NotFound                                                       |
/// | `list_comments`  | none; empty when the parent is hidden                          |
/// | `create_comment` | NotFound(parent), Validation                                   |
/// | `get_comment`    | NotFound                                                       |
/// | `update_comment` | NotFound, Forbidden, Validation                                |
/// | `delete_comment` | NotFound, Forbidden                                            |
/// | `list_users`     | none                                                           |
/// | `get_user`       | NotFound                                                       |

pub mod comments;
pub mod projects;
pub mod tasks;
pub mod users;

pub use comments::{create_comment, delete_comment, get_comment, list_comments, update_comment};
pub use projects::{
    add_member, authorize_project, create_project, delete_project, get_project, list_members, list_projects,
    update_project,
};
pub use tasks::{create_task, delete_task, get_task, list_tasks, update_task};
pub use users::{get_user, list_users};
