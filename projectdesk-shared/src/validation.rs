/// Validation layer
///
/// Wire payloads are deserialized into the structs below, normalized (string
/// fields are trimmed) and checked with `validator`. Every field rule runs and
/// failures are grouped by field into [`FieldErrors`], keeping the first
/// failing rule per field. Only when all fields pass do the cross-field rules
/// run; those need the store and the resolved project.
///
/// | Field                | Rules                                               |
/// |----------------------|-----------------------------------------------------|
/// | `Project.name`       | required, non-blank, ≤ 255 chars                    |
/// | `Project.description`| ≤ 1000 chars, may be empty                          |
/// | `Task.title`         | required, non-blank, ≤ 255 chars                    |
/// | `Task.description`   | ≤ 10000 chars, may be empty                         |
/// | `Task.due_date`      | not earlier than "now"                              |
/// | `Task.assigned_to_id`| user exists, then user is a member of the project   |
/// | `Comment.content`    | required, non-blank, ≤ 1000 chars, stored trimmed   |
///
/// # Example
///
/// ```
/// use projectdesk_shared::validation::CommentPayload;
///
/// let payload = CommentPayload {
///     content: Some("  hello  ".to_string()),
///     task_id: None,
/// };
/// let fields = payload.into_fields().unwrap();
/// assert_eq!(fields.content, "hello");
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::PgPool;
use std::borrow::Cow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::error::{DomainError, DomainResult, FieldErrors};
use crate::models::membership::{ProjectMembership, ProjectRole};
use crate::models::project::{NewProject, ProjectChanges};
use crate::models::task::{TaskChanges, TaskPriority, TaskStatus};
use crate::models::user::User;

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const COMMENT_EMPTY: &str = "Comment content cannot be empty";
pub const COMMENT_TOO_LONG: &str = "Comment content cannot exceed 1000 characters";
pub const DUE_DATE_IN_PAST: &str = "Due date cannot be in the past.";
pub const ASSIGNEE_NOT_MEMBER: &str = "User is not a member of this project";

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some(Cow::Borrowed(BLANK));
        return Err(err);
    }
    Ok(())
}

fn comment_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some(Cow::Borrowed(COMMENT_EMPTY));
        return Err(err);
    }
    Ok(())
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

/// Distinguishes an absent key from an explicit `null`
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn check<T: Validate>(payload: &T) -> Result<(), FieldErrors> {
    payload.validate().map_err(FieldErrors::from)
}

/// A due date must not be strictly earlier than `now`
pub fn check_due_date(due_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> FieldErrors {
    match due_date {
        Some(due) if due < now => FieldErrors::single("due_date", DUE_DATE_IN_PAST),
        _ => FieldErrors::new(),
    }
}

/// Cross-field rule for task assignment
///
/// Runs after field rules pass and after the task's project is known.
///
/// # Errors
///
/// - `UserNotFound` if `assignee` does not exist
/// - `Validation` on `assigned_to_id` if the user is not a project member
pub async fn check_assignee(pool: &PgPool, project_id: Uuid, assignee: Uuid) -> DomainResult<()> {
    if !User::exists(pool, assignee).await? {
        return Err(DomainError::UserNotFound);
    }

    if !ProjectMembership::is_member(pool, project_id, assignee).await? {
        tracing::debug!(
            project_id = %project_id,
            user_id = %assignee,
            "Assignee is not a project member"
        );
        return Err(FieldErrors::single("assigned_to_id", ASSIGNEE_NOT_MEMBER).into());
    }

    Ok(())
}

/// Body of `createProject`
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct ProjectPayload {
    #[validate(
        required(message = "This field is required."),
        custom(function = "not_blank"),
        length(max = 255, message = "Ensure this field has no more than 255 characters.")
    )]
    pub name: Option<String>,

    #[validate(length(max = 1000, message = "Ensure this field has no more than 1000 characters."))]
    pub description: Option<String>,
}

impl ProjectPayload {
    pub fn into_new_project(self) -> DomainResult<NewProject> {
        let payload = Self {
            name: trimmed(self.name),
            description: trimmed(self.description),
        };
        check(&payload)?;

        Ok(NewProject {
            name: payload.name.unwrap_or_default(),
            description: payload.description.unwrap_or_default(),
        })
    }
}

/// Body of `updateProject`; absent fields stay unchanged
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct ProjectPatch {
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "Ensure this field has no more than 255 characters.")
    )]
    pub name: Option<String>,

    #[validate(length(max = 1000, message = "Ensure this field has no more than 1000 characters."))]
    pub description: Option<String>,
}

impl ProjectPatch {
    pub fn into_changes(self) -> DomainResult<ProjectChanges> {
        let patch = Self {
            name: trimmed(self.name),
            description: trimmed(self.description),
        };
        check(&patch)?;

        Ok(ProjectChanges {
            name: patch.name,
            description: patch.description,
        })
    }
}

/// Body of `createTask`
///
/// `project_id` is only read on direct creation; under a project route the
/// route's project replaces it.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct TaskPayload {
    #[validate(
        required(message = "This field is required."),
        custom(function = "not_blank"),
        length(max = 255, message = "Ensure this field has no more than 255 characters.")
    )]
    pub title: Option<String>,

    #[validate(length(max = 10000, message = "Ensure this field has no more than 10000 characters."))]
    pub description: Option<String>,

    pub status: Option<TaskStatus>,

    pub priority: Option<TaskPriority>,

    pub assigned_to_id: Option<Uuid>,

    pub project_id: Option<Uuid>,

    pub due_date: Option<DateTime<Utc>>,
}

/// Task fields that passed field-level validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFields {
    pub title: String,

    pub description: String,

    pub status: TaskStatus,

    pub priority: TaskPriority,

    pub assigned_to: Option<Uuid>,

    pub due_date: Option<DateTime<Utc>>,
}

impl TaskPayload {
    /// Field rules only; the assignee rule runs later via [`check_assignee`]
    pub fn into_fields(self, now: DateTime<Utc>) -> DomainResult<TaskFields> {
        let payload = Self {
            title: trimmed(self.title),
            description: trimmed(self.description),
            ..self
        };

        let mut errors = check(&payload).err().unwrap_or_default();
        errors.merge(check_due_date(payload.due_date, now));
        errors.into_result()?;

        Ok(TaskFields {
            title: payload.title.unwrap_or_default(),
            description: payload.description.unwrap_or_default(),
            status: payload.status.unwrap_or_default(),
            priority: payload.priority.unwrap_or_default(),
            assigned_to: payload.assigned_to_id,
            due_date: payload.due_date,
        })
    }
}

/// Body of `updateTask`
///
/// For `assigned_to_id` and `due_date`, an explicit `null` clears the value
/// and an absent key leaves it alone.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct TaskPatch {
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "Ensure this field has no more than 255 characters.")
    )]
    pub title: Option<String>,

    #[validate(length(max = 10000, message = "Ensure this field has no more than 10000 characters."))]
    pub description: Option<String>,

    pub status: Option<TaskStatus>,

    pub priority: Option<TaskPriority>,

    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub assigned_to_id: Option<Option<Uuid>>,

    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl TaskPatch {
    pub fn into_changes(self, now: DateTime<Utc>) -> DomainResult<TaskChanges> {
        let patch = Self {
            title: trimmed(self.title),
            description: trimmed(self.description),
            ..self
        };

        let mut errors = check(&patch).err().unwrap_or_default();
        errors.merge(check_due_date(patch.due_date.flatten(), now));
        errors.into_result()?;

        Ok(TaskChanges {
            title: patch.title,
            description: patch.description,
            status: patch.status,
            priority: patch.priority,
            assigned_to: patch.assigned_to_id,
            due_date: patch.due_date,
        })
    }
}

/// Body of `createComment`
///
/// `task_id` is only read on direct creation.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct CommentPayload {
    #[validate(
        required(message = "This field is required."),
        custom(function = "comment_not_blank"),
        length(max = 1000, message = "Comment content cannot exceed 1000 characters")
    )]
    pub content: Option<String>,

    pub task_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentFields {
    /// Trimmed
    pub content: String,
}

impl CommentPayload {
    pub fn into_fields(self) -> DomainResult<CommentFields> {
        let payload = Self {
            content: trimmed(self.content),
            ..self
        };
        check(&payload)?;

        Ok(CommentFields {
            content: payload.content.unwrap_or_default(),
        })
    }
}

/// Body of `updateComment`
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct CommentPatch {
    #[validate(
        custom(function = "comment_not_blank"),
        length(max = 1000, message = "Comment content cannot exceed 1000 characters")
    )]
    pub content: Option<String>,
}

impl CommentPatch {
    /// `None` when there is nothing to change
    pub fn into_content(self) -> DomainResult<Option<String>> {
        let patch = Self {
            content: trimmed(self.content),
        };
        check(&patch)?;

        Ok(patch.content)
    }
}

/// Body of `addMember`
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct AddMemberPayload {
    #[validate(required(message = "This field is required."))]
    pub user_id: Option<Uuid>,

    /// `Admin` or `Member`; defaults to `Member`
    pub role: Option<String>,
}

impl AddMemberPayload {
    /// Returns the target user and the raw role string
    ///
    /// The role is parsed by the membership registry so an unknown value
    /// surfaces as `InvalidRole`.
    pub fn into_parts(self) -> DomainResult<(Uuid, String)> {
        check(&self)?;

        let user_id = self
            .user_id
            .ok_or_else(|| DomainError::from(FieldErrors::single("user_id", REQUIRED)))?;
        let role = self
            .role
            .unwrap_or_else(|| ProjectRole::default().as_str().to_string());

        Ok((user_id, role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn field_errors(result: DomainResult<impl std::fmt::Debug>) -> FieldErrors {
        match result {
            Err(DomainError::Validation(errors)) => errors,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_project_name_rules() {
        let ok = ProjectPayload {
            name: Some("  Alpha ".to_string()),
            description: None,
        }
        .into_new_project()
        .unwrap();
        assert_eq!(ok.name, "Alpha");
        assert_eq!(ok.description, "");

        let missing = field_errors(ProjectPayload::default().into_new_project());
        assert_eq!(missing.get("name").unwrap(), [REQUIRED]);

        let blank = field_errors(
            ProjectPayload {
                name: Some("   ".to_string()),
                description: None,
            }
            .into_new_project(),
        );
        assert_eq!(blank.get("name").unwrap(), [BLANK]);

        let long = field_errors(
            ProjectPayload {
                name: Some("x".repeat(256)),
                description: Some("d".repeat(1001)),
            }
            .into_new_project(),
        );
        assert_eq!(long.len(), 2);
        assert!(long.get("description").is_some());
    }

    #[test]
    fn test_project_patch_leaves_absent_fields() {
        let changes = ProjectPatch {
            name: None,
            description: Some(" new ".to_string()),
        }
        .into_changes()
        .unwrap();
        assert_eq!(changes.name, None);
        assert_eq!(changes.description.as_deref(), Some("new"));

        let blank = field_errors(
            ProjectPatch {
                name: Some(String::new()),
                description: None,
            }
            .into_changes(),
        );
        assert_eq!(blank.get("name").unwrap(), [BLANK]);
    }

    #[test]
    fn test_comment_content_rules() {
        let blank = field_errors(
            CommentPayload {
                content: Some("   ".to_string()),
                task_id: None,
            }
            .into_fields(),
        );
        assert_eq!(blank.get("content").unwrap(), [COMMENT_EMPTY]);

        let long = field_errors(
            CommentPayload {
                content: Some("a".repeat(1001)),
                task_id: None,
            }
            .into_fields(),
        );
        assert_eq!(long.get("content").unwrap(), [COMMENT_TOO_LONG]);

        let ok = CommentPayload {
            content: Some("  hello  ".to_string()),
            task_id: None,
        }
        .into_fields()
        .unwrap();
        assert_eq!(ok.content, "hello");

        let exactly_max = CommentPayload {
            content: Some("a".repeat(1000)),
            task_id: None,
        };
        assert!(exactly_max.into_fields().is_ok());
    }

    #[test]
    fn test_comment_patch() {
        assert_eq!(CommentPatch::default().into_content().unwrap(), None);
        assert_eq!(
            CommentPatch {
                content: Some(" edited ".to_string())
            }
            .into_content()
            .unwrap()
            .as_deref(),
            Some("edited")
        );
        let blank = field_errors(
            CommentPatch {
                content: Some("\t\n".to_string()),
            }
            .into_content(),
        );
        assert_eq!(blank.get("content").unwrap(), [COMMENT_EMPTY]);
    }

    #[test]
    fn test_task_defaults_and_trim() {
        let now = Utc::now();
        let fields = TaskPayload {
            title: Some(" Ship it ".to_string()),
            ..Default::default()
        }
        .into_fields(now)
        .unwrap();

        assert_eq!(fields.title, "Ship it");
        assert_eq!(fields.description, "");
        assert_eq!(fields.status, TaskStatus::ToDo);
        assert_eq!(fields.priority, TaskPriority::Medium);
        assert_eq!(fields.assigned_to, None);
    }

    #[test]
    fn test_task_collects_all_field_errors() {
        let now = Utc::now();
        let errors = field_errors(
            TaskPayload {
                title: Some(" ".to_string()),
                description: Some("d".repeat(10_001)),
                due_date: Some(now - Duration::days(1)),
                ..Default::default()
            }
            .into_fields(now),
        );

        assert_eq!(errors.get("title").unwrap(), [BLANK]);
        assert!(errors.get("description").is_some());
        assert_eq!(errors.get("due_date").unwrap(), [DUE_DATE_IN_PAST]);
    }

    #[test]
    fn test_due_date_boundary() {
        let now = Utc::now();
        assert!(check_due_date(Some(now), now).is_empty());
        assert!(check_due_date(Some(now + Duration::minutes(1)), now).is_empty());
        assert!(check_due_date(None, now).is_empty());
        assert!(!check_due_date(Some(now - Duration::seconds(1)), now).is_empty());
    }

    #[test]
    fn test_task_patch_null_clears_and_absent_keeps() {
        let now = Utc::now();

        let clear: TaskPatch = serde_json::from_str(r#"{"assigned_to_id": null}"#).unwrap();
        let changes = clear.into_changes(now).unwrap();
        assert_eq!(changes.assigned_to, Some(None));
        assert_eq!(changes.due_date, None);

        let keep: TaskPatch = serde_json::from_str(r#"{"status": "Done"}"#).unwrap();
        let changes = keep.into_changes(now).unwrap();
        assert_eq!(changes.assigned_to, None);
        assert_eq!(changes.status, Some(TaskStatus::Done));
    }

    #[test]
    fn test_task_patch_rejects_past_due_date() {
        let now = Utc::now();
        let errors = field_errors(
            TaskPatch {
                due_date: Some(Some(now - Duration::hours(2))),
                ..Default::default()
            }
            .into_changes(now),
        );
        assert_eq!(errors.get("due_date").unwrap(), [DUE_DATE_IN_PAST]);

        // Clearing a due date is always allowed
        assert!(TaskPatch {
            due_date: Some(None),
            ..Default::default()
        }
        .into_changes(now)
        .is_ok());
    }

    #[test]
    fn test_add_member_payload() {
        let user_id = Uuid::new_v4();
        let (id, role) = AddMemberPayload {
            user_id: Some(user_id),
            role: None,
        }
        .into_parts()
        .unwrap();
        assert_eq!(id, user_id);
        assert_eq!(role, "Member");

        let missing = field_errors(AddMemberPayload::default().into_parts());
        assert_eq!(missing.get("user_id").unwrap(), [REQUIRED]);
    }
}
