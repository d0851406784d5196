/// Task model and database operations
///
/// A task always belongs to exactly one project and is visible exactly when
/// that project is visible. Every read here that takes a [`Principal`] joins
/// through `projects p` and applies [`visible_project`].
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('To Do', 'In Progress', 'Done');
/// CREATE TYPE task_priority AS ENUM ('Low', 'Medium', 'High');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     status task_status NOT NULL DEFAULT 'To Do',
///     priority task_priority NOT NULL DEFAULT 'Medium',
///     assigned_to UUID REFERENCES users(id) ON DELETE SET NULL,
///     project_id UUID NOT NULL REFERENCES projects(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     due_date TIMESTAMPTZ
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use projectdesk_shared::models::task::{NewTask, Task, TaskPriority, TaskStatus};
/// use projectdesk_shared::auth::Principal;
/// use projectdesk_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example(project_id: Uuid, principal: Principal) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let task = Task::create(&pool, NewTask {
///     title: "Write release notes".to_string(),
///     description: String::new(),
///     status: TaskStatus::ToDo,
///     priority: TaskPriority::High,
///     assigned_to: None,
///     project_id,
///     due_date: None,
/// }).await?;
///
/// let scoped = Task::list_visible(&pool, &principal, Some(project_id)).await?;
/// assert!(scoped.iter().any(|t| t.id == task.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::auth::scope::visible_project;
use crate::auth::Principal;

const TASK_COLUMNS: &str = "t.id, t.title, t.description, t.status, t.priority, \
    t.assigned_to, t.project_id, t.created_at, t.due_date";

/// Workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status")]
pub enum TaskStatus {
    #[default]
    #[sqlx(rename = "To Do")]
    #[serde(rename = "To Do")]
    ToDo,

    #[sqlx(rename = "In Progress")]
    #[serde(rename = "In Progress")]
    InProgress,

    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::ToDo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority")]
pub enum TaskPriority {
    Low,

    #[default]
    Medium,

    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "Low",
            TaskPriority::Medium => "Medium",
            TaskPriority::High => "High",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,

    pub title: String,

    pub description: String,

    pub status: TaskStatus,

    pub priority: TaskPriority,

    /// Assignee; was a project member when last written
    pub assigned_to: Option<Uuid>,

    pub project_id: Uuid,

    pub created_at: DateTime<Utc>,

    pub due_date: Option<DateTime<Utc>>,
}

/// Validated fields for a new task, parent already resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,

    pub description: String,

    pub status: TaskStatus,

    pub priority: TaskPriority,

    pub assigned_to: Option<Uuid>,

    pub project_id: Uuid,

    pub due_date: Option<DateTime<Utc>>,
}

/// Validated partial update
///
/// Outer `None` leaves a column untouched. For the nullable columns
/// `Some(None)` clears the value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskChanges {
    pub title: Option<String>,

    pub description: Option<String>,

    pub status: Option<TaskStatus>,

    pub priority: Option<TaskPriority>,

    pub assigned_to: Option<Option<Uuid>>,

    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl TaskChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.assigned_to.is_none()
            && self.due_date.is_none()
    }
}

impl Task {
    /// Inserts a task
    ///
    /// # Errors
    ///
    /// Returns an error if the project or assignee row is missing (foreign key
    /// violation) or the database connection fails
    pub async fn create(pool: &PgPool, data: NewTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, status, priority, assigned_to, project_id, due_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, title, description, status, priority, assigned_to, project_id, created_at, due_date
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.priority)
        .bind(data.assigned_to)
        .bind(data.project_id)
        .bind(data.due_date)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID, ignoring visibility
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks t WHERE t.id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task whose project the principal can see
    pub async fn find_visible(
        pool: &PgPool,
        id: Uuid,
        principal: &Principal,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks t \
             JOIN projects p ON p.id = t.project_id \
             WHERE t.id = $2 AND {}",
            visible_project(1)
        ))
        .bind(principal.user_id)
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists visible tasks, newest first
    ///
    /// With `project_id` the listing is scoped to that project; a project the
    /// principal cannot see yields an empty list, not an error.
    pub async fn list_visible(
        pool: &PgPool,
        principal: &Principal,
        project_id: Option<Uuid>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks t \
             JOIN projects p ON p.id = t.project_id \
             WHERE {} AND ($2::uuid IS NULL OR t.project_id = $2) \
             ORDER BY t.created_at DESC",
            visible_project(1)
        ))
        .bind(principal.user_id)
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Applies a partial update
    ///
    /// # Returns
    ///
    /// The updated task, `None` if it no longer exists
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        changes: TaskChanges,
    ) -> Result<Option<Self>, sqlx::Error> {
        let set_assignee = changes.assigned_to.is_some();
        let set_due_date = changes.due_date.is_some();

        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                priority = COALESCE($5, priority),
                assigned_to = CASE WHEN $6 THEN $7 ELSE assigned_to END,
                due_date = CASE WHEN $8 THEN $9 ELSE due_date END
            WHERE id = $1
            RETURNING id, title, description, status, priority, assigned_to, project_id, created_at, due_date
            "#,
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.status)
        .bind(changes.priority)
        .bind(set_assignee)
        .bind(changes.assigned_to.flatten())
        .bind(set_due_date)
        .bind(changes.due_date.flatten())
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes the task row only; its comments must already be gone
    pub(crate) async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes every task of a project (cascade step)
    pub(crate) async fn delete_by_project(
        conn: &mut PgConnection,
        project_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE project_id = $1")
            .bind(project_id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_format() {
        assert_eq!(serde_json::to_string(&TaskStatus::ToDo).unwrap(), "\"To Do\"");
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"In Progress\""
        );
        let status: TaskStatus = serde_json::from_str("\"Done\"").unwrap();
        assert_eq!(status, TaskStatus::Done);
        assert!(serde_json::from_str::<TaskStatus>("\"done\"").is_err());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(TaskStatus::default(), TaskStatus::ToDo);
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
    }

    #[test]
    fn test_as_str_matches_wire_format() {
        for status in [TaskStatus::ToDo, TaskStatus::InProgress, TaskStatus::Done] {
            assert_eq!(
                serde_json::to_string(&status).unwrap(),
                format!("\"{}\"", status.as_str())
            );
        }
        for priority in [TaskPriority::Low, TaskPriority::Medium, TaskPriority::High] {
            assert_eq!(
                serde_json::to_string(&priority).unwrap(),
                format!("\"{}\"", priority.as_str())
            );
        }
    }

    #[test]
    fn test_task_changes_is_empty() {
        assert!(TaskChanges::default().is_empty());

        let clear_assignee = TaskChanges {
            assigned_to: Some(None),
            ..Default::default()
        };
        assert!(!clear_assignee.is_empty());
    }
}
