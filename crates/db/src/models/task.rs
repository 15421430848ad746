//! Task, assignee and subtask records.

use serde::{Deserialize, Deserializer, Serialize};
use taskdeck_core::status::{TaskPriority, TaskStatus};
use taskdeck_core::types::{Date, Id, Timestamp};
use validator::Validate;

use super::Record;

/// Select list embedding assignees and their display names.
pub const TASK_COLUMNS: &str = "*, task_assignees(user_id, profiles(full_name))";

/// A row from the `tasks` table with its assignees flattened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: Id,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<Date>,
    #[serde(default)]
    pub completed: bool,
    pub completed_at: Option<Timestamp>,
    pub project_id: Option<Id>,
    /// Creator.
    pub user_id: Id,
    pub created_at: Timestamp,
    #[serde(
        default,
        rename(deserialize = "task_assignees"),
        deserialize_with = "flatten_assignees"
    )]
    pub assignees: Vec<Assignee>,
}

impl Record for TaskRecord {
    fn id(&self) -> Id {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignee {
    pub user_id: Id,
    pub name: Option<String>,
}

/// `task_assignees(user_id, profiles(full_name))` join row.
#[derive(Deserialize)]
struct AssigneeJoin {
    user_id: Id,
    profiles: Option<ProfileName>,
}

#[derive(Deserialize)]
struct ProfileName {
    full_name: Option<String>,
}

fn flatten_assignees<'de, D>(deserializer: D) -> Result<Vec<Assignee>, D::Error>
where
    D: Deserializer<'de>,
{
    let rows: Option<Vec<AssigneeJoin>> = Option::deserialize(deserializer)?;
    Ok(rows
        .unwrap_or_default()
        .into_iter()
        .map(|row| Assignee {
            user_id: row.user_id,
            name: row.profiles.and_then(|p| p.full_name),
        })
        .collect())
}

impl TaskRecord {
    pub fn is_done(&self) -> bool {
        self.completed || self.status == TaskStatus::Completed
    }

    pub fn is_overdue(&self, today: Date) -> bool {
        !self.is_done() && self.due_date.is_some_and(|due| due < today)
    }

    /// Open and due within `days` from `today` (inclusive).
    pub fn is_due_within(&self, today: Date, days: i64) -> bool {
        !self.is_done()
            && self
                .due_date
                .is_some_and(|due| due >= today && (due - today).num_days() <= days)
    }

    pub fn is_assigned_to(&self, user_id: Id) -> bool {
        self.assignees.iter().any(|a| a.user_id == user_id)
    }

    pub fn apply(&mut self, patch: &UpdateTask) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = Some(due_date);
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(completed_at) = patch.completed_at {
            self.completed_at = completed_at;
        }
    }
}

/// DTO for creating a task.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreateTask {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<Date>,
    pub project_id: Option<Id>,
}

impl CreateTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            due_date: None,
            project_id: None,
        }
    }

    pub fn to_insert(&self, creator: Id) -> serde_json::Value {
        serde_json::json!({
            "title": self.title.trim(),
            "description": self.description,
            "status": self.status,
            "priority": self.priority,
            "due_date": self.due_date,
            "project_id": self.project_id,
            "completed": self.status == TaskStatus::Completed,
            "user_id": creator,
        })
    }
}

/// DTO for editing a task. All fields are optional.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct UpdateTask {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    /// `Some(None)` clears the completion timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Option<Timestamp>>,
}

impl UpdateTask {
    /// Patch for setting completion explicitly. Reopening moves the task
    /// back to `todo`; the status it had before completion is not stored.
    pub fn completion(completed: bool, now: Timestamp) -> Self {
        Self {
            status: Some(if completed {
                TaskStatus::Completed
            } else {
                TaskStatus::Todo
            }),
            completed: Some(completed),
            completed_at: Some(completed.then_some(now)),
            ..Default::default()
        }
    }

    /// Patch flipping `task`'s completion. A task flagged completed while
    /// its status says otherwise keeps that status when reopened.
    pub fn toggle(task: &TaskRecord, now: Timestamp) -> Self {
        let mut patch = Self::completion(!task.is_done(), now);
        if task.is_done() && task.status != TaskStatus::Completed {
            patch.status = None;
        }
        patch
    }
}

/// A row from the `task_subtasks` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: Id,
    pub task_id: Id,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: Timestamp,
}

impl Record for Subtask {
    fn id(&self) -> Id {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreateSubtask {
    pub task_id: Id,
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: String,
}
