//! Project record and DTOs.

use serde::{Deserialize, Serialize};
use taskdeck_core::status::ProjectStatus;
use taskdeck_core::types::{Date, Id, Timestamp};
use validator::Validate;

use super::Record;

/// A row from the `projects` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: Id,
    pub name: String,
    pub description: Option<String>,
    /// Percent complete, 0-100.
    pub progress: i32,
    pub status: ProjectStatus,
    pub due_date: Option<Date>,
    /// Owning user.
    pub user_id: Id,
    pub created_at: Timestamp,
    pub updated_at: Option<Timestamp>,
}

impl Record for ProjectRecord {
    fn id(&self) -> Id {
        self.id
    }
}

impl ProjectRecord {
    pub fn is_owned_by(&self, user_id: Id) -> bool {
        self.user_id == user_id
    }

    /// Apply a patch locally, ahead of the server's answer.
    pub fn apply(&mut self, patch: &UpdateProject) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(progress) = patch.progress {
            self.progress = progress;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = Some(due_date);
        }
    }
}

/// DTO for creating a project. Status and progress are fixed at creation.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreateProject {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: String,
    pub description: Option<String>,
    pub due_date: Option<Date>,
}

impl CreateProject {
    /// Insert payload: a fresh project is `not-started` at 0 percent.
    pub fn to_insert(&self, owner: Id) -> serde_json::Value {
        serde_json::json!({
            "name": self.name.trim(),
            "description": self.description.as_deref().filter(|d| !d.trim().is_empty()),
            "due_date": self.due_date,
            "status": ProjectStatus::NotStarted,
            "progress": 0,
            "user_id": owner,
        })
    }
}

/// DTO for updating project settings. All fields are optional.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct UpdateProject {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, max = 100, message = "must be between 0 and 100"))]
    pub progress: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Date>,
}
