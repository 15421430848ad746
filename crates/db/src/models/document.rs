//! Project folders and files.

use serde::{Deserialize, Serialize};
use taskdeck_core::tree::TreeItem;
use taskdeck_core::types::{Id, Timestamp};
use validator::Validate;

use super::Record;

/// A row from the `project_folders` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: Id,
    pub project_id: Id,
    pub name: String,
    pub parent_id: Option<Id>,
    pub created_at: Timestamp,
}

impl Record for Folder {
    fn id(&self) -> Id {
        self.id
    }
}

impl TreeItem for Folder {
    type Key = Id;

    fn key(&self) -> Id {
        self.id
    }

    fn parent_key(&self) -> Option<Id> {
        self.parent_id
    }
}

/// A row from the `project_files` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    pub id: Id,
    pub project_id: Id,
    pub folder_id: Option<Id>,
    pub name: String,
    pub file_path: String,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    pub created_at: Timestamp,
}

impl Record for FileEntry {
    fn id(&self) -> Id {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct NewFolder {
    pub project_id: Id,
    #[validate(length(min = 1, max = 120, message = "must be 1-120 characters"))]
    pub name: String,
    pub parent_id: Option<Id>,
}
