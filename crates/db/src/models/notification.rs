//! Notification record and DTOs.

use serde::{Deserialize, Serialize};
use taskdeck_core::status::NotificationSeverity;
use taskdeck_core::types::{Id, Timestamp};
use validator::Validate;

use super::Record;

/// A row from the `notifications` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Id,
    pub user_id: Id,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub severity: NotificationSeverity,
    pub related_type: Option<String>,
    pub related_id: Option<Id>,
    #[serde(default)]
    pub read: bool,
    pub created_at: Timestamp,
}

impl Record for Notification {
    fn id(&self) -> Id {
        self.id
    }
}

/// Entity a notification points at, e.g. `("task", id)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedEntity {
    pub kind: String,
    pub id: Id,
}

impl RelatedEntity {
    pub fn new(kind: impl Into<String>, id: Id) -> Self {
        Self {
            kind: kind.into(),
            id,
        }
    }
}

/// DTO for inserting a notification.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct NewNotification {
    pub user_id: Id,
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub severity: NotificationSeverity,
    pub related_type: Option<String>,
    pub related_id: Option<Id>,
    pub read: bool,
}

impl NewNotification {
    pub fn new(
        user_id: Id,
        severity: NotificationSeverity,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            title: title.into(),
            message: message.into(),
            severity,
            related_type: None,
            related_id: None,
            read: false,
        }
    }

    pub fn related_to(mut self, related: Option<RelatedEntity>) -> Self {
        if let Some(related) = related {
            self.related_type = Some(related.kind);
            self.related_id = Some(related.id);
        }
        self
    }
}
