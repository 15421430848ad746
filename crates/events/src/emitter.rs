//! Toast-then-persist notification emitter.
//!
//! The toast is always published first. When a [`PersistTarget`] is given,
//! a notification record is written for that user afterwards; a failed
//! write is logged and never suppresses the toast.

use std::sync::Arc;

use taskdeck_core::status::NotificationSeverity;
use taskdeck_core::types::Id;
use taskdeck_db::models::notification::{NewNotification, Notification, RelatedEntity};
use taskdeck_db::repositories::NotificationRepo;
use taskdeck_remote::{RemoteClient, RemoteError};

use crate::bus::{Toast, ToastBus};

/// Whom a persisted notification belongs to and what it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistTarget {
    pub user_id: Id,
    pub related: Option<RelatedEntity>,
}

impl PersistTarget {
    pub fn user(user_id: Id) -> Self {
        Self {
            user_id,
            related: None,
        }
    }

    pub fn related(mut self, kind: impl Into<String>, id: Id) -> Self {
        self.related = Some(RelatedEntity::new(kind, id));
        self
    }
}

/// What an emit produced.
#[derive(Debug, Clone)]
pub struct Emitted {
    pub toast: Toast,
    /// The stored record, or `None` when persistence was not requested or
    /// failed.
    pub record: Option<Notification>,
}

#[derive(Clone)]
pub struct NotificationEmitter {
    bus: Arc<ToastBus>,
    client: RemoteClient,
}

impl NotificationEmitter {
    pub fn new(bus: Arc<ToastBus>, client: RemoteClient) -> Self {
        Self { bus, client }
    }

    pub fn bus(&self) -> &Arc<ToastBus> {
        &self.bus
    }

    /// Publish a toast only.
    pub fn toast(
        &self,
        severity: NotificationSeverity,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Toast {
        let toast = Toast::new(severity, title, message);
        self.bus.publish(toast.clone());
        toast
    }

    /// Publish a toast, then persist a notification when `persist` is set.
    pub async fn emit(
        &self,
        severity: NotificationSeverity,
        title: impl Into<String>,
        message: impl Into<String>,
        persist: Option<PersistTarget>,
    ) -> Emitted {
        let toast = self.toast(severity, title, message);

        let record = match persist {
            None => None,
            Some(target) => {
                let input = NewNotification::new(
                    target.user_id,
                    severity,
                    toast.title.clone(),
                    toast.message.clone(),
                )
                .related_to(target.related);

                match NotificationRepo::create(&self.client, &input).await {
                    Ok(record) => Some(record),
                    Err(e) => {
                        tracing::error!(
                            user_id = %target.user_id,
                            title = %toast.title,
                            error = %e,
                            "Failed to persist notification"
                        );
                        None
                    }
                }
            }
        };

        Emitted { toast, record }
    }

    pub fn success(&self, title: impl Into<String>, message: impl Into<String>) -> Toast {
        self.toast(NotificationSeverity::Success, title, message)
    }

    /// Error toast whose message comes from the error classification.
    pub fn remote_failure(&self, title: impl Into<String>, error: &RemoteError) -> Toast {
        self.toast(NotificationSeverity::Error, title, error.user_message())
    }

    pub fn error(&self, title: impl Into<String>, message: impl Into<String>) -> Toast {
        self.toast(NotificationSeverity::Error, title, message)
    }
}
