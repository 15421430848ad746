//! Shared handles passed to every controller.

use std::sync::Arc;

use taskdeck_core::types::Id;
use taskdeck_events::{NotificationEmitter, ToastBus};
use taskdeck_remote::{RemoteClient, SessionContext};

use crate::error::SyncError;

/// Remote client, session and emitter, cheap to clone.
#[derive(Clone)]
pub struct AppContext {
    pub client: RemoteClient,
    pub session: Arc<SessionContext>,
    pub emitter: NotificationEmitter,
}

impl AppContext {
    pub fn new(client: RemoteClient, session: Arc<SessionContext>, bus: Arc<ToastBus>) -> Self {
        let emitter = NotificationEmitter::new(bus, client.clone());
        Self {
            client,
            session,
            emitter,
        }
    }

    /// The signed-in user's id, or `Unauthorized`.
    pub async fn current_user(&self) -> Result<Id, SyncError> {
        Ok(self.session.require_user().await?)
    }

    /// Show an error toast for a failed action.
    pub fn report_failure(&self, title: &str, error: &SyncError) {
        self.emitter.error(title, error.user_message());
    }

    /// Report `result` as an error toast when it failed, passing it through.
    pub fn reported<T>(&self, title: &str, result: Result<T, SyncError>) -> Result<T, SyncError> {
        if let Err(e) = &result {
            self.report_failure(title, e);
        }
        result
    }
}
