//! Shared fixtures for controller tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::{json, Value};
use taskdeck_core::types::Id;
use taskdeck_events::{Toast, ToastBus};
use taskdeck_remote::auth::AuthUser;
use taskdeck_remote::testing::ScriptedBackend;
use taskdeck_remote::{AuthEvent, RemoteClient, RemoteError, Session, SessionContext};
use taskdeck_sync::AppContext;
use tokio::sync::broadcast;

pub struct Harness {
    pub backend: Arc<ScriptedBackend>,
    pub ctx: AppContext,
    pub toasts: broadcast::Receiver<Toast>,
    pub user_id: Id,
}

impl Harness {
    /// Signed-in context over a scripted backend.
    pub async fn signed_in() -> Self {
        Self::build(Duration::from_secs(5), true).await
    }

    pub async fn signed_out() -> Self {
        Self::build(Duration::from_secs(5), false).await
    }

    /// Signed in, with a short timeout for bounded calls.
    pub async fn with_call_timeout(timeout: Duration) -> Self {
        Self::build(timeout, true).await
    }

    async fn build(call_timeout: Duration, signed_in: bool) -> Self {
        let backend = ScriptedBackend::new();
        let client = RemoteClient::new(backend.clone()).with_call_timeout(call_timeout);
        let session = Arc::new(SessionContext::new());
        let user_id = Id::new_v4();
        if signed_in {
            session
                .set_session(
                    Session {
                        access_token: "access".to_string(),
                        refresh_token: "refresh".to_string(),
                        expires_at: Utc::now() + chrono::Duration::hours(1),
                        user: AuthUser {
                            id: user_id,
                            email: Some("jane@example.com".to_string()),
                            user_metadata: Value::Null,
                        },
                    },
                    AuthEvent::SignedIn { user_id },
                )
                .await;
        }
        let bus = Arc::new(ToastBus::default());
        let toasts = bus.subscribe();
        Self {
            backend,
            ctx: AppContext::new(client, session, bus),
            toasts,
            user_id,
        }
    }

    /// Every toast published so far, in order.
    pub fn drain_toasts(&mut self) -> Vec<Toast> {
        let mut out = Vec::new();
        while let Ok(toast) = self.toasts.try_recv() {
            out.push(toast);
        }
        out
    }
}

pub fn denied() -> RemoteError {
    RemoteError::PermissionDenied {
        message: "new row violates row-level security policy".to_string(),
    }
}

pub fn member_row(project_id: Id, user_id: Id, name: &str, role: &str) -> Value {
    json!({
        "id": Id::new_v4(),
        "project_id": project_id,
        "user_id": user_id,
        "full_name": name,
        "role": role
    })
}

pub fn project_row(owner: Id, name: &str, status: &str, progress: i32) -> Value {
    json!({
        "id": Id::new_v4(),
        "name": name,
        "description": null,
        "progress": progress,
        "status": status,
        "due_date": "2025-12-01",
        "user_id": owner,
        "created_at": "2025-06-01T09:00:00Z",
        "updated_at": null
    })
}

pub fn task_row(id: Id, creator: Id, title: &str, status: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": null,
        "status": status,
        "priority": "medium",
        "due_date": null,
        "completed": status == "completed",
        "completed_at": null,
        "project_id": null,
        "user_id": creator,
        "created_at": "2025-06-01T09:00:00Z",
        "task_assignees": []
    })
}

pub fn notification_row(user_id: Id, title: &str, read: bool) -> Value {
    json!({
        "id": Id::new_v4(),
        "user_id": user_id,
        "title": title,
        "message": "m",
        "type": "info",
        "related_type": null,
        "related_id": null,
        "read": read,
        "created_at": "2025-06-01T09:00:00Z"
    })
}
