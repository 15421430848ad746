//! Shared fixtures for repository tests.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{json, Value};
use taskdeck_core::types::Id;
use taskdeck_remote::testing::ScriptedBackend;
use taskdeck_remote::{RemoteClient, RemoteError};

pub fn client(backend: &Arc<ScriptedBackend>) -> RemoteClient {
    RemoteClient::new(backend.clone())
}

pub fn denied() -> RemoteError {
    RemoteError::PermissionDenied {
        message: "permission denied for function".to_string(),
    }
}

pub fn missing_function() -> RemoteError {
    RemoteError::not_found("Could not find the function")
}

pub fn member_row(project_id: Id, name: &str, role: &str) -> Value {
    json!({
        "id": Id::new_v4(),
        "project_id": project_id,
        "user_id": Id::new_v4(),
        "full_name": name,
        "role": role
    })
}

pub fn project_row(owner: Id, name: &str) -> Value {
    json!({
        "id": Id::new_v4(),
        "name": name,
        "description": null,
        "progress": 0,
        "status": "not-started",
        "due_date": null,
        "user_id": owner,
        "created_at": "2025-01-01T00:00:00Z",
        "updated_at": null
    })
}

pub fn milestone_row(project_id: Id, title: &str) -> Value {
    json!({
        "id": Id::new_v4(),
        "project_id": project_id,
        "title": title,
        "description": null,
        "due_date": "2025-09-01",
        "status": "pending",
        "created_at": "2025-01-01T00:00:00Z"
    })
}
