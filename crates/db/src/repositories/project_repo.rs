//! Repository for the `projects` table.

use serde_json::json;
use taskdeck_core::types::Id;
use taskdeck_remote::{FallbackChain, Operation, RemoteClient, RemoteError};

use crate::models::project::{CreateProject, ProjectRecord, UpdateProject};

const TABLE: &str = "projects";

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Projects visible to a user, newest first.
    ///
    /// Prefers `get_user_projects` (owned and member projects); falls back
    /// to the projects the user owns. Both calls are bounded.
    pub async fn list_for_user(client: &RemoteClient, user_id: Id) -> Vec<ProjectRecord> {
        FallbackChain::<Vec<ProjectRecord>>::new("user projects")
            .then("rpc_get_user_projects", move || async move {
                client
                    .rows_bounded(&Operation::rpc(
                        "get_user_projects",
                        json!({ "p_user_id": user_id }),
                    ))
                    .await
            })
            .then("direct_owned", move || async move {
                client
                    .rows_bounded(
                        &Operation::select(TABLE)
                            .eq("user_id", user_id)
                            .order_desc("created_at"),
                    )
                    .await
            })
            .resolve_or_default()
            .await
    }

    /// Find a project by its ID. Bounded.
    pub async fn find_by_id(
        client: &RemoteClient,
        id: Id,
    ) -> Result<Option<ProjectRecord>, RemoteError> {
        let rows = client
            .rows_bounded(&Operation::select(TABLE).eq("id", id).limit(1))
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Insert a project owned by `owner`, returning the created row. Bounded.
    pub async fn create(
        client: &RemoteClient,
        owner: Id,
        input: &CreateProject,
    ) -> Result<ProjectRecord, RemoteError> {
        client
            .one_bounded(&Operation::insert(TABLE, input.to_insert(owner)))
            .await
    }

    /// Patch project settings, returning the updated row.
    pub async fn update(
        client: &RemoteClient,
        id: Id,
        input: &UpdateProject,
    ) -> Result<ProjectRecord, RemoteError> {
        let patch = serde_json::to_value(input)
            .map_err(|e| RemoteError::malformed("update:projects", e))?;
        client
            .one(&Operation::update(TABLE, patch).eq("id", id))
            .await
    }

    /// Delete a project. Members, tasks and line items cascade server-side.
    pub async fn delete(client: &RemoteClient, id: Id) -> Result<(), RemoteError> {
        client.exec(&Operation::delete(TABLE).eq("id", id)).await
    }
}
