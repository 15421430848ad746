//! Repository for the `task_subtasks` table.

use serde_json::json;
use taskdeck_core::types::Id;
use taskdeck_remote::{Operation, RemoteClient, RemoteError};

use crate::models::task::{CreateSubtask, Subtask};

const TABLE: &str = "task_subtasks";

pub struct SubtaskRepo;

impl SubtaskRepo {
    /// Subtasks of a task, oldest first.
    pub async fn list_for_task(
        client: &RemoteClient,
        task_id: Id,
    ) -> Result<Vec<Subtask>, RemoteError> {
        client
            .rows(
                &Operation::select(TABLE)
                    .eq("task_id", task_id)
                    .order_asc("created_at"),
            )
            .await
    }

    pub async fn create(client: &RemoteClient, input: &CreateSubtask) -> Result<Subtask, RemoteError> {
        client
            .one(&Operation::insert(
                TABLE,
                json!({ "task_id": input.task_id, "title": input.title.trim(), "completed": false }),
            ))
            .await
    }

    pub async fn set_completed(
        client: &RemoteClient,
        id: Id,
        completed: bool,
    ) -> Result<Subtask, RemoteError> {
        client
            .one(&Operation::update(TABLE, json!({ "completed": completed })).eq("id", id))
            .await
    }

    pub async fn delete(client: &RemoteClient, id: Id) -> Result<(), RemoteError> {
        client.exec(&Operation::delete(TABLE).eq("id", id)).await
    }
}
