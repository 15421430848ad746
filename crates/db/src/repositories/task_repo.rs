//! Repository for `tasks` and the `task_assignees` join table.

use taskdeck_core::types::{Id, Timestamp};
use taskdeck_remote::{Operation, RemoteClient, RemoteError};

use crate::models::task::{CreateTask, TaskRecord, UpdateTask, TASK_COLUMNS};

const TABLE: &str = "tasks";
const ASSIGNEES: &str = "task_assignees";

/// Provides CRUD operations for tasks. Mutations are bounded.
pub struct TaskRepo;

impl TaskRepo {
    /// Tasks in a project with their assignees, newest first.
    pub async fn list_for_project(
        client: &RemoteClient,
        project_id: Id,
    ) -> Result<Vec<TaskRecord>, RemoteError> {
        client
            .rows(
                &Operation::select(TABLE)
                    .columns(TASK_COLUMNS)
                    .eq("project_id", project_id)
                    .order_desc("created_at"),
            )
            .await
    }

    /// Tasks created by a user across all projects, newest first.
    pub async fn list_created_by(
        client: &RemoteClient,
        user_id: Id,
    ) -> Result<Vec<TaskRecord>, RemoteError> {
        client
            .rows(
                &Operation::select(TABLE)
                    .columns(TASK_COLUMNS)
                    .eq("user_id", user_id)
                    .order_desc("created_at"),
            )
            .await
    }

    pub async fn create(
        client: &RemoteClient,
        creator: Id,
        input: &CreateTask,
    ) -> Result<TaskRecord, RemoteError> {
        client
            .one_bounded(&Operation::insert(TABLE, input.to_insert(creator)).columns(TASK_COLUMNS))
            .await
    }

    pub async fn update(
        client: &RemoteClient,
        id: Id,
        input: &UpdateTask,
    ) -> Result<TaskRecord, RemoteError> {
        let patch =
            serde_json::to_value(input).map_err(|e| RemoteError::malformed("update:tasks", e))?;
        client
            .one_bounded(
                &Operation::update(TABLE, patch)
                    .eq("id", id)
                    .columns(TASK_COLUMNS),
            )
            .await
    }

    /// Mark a task completed (or reopen it), stamping `completed_at`.
    pub async fn set_completed(
        client: &RemoteClient,
        id: Id,
        completed: bool,
        now: Timestamp,
    ) -> Result<TaskRecord, RemoteError> {
        Self::update(client, id, &UpdateTask::completion(completed, now)).await
    }

    pub async fn delete(client: &RemoteClient, id: Id) -> Result<(), RemoteError> {
        client
            .exec_bounded(&Operation::delete(TABLE).eq("id", id))
            .await
    }

    pub async fn assign(client: &RemoteClient, task_id: Id, user_id: Id) -> Result<(), RemoteError> {
        client
            .exec(&Operation::insert(
                ASSIGNEES,
                serde_json::json!({ "task_id": task_id, "user_id": user_id }),
            ))
            .await
    }

    pub async fn unassign(
        client: &RemoteClient,
        task_id: Id,
        user_id: Id,
    ) -> Result<(), RemoteError> {
        client
            .exec(
                &Operation::delete(ASSIGNEES)
                    .eq("task_id", task_id)
                    .eq("user_id", user_id),
            )
            .await
    }
}
