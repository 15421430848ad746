//! Repository for the `time_entries` table.

use taskdeck_core::types::Id;
use taskdeck_remote::{Operation, RemoteClient, RemoteError};

use crate::models::time_entry::{NewTimeEntry, TimeEntry};

const TABLE: &str = "time_entries";

pub struct TimeEntryRepo;

impl TimeEntryRepo {
    /// Entries for a task, most recent first.
    pub async fn list_for_task(
        client: &RemoteClient,
        task_id: Id,
    ) -> Result<Vec<TimeEntry>, RemoteError> {
        client
            .rows(
                &Operation::select(TABLE)
                    .eq("task_id", task_id)
                    .order_desc("start_time"),
            )
            .await
    }

    pub async fn create(client: &RemoteClient, input: &NewTimeEntry) -> Result<TimeEntry, RemoteError> {
        let body = serde_json::to_value(input)
            .map_err(|e| RemoteError::malformed("insert:time_entries", e))?;
        client.one(&Operation::insert(TABLE, body)).await
    }

    pub async fn delete(client: &RemoteClient, id: Id) -> Result<(), RemoteError> {
        client.exec(&Operation::delete(TABLE).eq("id", id)).await
    }
}
