//! Time tracking records.

use serde::{Deserialize, Serialize};
use taskdeck_core::stopwatch::StopwatchRun;
use taskdeck_core::types::{Id, Timestamp};
use validator::Validate;

use super::Record;

/// A row from the `time_entries` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: Id,
    pub task_id: Id,
    pub user_id: Id,
    pub start_time: Timestamp,
    pub end_time: Option<Timestamp>,
    pub duration_seconds: i64,
    pub description: Option<String>,
}

impl Record for TimeEntry {
    fn id(&self) -> Id {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct NewTimeEntry {
    pub task_id: Id,
    pub user_id: Id,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub duration_seconds: i64,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub description: Option<String>,
}

impl NewTimeEntry {
    /// Entry for a finished stopwatch run. Paused time is excluded.
    pub fn from_run(task_id: Id, user_id: Id, run: &StopwatchRun) -> Self {
        Self {
            task_id,
            user_id,
            start_time: run.started_at,
            end_time: run.ended_at,
            duration_seconds: run.duration.num_seconds(),
            description: None,
        }
    }
}

/// Total tracked seconds across entries.
pub fn total_seconds(entries: &[TimeEntry]) -> i64 {
    entries.iter().map(|e| e.duration_seconds.max(0)).sum()
}
