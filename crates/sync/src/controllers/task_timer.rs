//! Per-task time tracking.
//!
//! Every transition takes the current time from the caller; the stopwatch
//! itself never reads a clock.

use std::sync::{Mutex, PoisonError};

use chrono::Duration;
use taskdeck_core::stopwatch::{Stopwatch, StopwatchState};
use taskdeck_core::types::{Id, Timestamp};
use taskdeck_db::models::time_entry::{self, NewTimeEntry, TimeEntry};
use taskdeck_db::repositories::TimeEntryRepo;
use validator::Validate;

use crate::collection::SyncedCollection;
use crate::context::AppContext;
use crate::error::SyncError;

pub struct TaskTimer {
    ctx: AppContext,
    task_id: Id,
    stopwatch: Mutex<Stopwatch>,
    entries: SyncedCollection<TimeEntry>,
}

impl TaskTimer {
    pub fn new(ctx: AppContext, task_id: Id) -> Self {
        Self {
            ctx,
            task_id,
            stopwatch: Mutex::new(Stopwatch::new()),
            entries: SyncedCollection::new("time entry"),
        }
    }

    fn with_stopwatch<R>(&self, f: impl FnOnce(&mut Stopwatch) -> R) -> R {
        let mut guard = self.stopwatch.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub fn state(&self) -> StopwatchState {
        self.with_stopwatch(|sw| sw.state())
    }

    pub fn start(&self, now: Timestamp) -> Result<(), SyncError> {
        Ok(self.with_stopwatch(|sw| sw.start(now))?)
    }

    pub fn pause(&self, now: Timestamp) -> Result<(), SyncError> {
        Ok(self.with_stopwatch(|sw| sw.pause(now))?)
    }

    pub fn resume(&self, now: Timestamp) -> Result<(), SyncError> {
        Ok(self.with_stopwatch(|sw| sw.resume(now))?)
    }

    pub fn elapsed(&self, now: Timestamp) -> Duration {
        self.with_stopwatch(|sw| sw.elapsed(now))
    }

    /// Stop the stopwatch and persist the run as a time entry.
    ///
    /// The stopwatch is reset even when the save fails; the failed entry is
    /// rolled back and reported.
    pub async fn stop(&self, now: Timestamp) -> Result<TimeEntry, SyncError> {
        let result = async {
            let run = self.with_stopwatch(|sw| sw.stop(now))?;
            let user_id = self.ctx.current_user().await?;
            let input = NewTimeEntry::from_run(self.task_id, user_id, &run);
            input.validate()?;

            let provisional = TimeEntry {
                id: Id::new_v4(),
                task_id: self.task_id,
                user_id,
                start_time: input.start_time,
                end_time: Some(input.end_time),
                duration_seconds: input.duration_seconds,
                description: None,
            };
            self.entries
                .add(provisional, TimeEntryRepo::create(&self.ctx.client, &input))
                .await
        }
        .await;

        let entry = self.ctx.reported("Could not save time entry", result)?;
        tracing::info!(
            task_id = %self.task_id,
            seconds = entry.duration_seconds,
            "Time entry saved"
        );
        Ok(entry)
    }

    pub fn entries(&self) -> Vec<TimeEntry> {
        self.entries.snapshot()
    }

    pub fn total_seconds(&self) -> i64 {
        time_entry::total_seconds(&self.entries.snapshot())
    }

    pub async fn load_entries(&self) -> Result<usize, SyncError> {
        let result = TimeEntryRepo::list_for_task(&self.ctx.client, self.task_id)
            .await
            .map_err(SyncError::from);
        let entries = self.ctx.reported("Could not load time entries", result)?;
        let count = entries.len();
        self.entries.replace_all(entries);
        Ok(count)
    }

    pub async fn delete_entry(&self, id: Id) -> Result<(), SyncError> {
        let result = self
            .entries
            .remove(id, TimeEntryRepo::delete(&self.ctx.client, id))
            .await;
        self.ctx.reported("Could not delete time entry", result)
    }
}
