//! Task time-tracking stopwatch.
//!
//! Pure state machine: every transition takes the current time, so the
//! caller owns the clock and tests can drive it deterministically.

use chrono::Duration;

use crate::error::CoreError;
use crate::types::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopwatchState {
    Idle,
    Running,
    Paused,
}

#[derive(Debug, Clone)]
pub struct Stopwatch {
    started_at: Option<Timestamp>,
    running_since: Option<Timestamp>,
    accumulated: Duration,
}

/// A finished stopwatch run, ready to be persisted as a time entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopwatchRun {
    pub started_at: Timestamp,
    pub ended_at: Timestamp,
    pub duration: Duration,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    pub fn new() -> Self {
        Self {
            started_at: None,
            running_since: None,
            accumulated: Duration::zero(),
        }
    }

    pub fn state(&self) -> StopwatchState {
        match (self.started_at, self.running_since) {
            (None, _) => StopwatchState::Idle,
            (Some(_), Some(_)) => StopwatchState::Running,
            (Some(_), None) => StopwatchState::Paused,
        }
    }

    pub fn start(&mut self, now: Timestamp) -> Result<(), CoreError> {
        if self.state() != StopwatchState::Idle {
            return Err(CoreError::Conflict("Timer is already started".to_string()));
        }
        self.started_at = Some(now);
        self.running_since = Some(now);
        Ok(())
    }

    pub fn pause(&mut self, now: Timestamp) -> Result<(), CoreError> {
        let since = self
            .running_since
            .take()
            .ok_or_else(|| CoreError::Conflict("Timer is not running".to_string()))?;
        self.accumulated += clamp_non_negative(now - since);
        Ok(())
    }

    pub fn resume(&mut self, now: Timestamp) -> Result<(), CoreError> {
        if self.state() != StopwatchState::Paused {
            return Err(CoreError::Conflict("Timer is not paused".to_string()));
        }
        self.running_since = Some(now);
        Ok(())
    }

    /// Total running time up to `now`, excluding paused intervals.
    pub fn elapsed(&self, now: Timestamp) -> Duration {
        let running = self
            .running_since
            .map(|since| clamp_non_negative(now - since))
            .unwrap_or_else(Duration::zero);
        self.accumulated + running
    }

    /// Stop the stopwatch and reset it to idle.
    pub fn stop(&mut self, now: Timestamp) -> Result<StopwatchRun, CoreError> {
        let started_at = self
            .started_at
            .ok_or_else(|| CoreError::Conflict("Timer was never started".to_string()))?;
        let duration = self.elapsed(now);
        *self = Self::new();
        Ok(StopwatchRun {
            started_at,
            ended_at: now,
            duration,
        })
    }
}

/// Clock skew must never produce negative tracked time.
fn clamp_non_negative(d: Duration) -> Duration {
    d.max(Duration::zero())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> Timestamp {
        chrono::Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn run_excludes_paused_intervals() {
        let mut sw = Stopwatch::new();
        sw.start(at(0)).unwrap();
        sw.pause(at(60)).unwrap();
        assert_eq!(sw.state(), StopwatchState::Paused);
        assert_eq!(sw.elapsed(at(500)), Duration::seconds(60));

        sw.resume(at(600)).unwrap();
        assert_eq!(sw.elapsed(at(630)), Duration::seconds(90));

        let run = sw.stop(at(700)).unwrap();
        assert_eq!(run.started_at, at(0));
        assert_eq!(run.ended_at, at(700));
        assert_eq!(run.duration, Duration::seconds(160));
        assert_eq!(sw.state(), StopwatchState::Idle);
    }

    #[test]
    fn invalid_transitions_are_conflicts() {
        let mut sw = Stopwatch::new();
        assert!(sw.pause(at(0)).is_err());
        assert!(sw.resume(at(0)).is_err());
        assert!(sw.stop(at(0)).is_err());

        sw.start(at(0)).unwrap();
        assert!(sw.start(at(1)).is_err());
        assert!(sw.resume(at(1)).is_err());
    }

    #[test]
    fn backwards_clock_does_not_go_negative() {
        let mut sw = Stopwatch::new();
        sw.start(at(100)).unwrap();
        assert_eq!(sw.elapsed(at(50)), Duration::zero());
    }

    #[test]
    fn stop_while_paused_keeps_accumulated_time() {
        let mut sw = Stopwatch::new();
        sw.start(at(0)).unwrap();
        sw.pause(at(30)).unwrap();
        let run = sw.stop(at(1000)).unwrap();
        assert_eq!(run.duration, Duration::seconds(30));
    }
}
