//! In-process toast bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`ToastBus`] fans every published [`Toast`] out to all UI subscribers.
//! It is designed to be shared via `Arc<ToastBus>`.

use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use taskdeck_core::status::NotificationSeverity;
use taskdeck_core::types::{Id, Timestamp};
use tokio::sync::broadcast;

/// How long a toast stays on screen unless overridden.
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_secs(5);

/// Errors stay up longer so they can be read.
pub const ERROR_TOAST_DURATION: Duration = Duration::from_secs(8);

// ---------------------------------------------------------------------------
// Toast
// ---------------------------------------------------------------------------

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Toast {
    pub id: Id,
    pub severity: NotificationSeverity,
    pub title: String,
    pub message: String,
    pub duration: Duration,
    pub created_at: Timestamp,
}

impl Toast {
    /// Create a toast with the default duration for its severity.
    pub fn new(
        severity: NotificationSeverity,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let duration = match severity {
            NotificationSeverity::Error => ERROR_TOAST_DURATION,
            _ => DEFAULT_TOAST_DURATION,
        };
        Self {
            id: Id::new_v4(),
            severity,
            title: title.into(),
            message: message.into(),
            duration,
            created_at: Utc::now(),
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

// ---------------------------------------------------------------------------
// ToastBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

pub struct ToastBus {
    sender: broadcast::Sender<Toast>,
}

impl ToastBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest unread toasts are dropped and
    /// slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a toast to all current subscribers.
    ///
    /// With no subscribers the toast is dropped.
    pub fn publish(&self, toast: Toast) {
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(toast);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Toast> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ToastBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_subscriber_receives_the_toast() {
        let bus = ToastBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(Toast::new(NotificationSeverity::Info, "Saved", "Project saved"));

        assert_eq!(rx1.recv().await.unwrap().title, "Saved");
        assert_eq!(rx2.recv().await.unwrap().message, "Project saved");
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        ToastBus::default().publish(Toast::new(NotificationSeverity::Info, "t", "m"));
    }

    #[test]
    fn error_toasts_stay_longer() {
        let toast = Toast::new(NotificationSeverity::Error, "Failed", "x");
        assert_eq!(toast.duration, ERROR_TOAST_DURATION);
        let toast = Toast::new(NotificationSeverity::Success, "Done", "x");
        assert_eq!(toast.duration, DEFAULT_TOAST_DURATION);
        let toast = toast.with_duration(Duration::from_secs(1));
        assert_eq!(toast.duration, Duration::from_secs(1));
    }
}
