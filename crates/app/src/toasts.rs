//! Log sink for the toast bus.
//!
//! Without a UI attached, toasts are written to the log at a level matching
//! their severity.

use taskdeck_core::status::NotificationSeverity;
use taskdeck_events::Toast;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;

/// Forward every toast to `tracing` until `cancel` fires or the bus closes.
/// Returns how many toasts were logged.
pub async fn log_toasts(mut rx: broadcast::Receiver<Toast>, cancel: CancellationToken) -> usize {
    let mut logged = 0;
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            received = rx.recv() => match received {
                Ok(toast) => {
                    log_toast(&toast);
                    logged += 1;
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Toast log fell behind");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }
    logged
}

fn log_toast(toast: &Toast) {
    match toast.severity {
        NotificationSeverity::Error => {
            tracing::error!(title = %toast.title, "{}", toast.message)
        }
        NotificationSeverity::Warning => {
            tracing::warn!(title = %toast.title, "{}", toast.message)
        }
        NotificationSeverity::Info | NotificationSeverity::Success => {
            tracing::info!(title = %toast.title, "{}", toast.message)
        }
    }
}
