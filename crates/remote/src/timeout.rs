//! Fixed-duration timeout race.
//!
//! A subset of calls (project create/fetch, task create/update/delete) is
//! bounded so the UI never waits on them longer than the configured
//! duration. The losing future is dropped.

use std::future::Future;
use std::time::Duration;

use crate::error::RemoteError;

/// Default duration of the timeout race.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_millis(5000);

/// Race `fut` against a timer of `after`.
///
/// Returns [`RemoteError::Timeout`] when the timer wins.
pub async fn bounded<F, T>(after: Duration, fut: F) -> Result<T, RemoteError>
where
    F: Future<Output = Result<T, RemoteError>>,
{
    match tokio::time::timeout(after, fut).await {
        Ok(result) => result,
        Err(_) => Err(RemoteError::Timeout { after: Some(after) }),
    }
}
