use async_trait::async_trait;
use serde_json::Value;

use crate::error::RemoteError;
use crate::operation::Operation;

/// Transport seam between [`RemoteClient`](crate::RemoteClient) and the
/// hosted database.
///
/// Implementations execute exactly one request and return the raw JSON
/// payload (`Value::Null` for an empty body) or a classified error.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn execute(&self, op: &Operation) -> Result<Value, RemoteError>;
}
