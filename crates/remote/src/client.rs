//! [`RemoteClient`]: logging, the timeout race and decode over a backend.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::backend::Backend;
use crate::error::RemoteError;
use crate::operation::Operation;
use crate::timeout::{bounded, DEFAULT_CALL_TIMEOUT};

/// Cheaply cloneable handle used by every repository.
#[derive(Clone)]
pub struct RemoteClient {
    backend: Arc<dyn Backend>,
    call_timeout: Duration,
}

impl RemoteClient {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Override the duration used by the `*_bounded` calls.
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Execute one operation, returning the raw payload.
    pub async fn call(&self, op: &Operation) -> Result<Value, RemoteError> {
        let label = op.label();
        tracing::debug!(operation = %label, "Remote call");
        match self.backend.execute(op).await {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::warn!(operation = %label, error = %e, "Remote call failed");
                Err(e)
            }
        }
    }

    /// Execute one operation under the timeout race.
    pub async fn call_bounded(&self, op: &Operation) -> Result<Value, RemoteError> {
        let result = bounded(self.call_timeout, self.call(op)).await;
        if let Err(RemoteError::Timeout { .. }) = &result {
            tracing::warn!(
                operation = %op.label(),
                timeout_ms = self.call_timeout.as_millis() as u64,
                "Remote call timed out"
            );
        }
        result
    }

    /// Execute and decode a row set.
    pub async fn rows<T: DeserializeOwned>(&self, op: &Operation) -> Result<Vec<T>, RemoteError> {
        let value = self.call(op).await?;
        decode_rows(&op.label(), value)
    }

    /// Execute under the timeout race and decode a row set.
    pub async fn rows_bounded<T: DeserializeOwned>(
        &self,
        op: &Operation,
    ) -> Result<Vec<T>, RemoteError> {
        let value = self.call_bounded(op).await?;
        decode_rows(&op.label(), value)
    }

    /// Execute and decode exactly one row (e.g. an insert's representation).
    pub async fn one<T: DeserializeOwned>(&self, op: &Operation) -> Result<T, RemoteError> {
        let rows = self.rows(op).await?;
        first_row(&op.label(), rows)
    }

    /// Bounded variant of [`one`](Self::one).
    pub async fn one_bounded<T: DeserializeOwned>(&self, op: &Operation) -> Result<T, RemoteError> {
        let rows = self.rows_bounded(op).await?;
        first_row(&op.label(), rows)
    }

    /// Execute and decode a scalar (e.g. an RPC returning a boolean or id).
    pub async fn scalar<T: DeserializeOwned>(&self, op: &Operation) -> Result<T, RemoteError> {
        let value = self.call(op).await?;
        decode_scalar(&op.label(), value)
    }

    /// Execute, discarding the payload.
    pub async fn exec(&self, op: &Operation) -> Result<(), RemoteError> {
        self.call(op).await.map(|_| ())
    }

    /// Bounded variant of [`exec`](Self::exec).
    pub async fn exec_bounded(&self, op: &Operation) -> Result<(), RemoteError> {
        self.call_bounded(op).await.map(|_| ())
    }
}

/// Decode a row-set payload.
///
/// An array decodes element-wise, a bare object is a single row, and `null`
/// is an empty set. Anything else is malformed.
pub fn decode_rows<T: DeserializeOwned>(label: &str, value: Value) -> Result<Vec<T>, RemoteError> {
    let items = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        obj @ Value::Object(_) => vec![obj],
        other => {
            return Err(RemoteError::malformed(
                label,
                format!("expected rows, got {}", json_type(&other)),
            ))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value(item)
                .map_err(|e| RemoteError::malformed(label, format!("row {i}: {e}")))
        })
        .collect()
}

/// Decode a scalar payload, unwrapping a single-element array.
pub fn decode_scalar<T: DeserializeOwned>(label: &str, value: Value) -> Result<T, RemoteError> {
    let value = match value {
        Value::Array(mut items) if items.len() == 1 => items.remove(0),
        other => other,
    };
    serde_json::from_value(value).map_err(|e| RemoteError::malformed(label, e))
}

fn first_row<T>(label: &str, rows: Vec<T>) -> Result<T, RemoteError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| RemoteError::not_found(format!("{label} returned no rows")))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
