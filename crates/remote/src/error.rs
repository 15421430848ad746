//! Classified remote errors.
//!
//! Every backend failure is normalized into [`RemoteError`] so callers can
//! branch on [`ErrorKind`] and render a consistent user-facing message.

use std::time::Duration;

use serde::Deserialize;

/// Coarse classification surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    PermissionDenied,
    NotFound,
    Timeout,
    ConstraintViolation,
    Unclassified,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum RemoteError {
    /// Row-level security rejected the caller.
    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    /// Empty result where a row was required, or unknown table/function.
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// The timeout race fired, or the backend cancelled the statement.
    #[error("Operation timed out")]
    Timeout { after: Option<Duration> },

    /// Unique, foreign-key or check constraint violation.
    #[error("Constraint violation ({code}): {message}")]
    Constraint { code: String, message: String },

    /// The payload did not match the expected shape.
    #[error("Malformed response from {operation}: {message}")]
    Malformed { operation: String, message: String },

    /// The request never produced an HTTP response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Any other non-success response.
    #[error("Unexpected backend error ({status}): {message}")]
    Unexpected { status: u16, message: String },

    /// Every strategy of a fallback chain failed.
    #[error("All {attempts} strategies of '{chain}' failed; last error: {last}")]
    FallbackExhausted {
        chain: String,
        attempts: usize,
        last: Box<RemoteError>,
    },
}

/// PostgREST error body.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

impl RemoteError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RemoteError::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            RemoteError::NotFound { .. } => ErrorKind::NotFound,
            RemoteError::Timeout { .. } => ErrorKind::Timeout,
            RemoteError::Constraint { .. } => ErrorKind::ConstraintViolation,
            RemoteError::FallbackExhausted { last, .. } => last.kind(),
            RemoteError::Malformed { .. }
            | RemoteError::Transport(_)
            | RemoteError::Unexpected { .. } => ErrorKind::Unclassified,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind() == ErrorKind::Timeout
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        RemoteError::NotFound {
            message: message.into(),
        }
    }

    pub fn malformed(operation: impl Into<String>, message: impl ToString) -> Self {
        RemoteError::Malformed {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    /// Short description for a toast.
    pub fn user_message(&self) -> &'static str {
        match self.kind() {
            ErrorKind::PermissionDenied => "You do not have permission to perform this action.",
            ErrorKind::NotFound => "The requested item could not be found.",
            ErrorKind::Timeout => "Operation timed out. Please try again.",
            ErrorKind::ConstraintViolation => "This change conflicts with existing data.",
            ErrorKind::Unclassified => "Something went wrong. Please try again.",
        }
    }

    /// Classify a non-success HTTP response.
    ///
    /// SQLSTATE / PostgREST codes win over the HTTP status when present.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        let message = parsed
            .message
            .clone()
            .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
            .unwrap_or_else(|| format!("HTTP {status}"));
        let message = match (&parsed.details, &parsed.hint) {
            (Some(d), _) if !d.is_empty() => format!("{message} ({d})"),
            (_, Some(h)) if !h.is_empty() => format!("{message} (hint: {h})"),
            _ => message,
        };

        match parsed.code.as_deref() {
            Some("42501") => return RemoteError::PermissionDenied { message },
            Some("PGRST116") | Some("PGRST202") | Some("PGRST205") | Some("42883")
            | Some("42P01") => return RemoteError::NotFound { message },
            Some("57014") => return RemoteError::Timeout { after: None },
            Some(code) if code.starts_with("23") => {
                return RemoteError::Constraint {
                    code: code.to_string(),
                    message,
                }
            }
            _ => {}
        }

        match status {
            401 | 403 => RemoteError::PermissionDenied { message },
            404 => RemoteError::NotFound { message },
            408 | 504 => RemoteError::Timeout { after: None },
            409 => RemoteError::Constraint {
                code: parsed.code.unwrap_or_else(|| "409".to_string()),
                message,
            },
            _ => RemoteError::Unexpected { status, message },
        }
    }
}
