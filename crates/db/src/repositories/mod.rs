//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async functions that
//! accept `&RemoteClient` as the first argument. Reads that declare a
//! fallback chain never fail: an exhausted chain yields an empty result.
//! Writes return `Result` so callers can roll back and report the
//! classified error.

pub mod access_repo;
pub mod document_repo;
pub mod notification_repo;
pub mod profile_repo;
pub mod project_item_repo;
pub mod project_repo;
pub mod role_repo;
pub mod subtask_repo;
pub mod task_repo;
pub mod team_repo;
pub mod time_entry_repo;

pub use access_repo::AccessRepo;
pub use document_repo::DocumentRepo;
pub use notification_repo::NotificationRepo;
pub use profile_repo::ProfileRepo;
pub use project_item_repo::ProjectItemRepo;
pub use project_repo::ProjectRepo;
pub use role_repo::RoleRepo;
pub use subtask_repo::SubtaskRepo;
pub use task_repo::TaskRepo;
pub use team_repo::TeamRepo;
pub use time_entry_repo::TimeEntryRepo;

use serde::de::DeserializeOwned;
use serde_json::Value;
use taskdeck_core::types::Id;
use taskdeck_remote::client::{decode_rows, decode_scalar};
use taskdeck_remote::{RemoteError, Usable};

/// What an `add_*` RPC answered with. Deployments differ: newer ones
/// return the stored row, some only its id, older ones nothing at all.
#[derive(Debug, PartialEq)]
pub(crate) enum Added<T> {
    Row(T),
    Id(Id),
    Nothing,
}

impl<T: DeserializeOwned> Added<T> {
    pub(crate) fn decode(label: &str, value: Value) -> Result<Self, RemoteError> {
        let is_id = match &value {
            Value::String(_) => true,
            Value::Array(items) => items.len() == 1 && items[0].is_string(),
            _ => false,
        };
        if is_id {
            return decode_scalar(label, value).map(Added::Id);
        }
        match value {
            Value::Null | Value::Bool(_) | Value::Number(_) => Ok(Added::Nothing),
            Value::Array(items) if !items.iter().all(Value::is_object) => Ok(Added::Nothing),
            rows => Ok(decode_rows::<T>(label, rows)?
                .into_iter()
                .next()
                .map_or(Added::Nothing, Added::Row)),
        }
    }
}

/// A successful add RPC stored the row whatever it answered, so the chain
/// must stop there.
impl<T> Usable for Added<T> {
    fn is_usable(&self) -> bool {
        true
    }
}
