//! Row records and DTOs.
//!
//! Each submodule contains:
//! - A `Deserialize` record matching the row (or RPC result) shape, with
//!   required fields and closed enums so malformed rows fail at decode
//! - A `Serialize + Validate` create DTO
//! - A `Serialize + Validate` update DTO (all `Option` fields) for patches

use taskdeck_core::types::Id;

pub mod dashboard;
pub mod document;
pub mod notification;
pub mod profile;
pub mod project;
pub mod project_item;
pub mod system_role;
pub mod task;
pub mod team_member;
pub mod time_entry;

/// A row with a stable primary key, as held by local collections.
pub trait Record: Clone + Send + Sync + 'static {
    fn id(&self) -> Id;
}
