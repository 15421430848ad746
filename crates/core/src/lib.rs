//! Taskdeck domain core.
//!
//! Shared vocabulary for every other crate: id and timestamp aliases, the
//! domain error type, closed status enums, role canonicalization, the
//! permission matrices, and the small pure helpers (stopwatch, tree
//! assembly) used by the task and document views.

pub mod error;
pub mod permissions;
pub mod roles;
pub mod status;
pub mod stopwatch;
pub mod tree;
pub mod types;
