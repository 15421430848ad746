//! Local state synchronizer.
//!
//! [`SyncedCollection`] mirrors a remote table in memory with optimistic
//! writes and total rollback. The [`controllers`] build one view each (team
//! roster, task board, project list, ...) on top of it, the repositories in
//! `taskdeck-db` and the emitter in `taskdeck-events`.

pub mod collection;
pub mod context;
pub mod controllers;
pub mod error;

pub use collection::{SyncState, SyncedCollection};
pub use context::AppContext;
pub use error::SyncError;
