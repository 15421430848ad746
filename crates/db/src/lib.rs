//! Typed records and repositories over the hosted database.
//!
//! - [`models`] - one module per table: the decoded row, create/update DTOs.
//! - [`repositories`] - zero-sized `XRepo` structs whose async functions take
//!   a [`RemoteClient`](taskdeck_remote::RemoteClient) as their first
//!   argument and hide RPC-versus-table fallbacks behind one call.

pub mod models;
pub mod repositories;

pub use models::Record;
