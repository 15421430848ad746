//! Taskdeck toasts and notifications.
//!
//! - [`ToastBus`] - in-process publish/subscribe hub for transient
//!   [`Toast`]s, backed by `tokio::sync::broadcast`.
//! - [`NotificationEmitter`] - publishes a toast and, when asked, writes a
//!   durable notification record for the owning user.

pub mod bus;
pub mod emitter;

pub use bus::{Toast, ToastBus};
pub use emitter::{Emitted, NotificationEmitter, PersistTarget};
