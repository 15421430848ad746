//! Taskdeck client binary support: configuration and the toast log sink.

pub mod config;
pub mod toasts;
