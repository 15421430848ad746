//! Remote call adapter for the hosted database service.
//!
//! - [`Operation`] - descriptor for one table operation or RPC.
//! - [`Backend`] - transport seam; [`HttpBackend`] speaks PostgREST over
//!   `reqwest`.
//! - [`RemoteClient`] - logging, timeout race and schema-validated decode
//!   on top of a backend.
//! - [`FallbackChain`] - ordered strategies with short-circuit.
//! - [`auth`] - explicit session context and the auth endpoints.

pub mod auth;
pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod fallback;
pub mod http;
pub mod operation;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod timeout;

pub use auth::{AuthClient, AuthEvent, AuthSubscription, Session, SessionContext};
pub use backend::Backend;
pub use client::RemoteClient;
pub use config::{ConfigError, RemoteConfig};
pub use error::{ErrorKind, RemoteError};
pub use fallback::{FallbackChain, Resolved, Usable};
pub use http::HttpBackend;
pub use operation::{OpKind, Operation};
