//! Ordered fallback strategies.
//!
//! The hosted backend exposes several differently-privileged ways to reach
//! the same logical resource (a newer RPC, an older permission-aware RPC, a
//! direct table read). A [`FallbackChain`] declares them once, in order,
//! and resolves them lazily:
//!
//! - a strategy runs only if every earlier one failed;
//! - an error, or an unusable result (empty rows, `None`), moves on;
//! - the final strategy's successful result is accepted even when empty.

use std::future::Future;

use futures::future::BoxFuture;

use crate::error::RemoteError;

/// Whether a successful result from a non-final strategy can be trusted.
///
/// Empty data from an early strategy may be a silent permission filter, so
/// it is not allowed to mask the later strategies.
pub trait Usable {
    fn is_usable(&self) -> bool;
}

impl<T> Usable for Vec<T> {
    fn is_usable(&self) -> bool {
        !self.is_empty()
    }
}

impl<T> Usable for Option<T> {
    fn is_usable(&self) -> bool {
        self.is_some()
    }
}

impl Usable for bool {
    fn is_usable(&self) -> bool {
        true
    }
}

impl Usable for () {
    fn is_usable(&self) -> bool {
        true
    }
}

impl Usable for uuid::Uuid {
    fn is_usable(&self) -> bool {
        true
    }
}

type Strategy<'a, T> = Box<dyn FnOnce() -> BoxFuture<'a, Result<T, RemoteError>> + Send + 'a>;

/// The value produced by a chain and which strategy produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub value: T,
    pub strategy: &'static str,
    /// Zero-based position of the winning strategy.
    pub position: usize,
}

pub struct FallbackChain<'a, T> {
    name: &'static str,
    strategies: Vec<(&'static str, Strategy<'a, T>)>,
}

impl<'a, T> FallbackChain<'a, T>
where
    T: Usable + Send + 'a,
{
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            strategies: Vec::new(),
        }
    }

    /// Append a strategy. It is not invoked until the chain reaches it.
    pub fn then<F, Fut>(mut self, label: &'static str, strategy: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'a,
        Fut: Future<Output = Result<T, RemoteError>> + Send + 'a,
    {
        let boxed: Strategy<'a, T> =
            Box::new(move || -> BoxFuture<'a, Result<T, RemoteError>> { Box::pin(strategy()) });
        self.strategies.push((label, boxed));
        self
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Run strategies in order until one yields an acceptable result.
    pub async fn resolve(self) -> Result<Resolved<T>, RemoteError> {
        let chain = self.name;
        let total = self.strategies.len();
        let mut last_error: Option<RemoteError> = None;

        for (position, (label, run)) in self.strategies.into_iter().enumerate() {
            let is_final = position + 1 == total;
            match run().await {
                Ok(value) if is_final || value.is_usable() => {
                    tracing::debug!(chain, strategy = label, position, "Fallback chain resolved");
                    return Ok(Resolved {
                        value,
                        strategy: label,
                        position,
                    });
                }
                Ok(_) => {
                    tracing::debug!(
                        chain,
                        strategy = label,
                        "Strategy returned no usable data, trying next"
                    );
                    last_error = Some(RemoteError::not_found(format!(
                        "{label} returned no usable data"
                    )));
                }
                Err(e) => {
                    tracing::warn!(chain, strategy = label, error = %e, "Strategy failed");
                    last_error = Some(e);
                }
            }
        }

        tracing::warn!(chain, attempts = total, "Fallback chain exhausted");
        Err(RemoteError::FallbackExhausted {
            chain: chain.to_string(),
            attempts: total,
            last: Box::new(
                last_error.unwrap_or_else(|| RemoteError::not_found("no strategies declared")),
            ),
        })
    }

    /// Resolve, mapping exhaustion to `T::default()` (an empty collection
    /// for reads).
    pub async fn resolve_or_default(self) -> T
    where
        T: Default,
    {
        self.resolve().await.map(|r| r.value).unwrap_or_default()
    }

    /// Resolve, reporting only whether any strategy succeeded.
    pub async fn succeeded(self) -> bool {
        self.resolve().await.is_ok()
    }
}
