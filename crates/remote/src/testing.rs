//! In-memory scripted [`Backend`] for tests.
//!
//! Responses are keyed by [`Operation::label`] (`select:tasks`,
//! `rpc:get_project_members`, ...). Queued responses are consumed in order;
//! a sticky response answers every call once the queue is empty. Every
//! executed operation is recorded for assertions.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::backend::Backend;
use crate::error::RemoteError;
use crate::operation::Operation;

#[derive(Clone)]
struct Scripted {
    delay: Option<Duration>,
    result: Result<Value, RemoteError>,
}

#[derive(Default)]
struct Script {
    queued: HashMap<String, VecDeque<Scripted>>,
    sticky: HashMap<String, Scripted>,
    calls: Vec<Operation>,
}

#[derive(Default)]
pub struct ScriptedBackend {
    script: Mutex<Script>,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn enqueue(&self, label: &str, scripted: Scripted) {
        self.lock()
            .queued
            .entry(label.to_string())
            .or_default()
            .push_back(scripted);
    }

    /// Answer the next call to `label` with `value`.
    pub fn reply(&self, label: &str, value: Value) {
        self.enqueue(
            label,
            Scripted {
                delay: None,
                result: Ok(value),
            },
        );
    }

    /// Fail the next call to `label` with `error`.
    pub fn fail(&self, label: &str, error: RemoteError) {
        self.enqueue(
            label,
            Scripted {
                delay: None,
                result: Err(error),
            },
        );
    }

    /// Answer the next call to `label` after sleeping for `delay`.
    pub fn delay(&self, label: &str, delay: Duration, result: Result<Value, RemoteError>) {
        self.enqueue(
            label,
            Scripted {
                delay: Some(delay),
                result,
            },
        );
    }

    /// Answer every call to `label` with `result` once its queue is empty.
    pub fn always(&self, label: &str, result: Result<Value, RemoteError>) {
        self.lock().sticky.insert(
            label.to_string(),
            Scripted {
                delay: None,
                result,
            },
        );
    }

    /// All executed operations, in order.
    pub fn calls(&self) -> Vec<Operation> {
        self.lock().calls.clone()
    }

    /// Labels of all executed operations, in order.
    pub fn call_labels(&self) -> Vec<String> {
        self.lock().calls.iter().map(Operation::label).collect()
    }

    pub fn calls_to(&self, label: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|op| op.label() == label)
            .count()
    }

    /// The most recent operation executed against `label`.
    pub fn last_call(&self, label: &str) -> Option<Operation> {
        self.lock()
            .calls
            .iter()
            .rev()
            .find(|op| op.label() == label)
            .cloned()
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn execute(&self, op: &Operation) -> Result<Value, RemoteError> {
        let label = op.label();
        let scripted = {
            let mut script = self.lock();
            script.calls.push(op.clone());
            let queued = script.queued.get_mut(&label).and_then(VecDeque::pop_front);
            queued.or_else(|| script.sticky.get(&label).cloned())
        };

        let Some(scripted) = scripted else {
            return Err(RemoteError::not_found(format!(
                "no scripted response for {label}"
            )));
        };
        if let Some(delay) = scripted.delay {
            tokio::time::sleep(delay).await;
        }
        scripted.result
    }
}
