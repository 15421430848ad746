//! Optimistic, rollback-capable local collection.
//!
//! Every mutation is applied locally before the remote call is awaited and
//! undone in full if that call fails. Each entry carries a version that is
//! bumped on every local write; a rollback only restores an entry whose
//! version is unchanged, so it never clobbers a newer local write.
//!
//! The lock is a plain `std::sync::Mutex` and is never held across an
//! await.

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use taskdeck_core::error::CoreError;
use taskdeck_core::types::Id;
use taskdeck_db::Record;
use taskdeck_remote::RemoteError;

use crate::error::SyncError;

/// Where an entry stands relative to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Applied locally, remote call in flight.
    Pending,
    /// Matches the last server answer.
    Committed,
    /// The remote create failed and the provisional entry was removed.
    RolledBack,
}

struct Entry<T> {
    item: T,
    state: SyncState,
    version: u64,
}

struct Inner<T> {
    entries: Vec<Entry<T>>,
    next_version: u64,
    rolled_back: HashSet<Id>,
}

impl<T: Record> Inner<T> {
    fn bump(&mut self) -> u64 {
        self.next_version += 1;
        self.next_version
    }

    fn index_of(&self, id: Id) -> Option<usize> {
        self.entries.iter().position(|e| e.item.id() == id)
    }

    fn committed(&mut self, item: T) -> Entry<T> {
        let version = self.bump();
        Entry {
            item,
            state: SyncState::Committed,
            version,
        }
    }
}

pub struct SyncedCollection<T> {
    entity: &'static str,
    inner: Mutex<Inner<T>>,
}

impl<T: Record> SyncedCollection<T> {
    /// `entity` names the item kind in not-found errors and logs.
    pub fn new(entity: &'static str) -> Self {
        Self {
            entity,
            inner: Mutex::new(Inner {
                entries: Vec::new(),
                next_version: 0,
                rolled_back: HashSet::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn not_found(&self, id: Id) -> SyncError {
        SyncError::Core(CoreError::NotFound {
            entity: self.entity,
            id,
        })
    }

    // ---- reads ----

    /// Current items in display order.
    pub fn snapshot(&self) -> Vec<T> {
        self.lock().entries.iter().map(|e| e.item.clone()).collect()
    }

    pub fn get(&self, id: Id) -> Option<T> {
        let inner = self.lock();
        inner.index_of(id).map(|i| inner.entries[i].item.clone())
    }

    pub fn state(&self, id: Id) -> Option<SyncState> {
        let inner = self.lock();
        match inner.index_of(id) {
            Some(i) => Some(inner.entries[i].state),
            None => inner
                .rolled_back
                .contains(&id)
                .then_some(SyncState::RolledBack),
        }
    }

    pub fn position(&self, id: Id) -> Option<usize> {
        self.lock().index_of(id)
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Ids of items matching `pred`, in display order.
    pub fn ids_where(&self, pred: impl Fn(&T) -> bool) -> Vec<Id> {
        self.lock()
            .entries
            .iter()
            .filter(|e| pred(&e.item))
            .map(|e| e.item.id())
            .collect()
    }

    pub fn has_pending(&self) -> bool {
        self.lock()
            .entries
            .iter()
            .any(|e| e.state == SyncState::Pending)
    }

    // ---- reconciliation ----

    /// Replace the contents with a fresh fetch.
    ///
    /// Provisional entries still waiting on a create are kept after the
    /// fetched rows. In-flight updates to fetched rows are superseded, and
    /// earlier rollbacks are forgotten.
    pub fn replace_all(&self, items: Vec<T>) {
        let mut inner = self.lock();
        inner.rolled_back.clear();
        let fetched: HashSet<Id> = items.iter().map(Record::id).collect();
        let pending: Vec<Entry<T>> = std::mem::take(&mut inner.entries)
            .into_iter()
            .filter(|e| e.state == SyncState::Pending && !fetched.contains(&e.item.id()))
            .collect();

        let mut entries = Vec::with_capacity(items.len() + pending.len());
        for item in items {
            let entry = inner.committed(item);
            entries.push(entry);
        }
        entries.extend(pending);
        inner.entries = entries;
    }

    // ---- optimistic mutations ----

    /// Insert `provisional` now, then await the remote create.
    ///
    /// On success the provisional entry is replaced by the server row; a copy
    /// of that row brought in by a refetch meanwhile is dropped. On failure
    /// the provisional entry is removed and the error returned.
    pub async fn add<Fut>(&self, provisional: T, remote: Fut) -> Result<T, SyncError>
    where
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        let provisional_id = provisional.id();
        {
            let mut inner = self.lock();
            let version = inner.bump();
            inner.rolled_back.remove(&provisional_id);
            inner.entries.push(Entry {
                item: provisional,
                state: SyncState::Pending,
                version,
            });
        }

        let result = remote.await;

        let mut inner = self.lock();
        let index = inner.index_of(provisional_id);
        match result {
            Ok(server) => {
                let server_id = server.id();
                inner.rolled_back.remove(&server_id);
                if let Some(mut i) = index {
                    if server_id != provisional_id {
                        if let Some(dup) = inner.index_of(server_id) {
                            inner.entries.remove(dup);
                            if dup < i {
                                i -= 1;
                            }
                        }
                    }
                    let version = inner.bump();
                    inner.entries[i] = Entry {
                        item: server.clone(),
                        state: SyncState::Committed,
                        version,
                    };
                }
                Ok(server)
            }
            Err(e) => {
                if let Some(i) = index {
                    inner.entries.remove(i);
                }
                inner.rolled_back.insert(provisional_id);
                tracing::warn!(entity = self.entity, id = %provisional_id, error = %e, "Create rolled back");
                Err(e.into())
            }
        }
    }

    /// Remove `id` now, then await the remote delete.
    ///
    /// On failure the item is re-inserted at its original position unless it
    /// has been re-added meanwhile.
    pub async fn remove<Fut>(&self, id: Id, remote: Fut) -> Result<(), SyncError>
    where
        Fut: Future<Output = Result<(), RemoteError>>,
    {
        let removed = {
            let mut inner = self.lock();
            let index = inner.index_of(id).ok_or_else(|| self.not_found(id))?;
            let entry = inner.entries.remove(index);
            (index, entry)
        };

        match remote.await {
            Ok(()) => Ok(()),
            Err(e) => {
                let (index, mut entry) = removed;
                let mut inner = self.lock();
                if inner.index_of(id).is_none() {
                    entry.state = SyncState::Committed;
                    let at = index.min(inner.entries.len());
                    inner.entries.insert(at, entry);
                }
                tracing::warn!(entity = self.entity, %id, error = %e, "Delete rolled back");
                Err(e.into())
            }
        }
    }

    /// Apply `patch` to `id` now, then await the remote update.
    ///
    /// The remote call answers with the server row, or `None` when the
    /// backend does not return one (the local value is then kept). On
    /// failure the previous value is restored unless a newer local write
    /// happened meanwhile.
    pub async fn update<F, Fut>(&self, id: Id, patch: F, remote: Fut) -> Result<T, SyncError>
    where
        F: FnOnce(&mut T),
        Fut: Future<Output = Result<Option<T>, RemoteError>>,
    {
        let (previous, previous_state, version) = {
            let mut inner = self.lock();
            let index = inner.index_of(id).ok_or_else(|| self.not_found(id))?;
            let version = inner.bump();
            let entry = &mut inner.entries[index];
            let previous = entry.item.clone();
            let previous_state = entry.state;
            patch(&mut entry.item);
            entry.state = SyncState::Pending;
            entry.version = version;
            (previous, previous_state, version)
        };

        let result = remote.await;

        let mut inner = self.lock();
        let current = inner
            .index_of(id)
            .filter(|&i| inner.entries[i].version == version);

        match result {
            Ok(server) => {
                let Some(i) = current else {
                    // Superseded by a newer write or a refetch.
                    return Ok(server.unwrap_or(previous));
                };
                let entry = &mut inner.entries[i];
                if let Some(server) = server {
                    entry.item = server;
                }
                entry.state = SyncState::Committed;
                Ok(entry.item.clone())
            }
            Err(e) => {
                if let Some(i) = current {
                    let entry = &mut inner.entries[i];
                    entry.item = previous;
                    entry.state = previous_state;
                }
                tracing::warn!(entity = self.entity, %id, error = %e, "Update rolled back");
                Err(e.into())
            }
        }
    }

    /// Apply `patch` to every item matching `pred` now, then await one remote
    /// call covering them all. Returns the ids that were patched.
    ///
    /// Rollback is per item, with the same version rule as [`update`](Self::update).
    pub async fn update_where<P, F, Fut>(
        &self,
        pred: P,
        patch: F,
        remote: Fut,
    ) -> Result<Vec<Id>, SyncError>
    where
        P: Fn(&T) -> bool,
        F: Fn(&mut T),
        Fut: Future<Output = Result<(), RemoteError>>,
    {
        let touched: Vec<(Id, T, SyncState, u64)> = {
            let mut inner = self.lock();
            let mut touched = Vec::new();
            for index in 0..inner.entries.len() {
                if !pred(&inner.entries[index].item) {
                    continue;
                }
                let version = inner.bump();
                let entry = &mut inner.entries[index];
                let previous = entry.item.clone();
                touched.push((previous.id(), previous, entry.state, version));
                patch(&mut entry.item);
                entry.state = SyncState::Pending;
                entry.version = version;
            }
            touched
        };

        let result = remote.await;

        let mut inner = self.lock();
        for (id, previous, previous_state, version) in &touched {
            let Some(i) = inner
                .index_of(*id)
                .filter(|&i| inner.entries[i].version == *version)
            else {
                continue;
            };
            let entry = &mut inner.entries[i];
            if result.is_ok() {
                entry.state = SyncState::Committed;
            } else {
                entry.item = previous.clone();
                entry.state = *previous_state;
            }
        }

        match result {
            Ok(()) => Ok(touched.into_iter().map(|(id, ..)| id).collect()),
            Err(e) => {
                tracing::warn!(entity = self.entity, count = touched.len(), error = %e, "Bulk update rolled back");
                Err(e.into())
            }
        }
    }
}
