//! # Resolution Cache
//!
//! Every resolved artifact of a definition lives in a [`Slot`]. A slot moves
//! `Vacant -> Resolving -> Ready` and never back out of `Ready`, so each
//! artifact is computed at most once per definition instance.
//!
//! When a definition is shared between threads the slot is a critical
//! section: the first caller resolves, concurrent callers block until the
//! value is ready. A resolver that re-enters its own slot on the same thread
//! gets [`ResolveError::Reentrant`] instead of recursing.

use crate::error::{ResolveError, ResolveResult};
use crate::model::Model;
use crate::repository::Repository;
use crate::resource::ApiResource;
use crate::schema::Schema;
use crate::transformer::Transformer;
use serde::Serialize;
use std::fmt::{self, Display};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

/// Kind of resolved artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Artifact {
    Schema,
    Repository,
    Transformer,
    Resource,
    Model,
}

impl Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Artifact::Schema => "schema",
            Artifact::Repository => "repository",
            Artifact::Transformer => "transformer",
            Artifact::Resource => "resource",
            Artifact::Model => "model",
        })
    }
}

enum SlotState<T> {
    Vacant,
    Resolving(ThreadId),
    Ready(T),
}

/// A lazily populated, write-once cache entry.
pub struct Slot<T> {
    artifact: Artifact,
    state: Mutex<SlotState<T>>,
    ready: Condvar,
}

impl<T: Clone> Slot<T> {
    pub fn new(artifact: Artifact) -> Self {
        Self {
            artifact,
            state: Mutex::new(SlotState::Vacant),
            ready: Condvar::new(),
        }
    }

    /// Returns the cached value, if resolved.
    pub fn get(&self) -> Option<T> {
        match &*self.lock() {
            SlotState::Ready(value) => Some(value.clone()),
            _ => None,
        }
    }

    /// Returns the cached value or runs `init` to produce it.
    ///
    /// A failed `init` leaves the slot vacant and returns the error.
    pub fn get_or_try_init<F>(&self, init: F) -> ResolveResult<T>
    where
        F: FnOnce() -> ResolveResult<T>,
    {
        let current = thread::current().id();
        let mut state = self.lock();
        loop {
            let in_flight = match &*state {
                SlotState::Ready(value) => return Ok(value.clone()),
                SlotState::Resolving(owner) if *owner == current => {
                    return Err(ResolveError::Reentrant(self.artifact));
                }
                SlotState::Resolving(_) => true,
                SlotState::Vacant => false,
            };
            if !in_flight {
                break;
            }
            state = self
                .ready
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *state = SlotState::Resolving(current);
        drop(state);

        let guard = ResolvingGuard { slot: self };
        let result = init();
        std::mem::forget(guard);

        self.settle(match &result {
            Ok(value) => SlotState::Ready(value.clone()),
            Err(_) => SlotState::Vacant,
        });
        result
    }

    fn settle(&self, next: SlotState<T>) {
        *self.lock() = next;
        self.ready.notify_all();
    }

    fn lock(&self) -> MutexGuard<'_, SlotState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Vacates the slot and wakes waiters if `init` unwinds.
struct ResolvingGuard<'a, T: Clone> {
    slot: &'a Slot<T>,
}

impl<T: Clone> Drop for ResolvingGuard<'_, T> {
    fn drop(&mut self) {
        self.slot.settle(SlotState::Vacant);
    }
}

/// Per-definition cache of resolved artifacts.
pub struct ResolvedCache {
    pub(crate) schema: Slot<Arc<Schema>>,
    /// Schema as declared by hooks and decorators, before store-backed
    /// definitions seed it from the derived table.
    pub(crate) declared_schema: Slot<Arc<Schema>>,
    pub(crate) repository: Slot<Option<Arc<dyn Repository>>>,
    pub(crate) transformer: Slot<Arc<dyn Transformer>>,
    pub(crate) resource: Slot<Arc<ApiResource>>,
    pub(crate) model: Slot<Arc<Model>>,
}

impl Default for ResolvedCache {
    fn default() -> Self {
        Self {
            schema: Slot::new(Artifact::Schema),
            declared_schema: Slot::new(Artifact::Schema),
            repository: Slot::new(Artifact::Repository),
            transformer: Slot::new(Artifact::Transformer),
            resource: Slot::new(Artifact::Resource),
            model: Slot::new(Artifact::Model),
        }
    }
}

impl ResolvedCache {
    /// Artifacts resolved so far.
    pub fn resolved(&self) -> Vec<Artifact> {
        let mut resolved = Vec::new();
        if self.schema.get().is_some() {
            resolved.push(Artifact::Schema);
        }
        if self.repository.get().is_some() {
            resolved.push(Artifact::Repository);
        }
        if self.transformer.get().is_some() {
            resolved.push(Artifact::Transformer);
        }
        if self.resource.get().is_some() {
            resolved.push(Artifact::Resource);
        }
        if self.model.get().is_some() {
            resolved.push(Artifact::Model);
        }
        resolved
    }
}
