//! Cross-surface invalidation.
//!
//! Surfaces that cache aggregates derived from the remote store (totals,
//! charts) register a listener and recompute when a committed change touches
//! their month. Dispatch is synchronous: listeners run inside `publish`.
//! There is no replay, so a listener registered after a publish never sees it.
//!
//! Registration is tied to the lifetime of the returned [`Subscription`];
//! dropping it removes the listener.

use std::sync::{
    Arc, Mutex, PoisonError, Weak,
    atomic::{AtomicU64, Ordering},
};

use serde::{Deserialize, Serialize};

use crate::{MonthScope, TransactionId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidationReason {
    Created,
    Deleted,
}

/// A committed change to one transaction of one month.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvalidationEvent {
    pub id: TransactionId,
    pub scope: MonthScope,
    pub reason: InvalidationReason,
}

impl InvalidationEvent {
    pub fn deleted(id: TransactionId, scope: MonthScope) -> Self {
        Self {
            id,
            scope,
            reason: InvalidationReason::Deleted,
        }
    }

    pub fn created(id: TransactionId, scope: MonthScope) -> Self {
        Self {
            id,
            scope,
            reason: InvalidationReason::Created,
        }
    }
}

type Listener = Arc<dyn Fn(&InvalidationEvent) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(u64, Listener)>>,
}

impl Registry {
    fn remove(&self, id: u64) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(listener_id, _)| *listener_id != id);
    }
}

/// Observer registry for [`InvalidationEvent`]s.
///
/// Cheap to clone: clones publish to the same listeners.
#[derive(Clone, Default)]
pub struct InvalidationBroadcaster {
    registry: Arc<Registry>,
}

impl core::fmt::Debug for InvalidationBroadcaster {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InvalidationBroadcaster")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl InvalidationBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&InvalidationEvent) + Send + Sync + 'static,
    {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        self.registry
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Deliver `event` to every registered listener.
    ///
    /// Returns how many listeners were called.
    pub fn publish(&self, event: InvalidationEvent) -> usize {
        // Listeners may subscribe or unsubscribe from inside the callback.
        let listeners: Vec<Listener> = self
            .registry
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        tracing::debug!(
            id = %event.id,
            scope = %event.scope,
            reason = ?event.reason,
            listeners = listeners.len(),
            "publishing invalidation"
        );

        for listener in &listeners {
            listener(&event);
        }
        listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        self.registry
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Keeps a listener registered. Dropping it deregisters the listener.
#[must_use = "dropping a subscription deregisters its listener"]
pub struct Subscription {
    id: u64,
    registry: Weak<Registry>,
}

impl Subscription {
    /// Deregister explicitly.
    pub fn cancel(self) {}
}

impl core::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}
