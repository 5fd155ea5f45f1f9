//! Explicit state container with subscriber notification.
//!
//! Components keep their state in a [`Store`] instead of relying on a
//! rendering layer to own it. Reads take a snapshot, writes go through a
//! closure that mutates the state in place, and every accepted write notifies
//! subscribers with the new state.
//!
//! # Example
//!
//! ```rust
//! use softsell::store::Store;
//!
//! let store = Store::new(0_u32);
//! store.set_state(|n| *n += 1);
//! assert_eq!(store.get_state(), 1);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Callback invoked with the state after each accepted write.
type Listener<S> = Arc<dyn Fn(&S) + Send + Sync>;

/// Handle returned by [`Store::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Shared, cloneable handle to a piece of component state.
pub struct Store<S> {
    inner: Arc<StoreInner<S>>,
}

struct StoreInner<S> {
    state: RwLock<S>,
    listeners: RwLock<Vec<(SubscriptionId, Listener<S>)>>,
    next_id: AtomicU64,
}

impl<S> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.read().unwrap_or_else(PoisonError::into_inner);
        let listeners = self
            .inner
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("Store")
            .field("state", &*state)
            .field("listeners", &listeners)
            .finish()
    }
}

impl<S: Default + Clone + Send + Sync + 'static> Default for Store<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: Clone + Send + Sync + 'static> Store<S> {
    /// Create a store holding `initial`.
    #[must_use]
    pub fn new(initial: S) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(initial),
                listeners: RwLock::new(Vec::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn get_state(&self) -> S {
        self.with_state(Clone::clone)
    }

    /// Read the current state without cloning it.
    pub fn with_state<R>(&self, read: impl FnOnce(&S) -> R) -> R {
        let guard = self.inner.state.read().unwrap_or_else(PoisonError::into_inner);
        read(&guard)
    }

    /// Apply a partial update and notify subscribers.
    ///
    /// Returns whatever the update closure returns.
    pub fn set_state<R>(&self, update: impl FnOnce(&mut S) -> R) -> R {
        let (result, snapshot) = {
            let mut guard = self.inner.state.write().unwrap_or_else(PoisonError::into_inner);
            let result = update(&mut guard);
            (result, self.snapshot_for_listeners(&guard))
        };
        if let Some(snapshot) = snapshot {
            self.notify(&snapshot);
        }
        result
    }

    /// Apply an update that may decline to change anything.
    ///
    /// When the closure returns `None` the state is assumed untouched and no
    /// subscriber is notified.
    pub fn try_set_state<R>(&self, update: impl FnOnce(&mut S) -> Option<R>) -> Option<R> {
        let (result, snapshot) = {
            let mut guard = self.inner.state.write().unwrap_or_else(PoisonError::into_inner);
            let result = update(&mut guard)?;
            (result, self.snapshot_for_listeners(&guard))
        };
        if let Some(snapshot) = snapshot {
            self.notify(&snapshot);
        }
        Some(result)
    }

    /// Register a listener called after every accepted write.
    pub fn subscribe(&self, listener: impl Fn(&S) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut guard = self
            .inner
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = guard.len();
        guard.retain(|(existing, _)| *existing != id);
        guard.len() != before
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Clone the state only when someone will see it.
    fn snapshot_for_listeners(&self, state: &S) -> Option<S> {
        (self.subscriber_count() > 0).then(|| state.clone())
    }

    fn notify(&self, snapshot: &S) {
        // Listeners are cloned out so they can touch the store themselves.
        let listeners: Vec<Listener<S>> = self
            .inner
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(snapshot);
        }
    }
}
