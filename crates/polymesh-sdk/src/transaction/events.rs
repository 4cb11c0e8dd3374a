//! Status listeners and subscription handles.

use crate::transaction::{TransactionError, TransactionStatus};
use polymesh_sdk_types::H256;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::debug;

/// Published to status listeners on every transition.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    /// The new status.
    pub status: TransactionStatus,
    /// Hash of the extrinsic, once broadcast.
    pub tx_hash: Option<H256>,
    /// The failure, for non-success terminal statuses.
    pub error: Option<TransactionError>,
}

type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Registry<E> {
    next_id: u64,
    entries: Vec<(u64, Listener<E>)>,
}

/// A set of listeners for events of type `E`.
pub(crate) struct Listeners<E> {
    inner: Arc<Mutex<Registry<E>>>,
}

impl<E> Clone for Listeners<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: 'static> fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.len())
            .finish()
    }
}

fn lock<E>(registry: &Mutex<Registry<E>>) -> MutexGuard<'_, Registry<E>> {
    // A panicking listener runs outside the lock, so poisoning leaves the
    // registry consistent.
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<E: 'static> Listeners<E> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Registry {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    pub(crate) fn len(&self) -> usize {
        lock(&self.inner).entries.len()
    }

    pub(crate) fn subscribe(&self, listener: impl Fn(&E) + Send + Sync + 'static) -> Subscription {
        let id = {
            let mut registry = lock(&self.inner);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.entries.push((id, Arc::new(listener)));
            id
        };

        let weak: Weak<Mutex<Registry<E>>> = Arc::downgrade(&self.inner);
        Subscription {
            release: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    lock(&inner).entries.retain(|(entry, _)| *entry != id);
                    debug!(listener = id, "Listener removed");
                }
            })),
        }
    }

    /// Calls every listener with `event`. Listeners run outside the lock and
    /// may subscribe or unsubscribe.
    pub(crate) fn emit(&self, event: &E) {
        let listeners: Vec<Listener<E>> = lock(&self.inner)
            .entries
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(event);
        }
    }
}

/// Keeps a listener registered. Dropping the handle or calling
/// [`unsubscribe`](Subscription::unsubscribe) removes the listener.
#[must_use = "dropping a Subscription removes its listener"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Removes the listener now.
    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}
