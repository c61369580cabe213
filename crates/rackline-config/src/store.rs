//! The order store contract and its subscriber registry.
//!
//! ```text
//! ReorderController ──► set_order(new) ──► persist ──► notify subscribers
//!                                                          │
//! PresentationList ◄── invalidate ◄────────────────────────┘
//!        │
//!        └──► get_order() on the next refresh
//! ```

use parking_lot::Mutex;
use rackline_core::{ChainError, OrderRecord};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Callback invoked after every successful [`OrderStore::set_order`], and
/// after changes made outside the store when the store can see them.
///
/// Observers receive no payload and re-read the order with
/// [`OrderStore::get_order`]. They may run on a background thread and must
/// not call `set_order` themselves.
pub type OrderObserver = Box<dyn Fn() + Send + Sync>;

/// Handle returned by [`OrderStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Persisted ordered sequence of plugin identifiers for one chain.
///
/// Implementations serialize writers: a `set_order` in flight, including its
/// persistence and notification steps, completes before the next one starts.
/// Readers are never blocked by notification.
pub trait OrderStore: Send + Sync {
    /// Current persisted order.
    ///
    /// # Errors
    ///
    /// [`ChainError::StoreUnavailable`] when the backing store cannot be read.
    fn get_order(&self) -> Result<OrderRecord, ChainError>;

    /// Validate, persist and publish a new order.
    ///
    /// Subscribers are notified only after the write succeeded.
    ///
    /// # Errors
    ///
    /// [`ChainError::InvalidOrder`] if `new` is not a permutation (nothing is
    /// written), [`ChainError::PersistenceWriteFailure`] if the write failed
    /// (the order is unchanged and nobody is notified).
    fn set_order(&self, new: OrderRecord) -> Result<(), ChainError>;

    /// Register an observer, called once per successful `set_order` and once
    /// per observed external change.
    fn subscribe(&self, observer: OrderObserver) -> SubscriptionId;

    /// Remove an observer. Returns `false` if `id` was not registered.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;

    /// [`get_order`](Self::get_order), falling back to
    /// [`OrderRecord::default`] when the store is unreadable.
    fn order_or_default(&self) -> OrderRecord {
        match self.get_order() {
            Ok(order) => order,
            Err(err) => {
                tracing::warn!(error = %err, "plugin order unreadable, using default order");
                OrderRecord::default()
            }
        }
    }
}

/// Registry of order observers shared by the store implementations.
#[derive(Default)]
pub struct Subscribers {
    next_id: AtomicU64,
    observers: Mutex<Vec<(SubscriptionId, Arc<dyn Fn() + Send + Sync>)>>,
}

impl Subscribers {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer.
    pub fn add(&self, observer: OrderObserver) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.observers.lock().push((id, Arc::from(observer)));
        id
    }

    /// Remove an observer. Removing twice is a no-op.
    pub fn remove(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers.lock();
        let before = observers.len();
        observers.retain(|(sid, _)| *sid != id);
        observers.len() != before
    }

    /// Invoke every observer once, returning how many were called.
    ///
    /// Observers run outside the registry lock, so they may unsubscribe.
    /// Membership is checked again right before each call: an observer removed
    /// by an earlier one is skipped. An observer whose call has already begun
    /// when `remove` returns still runs to completion.
    pub fn notify(&self) -> usize {
        let snapshot: Vec<_> = self
            .observers
            .lock()
            .iter()
            .map(|(id, observer)| (*id, Arc::clone(observer)))
            .collect();
        let mut called = 0;
        for (id, observer) in &snapshot {
            if !self.contains(*id) {
                continue;
            }
            observer();
            called += 1;
        }
        called
    }

    fn contains(&self, id: SubscriptionId) -> bool {
        self.observers.lock().iter().any(|(sid, _)| *sid == id)
    }

    /// Number of registered observers.
    pub fn len(&self) -> usize {
        self.observers.lock().len()
    }

    /// Whether no observer is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, OrderObserver) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        (
            count,
            Box::new(move || {
                c.fetch_add(1, Ordering::SeqCst);
            }),
        )
    }

    #[test]
    fn notify_calls_each_observer_once() {
        let subs = Subscribers::new();
        let (a, obs_a) = counter();
        let (b, obs_b) = counter();
        subs.add(obs_a);
        subs.add(obs_b);

        assert_eq!(subs.notify(), 2);
        assert_eq!(a.load(Ordering::SeqCst), 1);
        assert_eq!(b.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn removed_observer_is_not_called() {
        let subs = Subscribers::new();
        let (count, observer) = counter();
        let id = subs.add(observer);

        assert!(subs.remove(id));
        assert!(!subs.remove(id));
        assert!(subs.is_empty());

        subs.notify();
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn ids_are_unique() {
        let subs = Subscribers::new();
        let a = subs.add(Box::new(|| {}));
        let b = subs.add(Box::new(|| {}));
        assert_ne!(a, b);
        assert_eq!(subs.len(), 2);
    }

    #[test]
    fn observer_removed_during_notify_is_skipped() {
        let subs = Arc::new(Subscribers::new());
        let (count, observer) = counter();
        let victim: Arc<Mutex<Option<SubscriptionId>>> = Arc::new(Mutex::new(None));

        let subs_ref = Arc::clone(&subs);
        let victim_ref = Arc::clone(&victim);
        subs.add(Box::new(move || {
            if let Some(id) = victim_ref.lock().take() {
                subs_ref.remove(id);
            }
        }));
        *victim.lock() = Some(subs.add(observer));

        assert_eq!(subs.notify(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(subs.len(), 1);
    }
}
