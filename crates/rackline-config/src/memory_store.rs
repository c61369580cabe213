//! In-process order store.

use parking_lot::{Mutex, RwLock};
use rackline_core::{ChainError, OrderRecord};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::store::{OrderObserver, OrderStore, SubscriptionId, Subscribers};

/// Order store that keeps the order in memory.
///
/// Used for ephemeral chains (the `monitor` command) and in tests. The backing
/// "medium" can be made to fail on demand with [`set_fail_writes`] and
/// [`corrupt`], which exercises the same recovery paths as a broken file.
///
/// [`set_fail_writes`]: MemoryOrderStore::set_fail_writes
/// [`corrupt`]: MemoryOrderStore::corrupt
pub struct MemoryOrderStore {
    /// `Err` carries the reason the stored order cannot be read.
    order: RwLock<Result<OrderRecord, String>>,
    writer: Mutex<()>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
    subscribers: Subscribers,
}

impl MemoryOrderStore {
    /// Store holding [`OrderRecord::default`].
    pub fn new() -> Self {
        Self::with_order(OrderRecord::default())
    }

    /// Store holding `order`.
    pub fn with_order(order: OrderRecord) -> Self {
        Self {
            order: RwLock::new(Ok(order)),
            writer: Mutex::new(()),
            fail_writes: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
            subscribers: Subscribers::new(),
        }
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Mark the stored order unreadable until the next successful write.
    pub fn corrupt(&self, reason: impl Into<String>) {
        *self.order.write() = Err(reason.into());
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of registered observers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl Default for MemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderStore for MemoryOrderStore {
    fn get_order(&self) -> Result<OrderRecord, ChainError> {
        self.order
            .read()
            .clone()
            .map_err(ChainError::store_unavailable)
    }

    fn set_order(&self, new: OrderRecord) -> Result<(), ChainError> {
        let _writer = self.writer.lock();
        new.check()?;

        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ChainError::write_failure("memory store rejects writes"));
        }

        *self.order.write() = Ok(new);
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.subscribers.notify();
        Ok(())
    }

    fn subscribe(&self, observer: OrderObserver) -> SubscriptionId {
        self.subscribers.add(observer)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }
}
