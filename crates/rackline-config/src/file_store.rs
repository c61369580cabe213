//! TOML-file backed order store.

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use rackline_core::{ChainError, ChainKind, OrderRecord};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::ConfigError;
use crate::order_file::OrderFile;
use crate::paths::{order_file_path, order_file_path_in};
use crate::store::{OrderObserver, OrderStore, SubscriptionId, Subscribers};

/// Order store persisting one chain's order in its own TOML file.
///
/// Every [`get_order`](OrderStore::get_order) re-reads the file. Writes go
/// through a temporary file and an atomic rename.
///
/// Once the first observer subscribes, the file's directory is watched and
/// writes made by another process (or another store on the same file) are
/// reported to observers as well. A change is reported once, however many
/// file system events it produced.
///
/// A chain that has never been written reads as [`OrderRecord::default`].
/// A file that exists but cannot be parsed into a valid order makes the store
/// unavailable until the next successful write replaces it.
pub struct FileOrderStore {
    shared: Arc<Shared>,
    watcher: Mutex<Option<RecommendedWatcher>>,
}

struct Shared {
    kind: ChainKind,
    path: PathBuf,
    /// Order observers were last told about, `None` when unreadable.
    /// Held for the whole validate → persist → notify sequence.
    published: Mutex<Option<OrderRecord>>,
    subscribers: Subscribers,
}

impl Shared {
    fn read(&self) -> Result<OrderRecord, ChainError> {
        match OrderFile::load(&self.path) {
            Ok(Some(file)) => Ok(file.plugins),
            Ok(None) => Ok(OrderRecord::default()),
            Err(err) => Err(err.into()),
        }
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn concerns(&self, event: &Event) -> bool {
        matches!(
            event.kind,
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
        ) && event
            .paths
            .iter()
            .any(|p| p.file_name() == self.path.file_name())
    }

    /// Re-read the file and notify if it differs from what was last published.
    fn reload(&self) {
        let mut published = self.published.lock();
        let current = self.read().ok();
        if current == *published {
            return;
        }
        tracing::info!(chain = %self.kind, "plugin order changed on disk");
        *published = current;
        self.subscribers.notify();
    }

    fn watch(self: &Arc<Self>) -> Result<RecommendedWatcher, ConfigError> {
        let dir = self.dir().to_path_buf();
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|e| ConfigError::create_dir(&dir, e))?;
        }

        let shared = Arc::clone(self);
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) if shared.concerns(&event) => shared.reload(),
            Ok(_) => {}
            Err(err) => tracing::warn!(chain = %shared.kind, error = %err, "order file watcher error"),
        })
        .map_err(|e| ConfigError::watch(&dir, e))?;
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| ConfigError::watch(&dir, e))?;

        *self.published.lock() = self.read().ok();
        tracing::debug!(chain = %self.kind, dir = %dir.display(), "watching order file");
        Ok(watcher)
    }
}

impl FileOrderStore {
    /// Open the store of `kind` in the user config directory.
    pub fn open(kind: ChainKind) -> Self {
        Self::at_path(kind, order_file_path(kind))
    }

    /// Open the store of `kind` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>, kind: ChainKind) -> Self {
        Self::at_path(kind, order_file_path_in(dir.as_ref(), kind))
    }

    /// Open a store backed by an explicit file.
    pub fn at_path(kind: ChainKind, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        tracing::debug!(chain = %kind, path = %path.display(), "opening order store");
        Self {
            shared: Arc::new(Shared {
                kind,
                path,
                published: Mutex::new(None),
                subscribers: Subscribers::new(),
            }),
            watcher: Mutex::new(None),
        }
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.shared.path
    }

    /// Whether an order has been persisted yet.
    pub fn exists(&self) -> bool {
        self.shared.path.is_file()
    }

    /// Number of registered observers.
    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers.len()
    }

    /// Whether changes made outside this store are being watched.
    pub fn is_watching(&self) -> bool {
        self.watcher.lock().is_some()
    }

    fn ensure_watching(&self) {
        let mut watcher = self.watcher.lock();
        if watcher.is_some() {
            return;
        }
        match self.shared.watch() {
            Ok(w) => *watcher = Some(w),
            Err(err) => tracing::warn!(
                chain = %self.shared.kind,
                error = %err,
                "external order changes will not be reported"
            ),
        }
    }
}

impl OrderStore for FileOrderStore {
    fn get_order(&self) -> Result<OrderRecord, ChainError> {
        self.shared.read()
    }

    fn set_order(&self, new: OrderRecord) -> Result<(), ChainError> {
        let shared = &self.shared;
        let mut published = shared.published.lock();
        new.check()?;

        OrderFile::new(new.clone()).save(&shared.path).map_err(|err| {
            tracing::warn!(chain = %shared.kind, error = %err, "failed to persist plugin order");
            ChainError::from(err)
        })?;

        tracing::debug!(chain = %shared.kind, order = %new, "plugin order persisted");
        *published = Some(new);
        shared.subscribers.notify();
        Ok(())
    }

    fn subscribe(&self, observer: OrderObserver) -> SubscriptionId {
        let id = self.shared.subscribers.add(observer);
        self.ensure_watching();
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.subscribers.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rackline_core::PluginId;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    fn reversed() -> OrderRecord {
        OrderRecord::new(PluginId::all().iter().rev().copied().collect()).unwrap()
    }

    #[test]
    fn fresh_store_reads_default() {
        let dir = TempDir::new().unwrap();
        let store = FileOrderStore::in_dir(dir.path(), ChainKind::SourceOutputs);
        assert!(!store.exists());
        assert_eq!(store.get_order().unwrap(), OrderRecord::default());
    }

    #[test]
    fn order_survives_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = FileOrderStore::in_dir(dir.path(), ChainKind::SourceOutputs);
            store.set_order(reversed()).unwrap();
        }
        let store = FileOrderStore::in_dir(dir.path(), ChainKind::SourceOutputs);
        assert!(store.exists());
        assert_eq!(store.get_order().unwrap(), reversed());
    }

    #[test]
    fn chains_are_independent() {
        let dir = TempDir::new().unwrap();
        let source = FileOrderStore::in_dir(dir.path(), ChainKind::SourceOutputs);
        let sink = FileOrderStore::in_dir(dir.path(), ChainKind::SinkInputs);

        source.set_order(reversed()).unwrap();
        assert_eq!(source.get_order().unwrap(), reversed());
        assert_eq!(sink.get_order().unwrap(), OrderRecord::default());
    }

    #[test]
    fn corrupted_file_is_unavailable_and_falls_back() {
        let dir = TempDir::new().unwrap();
        let store = FileOrderStore::in_dir(dir.path(), ChainKind::SourceOutputs);
        std::fs::write(store.path(), "plugins = [\"limiter\", \"bogus\"").unwrap();

        let err = store.get_order().unwrap_err();
        assert!(matches!(err, ChainError::StoreUnavailable { .. }));
        assert_eq!(store.order_or_default(), OrderRecord::default());
    }

    #[test]
    fn write_repairs_corrupted_file() {
        let dir = TempDir::new().unwrap();
        let store = FileOrderStore::in_dir(dir.path(), ChainKind::SourceOutputs);
        std::fs::write(store.path(), "not toml at all [").unwrap();

        store.set_order(reversed()).unwrap();
        assert_eq!(store.get_order().unwrap(), reversed());
    }

    #[test]
    fn observers_see_new_order_after_write() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(FileOrderStore::in_dir(dir.path(), ChainKind::SinkInputs));
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let store_ref = Arc::clone(&store);
        let seen_ref = Arc::clone(&seen);
        store.subscribe(Box::new(move || {
            seen_ref.lock().push(store_ref.get_order().unwrap());
        }));

        store.set_order(reversed()).unwrap();
        assert_eq!(*seen.lock(), vec![reversed()]);
    }

    #[test]
    fn failed_write_leaves_order_and_skips_notification() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let store = FileOrderStore::in_dir(&blocker, ChainKind::SourceOutputs);

        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        store.subscribe(Box::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }));

        let err = store.set_order(reversed()).unwrap_err();
        assert!(matches!(err, ChainError::PersistenceWriteFailure { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.get_order().unwrap(), OrderRecord::default());
    }

    #[test]
    fn unsubscribed_observer_not_called() {
        let dir = TempDir::new().unwrap();
        let store = FileOrderStore::in_dir(dir.path(), ChainKind::SourceOutputs);
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let id = store.subscribe(Box::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(store.subscriber_count(), 1);

        store.set_order(reversed()).unwrap();
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.set_order(OrderRecord::default()).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    fn counting(store: &FileOrderStore) -> Arc<AtomicUsize> {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        store.subscribe(Box::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }));
        calls
    }

    fn wait_for(calls: &AtomicUsize, expected: usize) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if calls.load(Ordering::SeqCst) >= expected {
                return true;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        false
    }

    #[test]
    fn write_by_another_store_is_reported() {
        let dir = TempDir::new().unwrap();
        let watched = FileOrderStore::in_dir(dir.path(), ChainKind::SourceOutputs);
        let other = FileOrderStore::in_dir(dir.path(), ChainKind::SourceOutputs);
        let calls = counting(&watched);
        assert!(watched.is_watching());

        let moved = OrderRecord::default().swapped(0, 1).unwrap();
        other.set_order(moved.clone()).unwrap();
        assert!(wait_for(&calls, 1), "observer never told about the new order");
        assert_eq!(watched.get_order().unwrap(), moved);

        // one write, one notification
        std::thread::sleep(Duration::from_millis(300));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // own writes are not reported a second time by the watcher
        watched.set_order(OrderRecord::default()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        std::thread::sleep(Duration::from_millis(300));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn external_corruption_is_reported() {
        let dir = TempDir::new().unwrap();
        let store = FileOrderStore::in_dir(dir.path(), ChainKind::SinkInputs);
        let calls = counting(&store);

        std::fs::write(store.path(), "plugins = 7").unwrap();
        assert!(wait_for(&calls, 1));
        assert!(store.get_order().is_err());
    }

    #[test]
    fn other_chain_writes_are_ignored() {
        let dir = TempDir::new().unwrap();
        let source = FileOrderStore::in_dir(dir.path(), ChainKind::SourceOutputs);
        let sink = FileOrderStore::in_dir(dir.path(), ChainKind::SinkInputs);
        let calls = counting(&source);

        sink.set_order(reversed()).unwrap();
        std::thread::sleep(Duration::from_millis(300));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn subscribing_creates_missing_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("not").join("yet");
        let store = FileOrderStore::in_dir(&nested, ChainKind::SourceOutputs);
        counting(&store);
        assert!(nested.is_dir());
        assert!(store.is_watching());
    }
}
