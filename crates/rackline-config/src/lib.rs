//! Persisted plugin order for rackline chains.
//!
//! This crate provides the [`OrderStore`] contract and its implementations:
//!
//! - **[`FileOrderStore`]**: one TOML file per chain in the user config
//!   directory, replaced atomically on every write
//! - **[`MemoryOrderStore`]**: in-process store for ephemeral chains and tests
//! - **Subscriptions**: observers registered with [`OrderStore::subscribe`] are
//!   called once per successful write, after persistence; file stores also
//!   report writes made by other processes
//! - **Paths**: platform-specific locations of order files
//!
//! # Example
//!
//! ```rust,no_run
//! use rackline_config::{FileOrderStore, OrderStore};
//! use rackline_core::{ChainKind, OrderRecord};
//!
//! let store = FileOrderStore::open(ChainKind::SourceOutputs);
//! let id = store.subscribe(Box::new(|| println!("order changed")));
//!
//! // Unreadable files fall back to the default order.
//! let order = store.order_or_default();
//! let moved = order.swapped(0, 1).unwrap();
//! store.set_order(moved).unwrap();
//!
//! store.unsubscribe(id);
//! ```

mod error;
mod file_store;
mod memory_store;
mod order_file;
mod store;

/// Platform-specific paths for order files.
pub mod paths;

pub use error::ConfigError;
pub use file_store::FileOrderStore;
pub use memory_store::MemoryOrderStore;
pub use order_file::OrderFile;
pub use paths::{
    chains_with_order_files, order_file_name, order_file_path, order_file_path_in,
    user_config_dir,
};
pub use store::{OrderObserver, OrderStore, SubscriptionId, Subscribers};
