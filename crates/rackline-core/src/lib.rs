//! Core types for rackline effect chains.
//!
//! A chain is a fixed set of audio plugins (limiter, compressor, filter,
//! equalizer, reverb) shown as a reorderable list underneath a pinned
//! "applications" row. This crate holds the pieces every other rackline crate
//! agrees on:
//!
//! - [`PluginId`] / [`SlotId`] — the closed set of plugin identities plus the
//!   pinned sentinel slot
//! - [`OrderRecord`] — a validated permutation of the plugin set, the unit of
//!   persistence
//! - [`presentation_cmp`] — the display comparator (sentinel first, then
//!   persisted order, unknown entries last)
//! - [`TelemetryChannel`] / [`TelemetrySample`] — meter values flowing from
//!   plugin runtimes to the display
//! - [`ChainError`] — the failure taxonomy shared by stores and controllers
//!
//! # Example
//!
//! ```rust
//! use rackline_core::{OrderRecord, PluginId, SlotId, sort_slots};
//!
//! let order = OrderRecord::new(vec![
//!     PluginId::Reverb,
//!     PluginId::Limiter,
//!     PluginId::Compressor,
//!     PluginId::Filter,
//!     PluginId::Equalizer,
//! ])
//! .unwrap();
//!
//! let mut rows = vec![
//!     SlotId::from(PluginId::Limiter),
//!     SlotId::Applications,
//!     SlotId::from(PluginId::Reverb),
//! ];
//! sort_slots(&mut rows, order.as_slice());
//! assert_eq!(rows[0], SlotId::Applications);
//! assert_eq!(rows[1], SlotId::Plugin(PluginId::Reverb));
//! ```

mod error;
mod order;
mod plugin;
mod telemetry;

pub use error::ChainError;
pub use order::{OrderRecord, Rank, display_rank, presentation_cmp, sort_slots};
pub use plugin::{ChainKind, PluginId, SlotId};
pub use telemetry::{TelemetryChannel, TelemetrySample};
