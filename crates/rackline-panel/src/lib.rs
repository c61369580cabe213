//! Reorderable plugin chain panel.
//!
//! Ties a chain's fixed slot set to its persisted order and to the telemetry
//! coming out of the running plugins:
//!
//! - [`ChainState`]: the applications row plus one slot per plugin, each with
//!   a non-owning handle to its [`PluginRuntime`]
//! - [`PresentationList`]: display order derived from the stored order, with
//!   the applications row always on top
//! - [`ReorderController`]: adjacent swaps written through an
//!   [`OrderStore`](rackline_config::OrderStore)
//! - [`TelemetryRouter`]: one non-blocking link per (slot, channel), drained
//!   into the [`Presentation`] on the control thread
//! - [`ChainPanel`]: everything above, driven by `poll`
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use rackline_config::{MemoryOrderStore, OrderStore};
//! use rackline_core::{ChainKind, PluginId, SlotId};
//! use rackline_panel::{ChainPanel, RecordingPresentation};
//!
//! let store: Arc<dyn OrderStore> = Arc::new(MemoryOrderStore::new());
//! let mut panel = ChainPanel::new(
//!     ChainKind::SourceOutputs,
//!     Arc::clone(&store),
//!     &[],
//!     RecordingPresentation::new(),
//! );
//!
//! panel.move_up(PluginId::Filter);
//! let shown = panel.display_order();
//! assert_eq!(shown[0], SlotId::Applications);
//! assert_eq!(shown[2], SlotId::Plugin(PluginId::Filter));
//! ```

mod chain_state;
mod panel;
mod presentation;
mod reorder;
mod runtime;
mod telemetry;

pub use chain_state::{ChainSlot, ChainState};
pub use panel::{ChainPanel, PollReport};
pub use presentation::{Presentation, PresentationEvent, PresentationList, RecordingPresentation};
pub use reorder::{MoveOutcome, ReorderController};
pub use runtime::{PluginRuntime, TapSet, TelemetryTap};
pub use telemetry::TelemetryRouter;
