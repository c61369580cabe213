//! Plugin runtime collaborator and the producer side of telemetry links.
//!
//! A runtime lives on the audio side. The panel never reaches into it beyond
//! handing over one [`TelemetryTap`] per channel at construction and taking
//! them back at teardown.

use arc_swap::ArcSwap;
use crossbeam_channel::Sender;
use rackline_core::{PluginId, SlotId, TelemetryChannel, TelemetrySample};
use std::sync::Arc;

/// A running plugin instance as seen by the panel.
pub trait PluginRuntime: Send + Sync {
    /// Which plugin this runtime implements.
    fn plugin(&self) -> PluginId;

    /// Channels the runtime emits on.
    ///
    /// Defaults to the plugin's standard channel set.
    fn telemetry_channels(&self) -> &[TelemetryChannel] {
        self.plugin().telemetry_channels()
    }

    /// Receive the producer end of one telemetry link.
    ///
    /// Called once per channel while the chain is built.
    fn connect(&self, tap: TelemetryTap);

    /// Drop every tap. Called once when the chain is torn down.
    fn disconnect(&self);
}

/// Producer end of a telemetry link.
///
/// Emitting never blocks and never allocates beyond the queue node. Once the
/// consumer side is torn down, emitted values are discarded.
#[derive(Clone)]
pub struct TelemetryTap {
    slot: SlotId,
    channel: TelemetryChannel,
    tx: Sender<TelemetrySample>,
}

impl TelemetryTap {
    pub(crate) fn new(slot: SlotId, channel: TelemetryChannel, tx: Sender<TelemetrySample>) -> Self {
        Self { slot, channel, tx }
    }

    /// Slot the link feeds.
    pub fn slot(&self) -> SlotId {
        self.slot
    }

    /// Channel the link carries.
    pub fn channel(&self) -> TelemetryChannel {
        self.channel
    }

    /// Send a value to the display (non-blocking).
    ///
    /// Returns `false` if the link has been torn down.
    #[inline]
    pub fn emit(&self, value: f32) -> bool {
        self.tx.send(TelemetrySample::now(self.channel, value)).is_ok()
    }
}

impl std::fmt::Debug for TelemetryTap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryTap")
            .field("slot", &self.slot)
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}

/// Tap storage for runtime implementations.
///
/// The audio side reads the current set wait-free via `ArcSwap`; connect and
/// disconnect (control side, rare) publish a new set.
#[derive(Default)]
pub struct TapSet {
    taps: ArcSwap<Vec<TelemetryTap>>,
}

impl TapSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tap.
    pub fn connect(&self, tap: TelemetryTap) {
        self.taps.rcu(|current| {
            let mut next = Vec::clone(current);
            next.push(tap.clone());
            next
        });
    }

    /// Remove every tap.
    pub fn disconnect(&self) {
        self.taps.store(Arc::new(Vec::new()));
    }

    /// Emit `value` on `channel`. Returns `false` if no live tap carries it.
    pub fn emit(&self, channel: TelemetryChannel, value: f32) -> bool {
        let taps = self.taps.load();
        taps.iter()
            .filter(|tap| tap.channel == channel)
            .fold(false, |sent, tap| tap.emit(value) || sent)
    }

    /// Number of connected taps.
    pub fn len(&self) -> usize {
        self.taps.load().len()
    }

    /// Whether no tap is connected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
