//! Runtime → presentation telemetry routing.
//!
//! One unbounded crossbeam channel per (slot, channel) pair. Runtimes hold
//! the [`TelemetryTap`] senders; the router holds the receivers and drains
//! them into the [`Presentation`] on the control thread. Because each link
//! is a FIFO with a single producer, values from one channel arrive in
//! emission order and none are dropped while the link is up.

use crossbeam_channel::{Receiver, unbounded};
use rackline_core::{SlotId, TelemetryChannel, TelemetrySample};
use std::sync::{Arc, Weak};

use crate::presentation::Presentation;
use crate::runtime::{PluginRuntime, TelemetryTap};

struct Link {
    slot: SlotId,
    channel: TelemetryChannel,
    rx: Receiver<TelemetrySample>,
}

/// Consumer side of every telemetry link of a chain.
#[derive(Default)]
pub struct TelemetryRouter {
    links: Vec<Link>,
    runtimes: Vec<Weak<dyn PluginRuntime>>,
    torn_down: bool,
}

impl TelemetryRouter {
    /// Create a router with no links.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open one link per telemetry channel of `runtime` and hand the taps over.
    ///
    /// Returns the number of links opened. Does nothing after teardown.
    pub fn link(&mut self, slot: SlotId, runtime: &Arc<dyn PluginRuntime>) -> usize {
        if self.torn_down {
            tracing::warn!(slot = %slot, "telemetry link requested after teardown");
            return 0;
        }

        let channels = runtime.telemetry_channels();
        for &channel in channels {
            let (tx, rx) = unbounded();
            runtime.connect(TelemetryTap::new(slot, channel, tx));
            self.links.push(Link { slot, channel, rx });
        }
        self.runtimes.push(Arc::downgrade(runtime));
        tracing::debug!(slot = %slot, channels = channels.len(), "telemetry linked");
        channels.len()
    }

    /// Deliver every pending sample to `presentation`.
    ///
    /// Each link is drained up to the number of samples queued when its turn
    /// comes, so a producer emitting faster than the drain cannot starve the
    /// other links. Returns the number of samples delivered.
    pub fn drain(&self, presentation: &mut dyn Presentation) -> usize {
        let mut delivered = 0;
        for link in &self.links {
            for sample in link.rx.try_iter().take(link.rx.len()) {
                presentation.update(link.slot, link.channel, sample.value);
                delivered += 1;
            }
        }
        delivered
    }

    /// Disconnect every runtime and close all links.
    ///
    /// Samples still queued are discarded. Calling this again does nothing.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        for runtime in self.runtimes.drain(..).filter_map(|rt| rt.upgrade()) {
            runtime.disconnect();
        }
        let closed = self.links.len();
        self.links.clear();
        tracing::debug!(links = closed, "telemetry torn down");
    }

    /// Number of open links.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Whether [`teardown`](Self::teardown) has run.
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}

impl std::fmt::Debug for TelemetryRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryRouter")
            .field("links", &self.links.len())
            .field("torn_down", &self.torn_down)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::RecordingPresentation;
    use crate::runtime::TapSet;
    use rackline_core::PluginId;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Probe {
        taps: TapSet,
        disconnects: AtomicUsize,
    }

    struct ProbeRuntime(PluginId, Arc<Probe>);

    impl PluginRuntime for ProbeRuntime {
        fn plugin(&self) -> PluginId {
            self.0
        }
        fn connect(&self, tap: TelemetryTap) {
            self.1.taps.connect(tap);
        }
        fn disconnect(&self) {
            self.1.taps.disconnect();
            self.1.disconnects.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn probe(plugin: PluginId) -> (Arc<Probe>, Arc<dyn PluginRuntime>) {
        let probe = Arc::new(Probe::default());
        let rt: Arc<dyn PluginRuntime> = Arc::new(ProbeRuntime(plugin, Arc::clone(&probe)));
        (probe, rt)
    }

    #[test]
    fn links_one_channel_each() {
        let (probe, rt) = probe(PluginId::Limiter);
        let mut router = TelemetryRouter::new();
        assert_eq!(router.link(SlotId::Plugin(PluginId::Limiter), &rt), 3);
        assert_eq!(router.link_count(), 3);
        assert_eq!(probe.taps.len(), 3);
    }

    #[test]
    fn samples_arrive_in_emission_order() {
        let slot = SlotId::Plugin(PluginId::Compressor);
        let (probe, rt) = probe(PluginId::Compressor);
        let mut router = TelemetryRouter::new();
        router.link(slot, &rt);

        for v in [1.0, 2.0, 3.0] {
            assert!(probe.taps.emit(TelemetryChannel::Compression, v));
        }
        probe.taps.emit(TelemetryChannel::InputLevel, -18.0);

        let mut rec = RecordingPresentation::new();
        assert_eq!(router.drain(&mut rec), 4);
        assert_eq!(
            rec.updates(slot, TelemetryChannel::Compression),
            vec![1.0, 2.0, 3.0]
        );
        assert_eq!(rec.updates(slot, TelemetryChannel::InputLevel), vec![-18.0]);
        assert_eq!(router.drain(&mut rec), 0);
    }

    #[test]
    fn teardown_disconnects_once() {
        let (probe, rt) = probe(PluginId::Reverb);
        let mut router = TelemetryRouter::new();
        router.link(SlotId::Plugin(PluginId::Reverb), &rt);

        router.teardown();
        router.teardown();

        assert!(router.is_torn_down());
        assert_eq!(router.link_count(), 0);
        assert_eq!(probe.disconnects.load(Ordering::SeqCst), 1);
        assert!(!probe.taps.emit(TelemetryChannel::OutputLevel, -1.0));
        assert_eq!(router.link(SlotId::Plugin(PluginId::Reverb), &rt), 0);
    }

    #[test]
    fn dropped_runtime_skipped_at_teardown() {
        let (_probe, rt) = probe(PluginId::Filter);
        let mut router = TelemetryRouter::new();
        router.link(SlotId::Plugin(PluginId::Filter), &rt);
        drop(rt);
        router.teardown();
        assert!(router.is_torn_down());
    }
}
