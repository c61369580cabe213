//! Fixed slot set of a chain.
//!
//! [`ChainState`] holds one [`ChainSlot`] for the pinned applications row and
//! one per plugin. Slots are created once and never reordered here: display
//! order lives in [`PresentationList`](crate::PresentationList), persisted
//! order in the [`OrderStore`](rackline_config::OrderStore).

use rackline_core::{ChainKind, PluginId, SlotId, TelemetryChannel};
use std::sync::{Arc, Weak};

use crate::runtime::PluginRuntime;

/// A single row of the chain.
///
/// Pairs the slot identity with a non-owning handle to the plugin runtime.
/// The slot's presentation handle is its [`SlotId`]: the
/// [`Presentation`](crate::Presentation) collaborator keys its elements by it.
pub struct ChainSlot {
    id: SlotId,
    runtime: Option<Weak<dyn PluginRuntime>>,
}

impl ChainSlot {
    /// Slot identity.
    pub fn id(&self) -> SlotId {
        self.id
    }

    /// The runtime, if one was attached and is still alive.
    pub fn runtime(&self) -> Option<Arc<dyn PluginRuntime>> {
        self.runtime.as_ref().and_then(Weak::upgrade)
    }

    /// Whether a runtime was attached at construction.
    pub fn has_runtime(&self) -> bool {
        self.runtime.is_some()
    }

    /// Telemetry channels of the attached runtime (empty without one).
    pub fn telemetry_channels(&self) -> Vec<TelemetryChannel> {
        self.runtime()
            .map(|rt| rt.telemetry_channels().to_vec())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for ChainSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainSlot")
            .field("id", &self.id)
            .field("has_runtime", &self.has_runtime())
            .finish()
    }
}

/// The fixed set of slots of one chain.
pub struct ChainState {
    slots: Vec<ChainSlot>,
}

impl ChainState {
    /// Build the slot set: the applications row, then one slot per plugin.
    ///
    /// Each plugin slot is paired with the first runtime reporting that
    /// plugin. Plugins without a runtime still get a slot (visible, no
    /// telemetry); extra runtimes for an already paired plugin are ignored.
    pub fn new(kind: ChainKind, runtimes: &[Arc<dyn PluginRuntime>]) -> Self {
        let mut slots = Vec::with_capacity(PluginId::all().len() + 1);
        slots.push(ChainSlot {
            id: SlotId::Applications,
            runtime: None,
        });

        for &plugin in PluginId::all() {
            let mut matching = runtimes.iter().filter(|rt| rt.plugin() == plugin);
            let runtime = matching.next().map(Arc::downgrade);
            if runtime.is_none() {
                tracing::warn!(chain = %kind, plugin = %plugin, "no runtime for plugin, telemetry disabled");
            }
            if matching.next().is_some() {
                tracing::warn!(chain = %kind, plugin = %plugin, "duplicate runtime ignored");
            }
            slots.push(ChainSlot {
                id: SlotId::Plugin(plugin),
                runtime,
            });
        }

        Self { slots }
    }

    /// Returns the number of slots in the chain.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Returns the slot at `index`, or `None` if out of range.
    pub fn slot(&self, index: usize) -> Option<&ChainSlot> {
        self.slots.get(index)
    }

    /// Returns the slot with identity `id`.
    pub fn find(&self, id: SlotId) -> Option<&ChainSlot> {
        self.slots.iter().find(|s| s.id == id)
    }

    /// Iterate over slots in storage order.
    pub fn iter(&self) -> impl Iterator<Item = &ChainSlot> {
        self.slots.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::TelemetryTap;

    struct Idle(PluginId);

    impl PluginRuntime for Idle {
        fn plugin(&self) -> PluginId {
            self.0
        }
        fn connect(&self, _tap: TelemetryTap) {}
        fn disconnect(&self) {}
    }

    fn runtimes(ids: &[PluginId]) -> Vec<Arc<dyn PluginRuntime>> {
        ids.iter()
            .map(|&id| Arc::new(Idle(id)) as Arc<dyn PluginRuntime>)
            .collect()
    }

    #[test]
    fn slots_cover_sentinel_and_all_plugins() {
        let rts = runtimes(PluginId::all());
        let state = ChainState::new(ChainKind::SourceOutputs, &rts);
        assert_eq!(state.slot_count(), 6);
        assert_eq!(state.slot(0).unwrap().id(), SlotId::Applications);
        assert!(!state.slot(0).unwrap().has_runtime());
        for &id in PluginId::all() {
            let slot = state.find(SlotId::Plugin(id)).unwrap();
            assert_eq!(slot.runtime().unwrap().plugin(), id);
        }
    }

    #[test]
    fn missing_runtime_keeps_slot() {
        let rts = runtimes(&[PluginId::Limiter]);
        let state = ChainState::new(ChainKind::SinkInputs, &rts);
        assert_eq!(state.slot_count(), 6);
        let reverb = state.find(SlotId::Plugin(PluginId::Reverb)).unwrap();
        assert!(!reverb.has_runtime());
        assert!(reverb.telemetry_channels().is_empty());
    }

    #[test]
    fn slot_does_not_own_runtime() {
        let rts = runtimes(&[PluginId::Filter]);
        let state = ChainState::new(ChainKind::SourceOutputs, &rts);
        let filter = state.find(SlotId::Plugin(PluginId::Filter)).unwrap();
        assert!(filter.runtime().is_some());

        drop(rts);
        assert!(filter.has_runtime());
        assert!(filter.runtime().is_none());
    }

    #[test]
    fn first_runtime_wins() {
        let rts = runtimes(&[PluginId::Compressor, PluginId::Compressor]);
        let state = ChainState::new(ChainKind::SourceOutputs, &rts);
        let comp = state.find(SlotId::Plugin(PluginId::Compressor)).unwrap();
        assert!(Arc::ptr_eq(&comp.runtime().unwrap(), &rts[0]));
    }

    #[test]
    fn out_of_range_access_safe() {
        let state = ChainState::new(ChainKind::SourceOutputs, &[]);
        assert!(state.slot(99).is_none());
    }
}
