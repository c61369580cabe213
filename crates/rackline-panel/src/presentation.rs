//! Display-ordered projection of the chain.
//!
//! [`PresentationList`] keeps rows in insertion order and a separate index
//! sequence for display order, so re-sorting permutes indices only. The
//! [`Presentation`] collaborator owns whatever per-row display state exists
//! (selection, scroll position, meter values); it is told about a new order
//! and never asked to rebuild its elements.

use rackline_core::{PluginId, SlotId, TelemetryChannel, presentation_cmp};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Display side of a chain.
///
/// Called on the control thread only.
pub trait Presentation {
    /// Add a display element for `slot`.
    fn insert(&mut self, slot: SlotId);

    /// Show the elements in `order` (a total order over inserted slots).
    fn resort(&mut self, order: &[SlotId]);

    /// Show a new telemetry value on `slot`'s element.
    fn update(&mut self, slot: SlotId, channel: TelemetryChannel, value: f32);

    /// Return `slot`'s element to its default display state.
    fn reset(&mut self, slot: SlotId);
}

/// Sorted view over the chain's slots.
#[derive(Debug)]
pub struct PresentationList {
    /// Rows in insertion order.
    rows: Vec<SlotId>,
    /// Indices into `rows`, in display order.
    view: Vec<usize>,
    dirty: Arc<AtomicBool>,
}

impl PresentationList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            view: Vec::new(),
            dirty: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Append a row. Duplicates are ignored and return `false`.
    ///
    /// New rows are shown last until the next resort.
    pub fn insert(&mut self, slot: SlotId) -> bool {
        if self.rows.contains(&slot) {
            return false;
        }
        self.view.push(self.rows.len());
        self.rows.push(slot);
        true
    }

    /// Shared flag set by [`invalidate`](Self::invalidate).
    ///
    /// Handed to order store observers, which may run on any thread.
    pub fn invalidation_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.dirty)
    }

    /// Mark the view stale; the next [`refresh`](Self::refresh) re-sorts.
    pub fn invalidate(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    /// Whether a resort is pending.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Re-sort against `order`, returning whether the display order changed.
    ///
    /// Always sorts from insertion order, so rows that compare equal (both
    /// missing from `order`) keep their insertion order and repeated calls
    /// with the same `order` give the same result.
    pub fn resort(&mut self, order: &[PluginId]) -> bool {
        self.dirty.store(false, Ordering::Release);
        let rows = &self.rows;
        let mut view: Vec<usize> = (0..rows.len()).collect();
        view.sort_by(|&a, &b| presentation_cmp(rows[a], rows[b], order));
        let changed = view != self.view;
        self.view = view;
        if changed {
            tracing::debug!(order = ?self.display_order(), "presentation resorted");
        }
        changed
    }

    /// Re-sort if invalidated. Returns `None` when nothing was pending.
    pub fn refresh(&mut self, order: &[PluginId]) -> Option<bool> {
        self.is_dirty().then(|| self.resort(order))
    }

    /// Slots in display order.
    pub fn display_order(&self) -> Vec<SlotId> {
        self.view.iter().map(|&i| self.rows[i]).collect()
    }

    /// Display position of `slot`.
    pub fn position(&self, slot: SlotId) -> Option<usize> {
        self.view.iter().position(|&i| self.rows[i] == slot)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the list has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Default for PresentationList {
    fn default() -> Self {
        Self::new()
    }
}

/// One call received by a [`RecordingPresentation`].
#[derive(Debug, Clone, PartialEq)]
pub enum PresentationEvent {
    /// [`Presentation::insert`].
    Insert(SlotId),
    /// [`Presentation::resort`].
    Resort(Vec<SlotId>),
    /// [`Presentation::update`].
    Update {
        /// Target slot.
        slot: SlotId,
        /// Channel of the value.
        channel: TelemetryChannel,
        /// Delivered value.
        value: f32,
    },
    /// [`Presentation::reset`].
    Reset(SlotId),
}

/// Presentation that records every call, for tests and diagnostics.
#[derive(Debug, Default)]
pub struct RecordingPresentation {
    events: Vec<PresentationEvent>,
}

impl RecordingPresentation {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call so far, oldest first.
    pub fn events(&self) -> &[PresentationEvent] {
        &self.events
    }

    /// Forget recorded calls.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Values delivered to `slot` on `channel`, in delivery order.
    pub fn updates(&self, slot: SlotId, channel: TelemetryChannel) -> Vec<f32> {
        self.events
            .iter()
            .filter_map(|e| match *e {
                PresentationEvent::Update {
                    slot: s,
                    channel: c,
                    value,
                } if s == slot && c == channel => Some(value),
                _ => None,
            })
            .collect()
    }

    /// The most recent order passed to `resort`.
    pub fn last_order(&self) -> Option<&[SlotId]> {
        self.events.iter().rev().find_map(|e| match e {
            PresentationEvent::Resort(order) => Some(order.as_slice()),
            _ => None,
        })
    }

    /// Number of `resort` calls.
    pub fn resort_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, PresentationEvent::Resort(_)))
            .count()
    }

    /// Slots passed to `reset`, in call order.
    pub fn resets(&self) -> Vec<SlotId> {
        self.events
            .iter()
            .filter_map(|e| match e {
                PresentationEvent::Reset(slot) => Some(*slot),
                _ => None,
            })
            .collect()
    }
}

impl Presentation for RecordingPresentation {
    fn insert(&mut self, slot: SlotId) {
        self.events.push(PresentationEvent::Insert(slot));
    }

    fn resort(&mut self, order: &[SlotId]) {
        self.events.push(PresentationEvent::Resort(order.to_vec()));
    }

    fn update(&mut self, slot: SlotId, channel: TelemetryChannel, value: f32) {
        self.events.push(PresentationEvent::Update {
            slot,
            channel,
            value,
        });
    }

    fn reset(&mut self, slot: SlotId) {
        self.events.push(PresentationEvent::Reset(slot));
    }
}
