//! Text presentation of a chain: one line per slot with its latest meter values.

use rackline_core::{SlotId, TelemetryChannel};
use rackline_panel::Presentation;
use std::fmt::Write as _;

struct MeterRow {
    slot: SlotId,
    values: Vec<(TelemetryChannel, f32)>,
}

impl MeterRow {
    fn new(slot: SlotId) -> Self {
        let values = slot
            .plugin()
            .map(|id| {
                id.telemetry_channels()
                    .iter()
                    .map(|&c| (c, c.resting_value()))
                    .collect()
            })
            .unwrap_or_default();
        Self { slot, values }
    }

    fn reset(&mut self) {
        for (channel, value) in &mut self.values {
            *value = channel.resting_value();
        }
    }
}

/// Meter board printed by `rackline monitor`.
#[derive(Default)]
pub struct MeterBoard {
    rows: Vec<MeterRow>,
    order: Vec<SlotId>,
}

impl MeterBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest value shown for `slot` on `channel`.
    pub fn value(&self, slot: SlotId, channel: TelemetryChannel) -> Option<f32> {
        self.row(slot)?
            .values
            .iter()
            .find(|(c, _)| *c == channel)
            .map(|&(_, v)| v)
    }

    /// Render the board in display order.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (i, &slot) in self.order.iter().enumerate() {
            let Some(row) = self.row(slot) else { continue };
            let _ = write!(out, "  {i:>2}. {:12}", slot.name());
            if slot.is_pinned() {
                out.push_str(" (pinned)");
            }
            for &(channel, value) in &row.values {
                let unit = if channel.is_level() { "dB" } else { "dB GR" };
                let _ = write!(out, "  {:>4} {value:>6.1} {unit}", channel.label());
            }
            out.push('\n');
        }
        out
    }

    fn row(&self, slot: SlotId) -> Option<&MeterRow> {
        self.rows.iter().find(|r| r.slot == slot)
    }

    fn row_mut(&mut self, slot: SlotId) -> Option<&mut MeterRow> {
        self.rows.iter_mut().find(|r| r.slot == slot)
    }
}

impl Presentation for MeterBoard {
    fn insert(&mut self, slot: SlotId) {
        if self.row(slot).is_none() {
            self.rows.push(MeterRow::new(slot));
            self.order.push(slot);
        }
    }

    fn resort(&mut self, order: &[SlotId]) {
        self.order = order.to_vec();
    }

    fn update(&mut self, slot: SlotId, channel: TelemetryChannel, value: f32) {
        let Some(row) = self.row_mut(slot) else {
            return;
        };
        if let Some(entry) = row.values.iter_mut().find(|(c, _)| *c == channel) {
            entry.1 = value;
        }
    }

    fn reset(&mut self, slot: SlotId) {
        if let Some(row) = self.row_mut(slot) {
            row.reset();
        }
    }
}
