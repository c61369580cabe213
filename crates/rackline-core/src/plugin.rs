//! Plugin identities, the pinned sentinel slot, and chain categories.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ChainError;
use crate::telemetry::TelemetryChannel;

/// One of the fixed, reorderable plugins of a chain.
///
/// The set is closed: every chain holds exactly these five plugins, and a
/// persisted order is always a permutation of [`PluginId::all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginId {
    /// Brick-wall limiter.
    Limiter,
    /// Dynamic range compressor.
    Compressor,
    /// Low/high/band-pass filter.
    Filter,
    /// Multi-band equalizer.
    Equalizer,
    /// Reverb.
    Reverb,
}

impl PluginId {
    /// All plugins in default chain order.
    pub fn all() -> &'static [PluginId] {
        &[
            Self::Limiter,
            Self::Compressor,
            Self::Filter,
            Self::Equalizer,
            Self::Reverb,
        ]
    }

    /// Stable lowercase token used in persisted orders (e.g. `"limiter"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Limiter => "limiter",
            Self::Compressor => "compressor",
            Self::Filter => "filter",
            Self::Equalizer => "equalizer",
            Self::Reverb => "reverb",
        }
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Limiter => "Limiter",
            Self::Compressor => "Compressor",
            Self::Filter => "Filter",
            Self::Equalizer => "Equalizer",
            Self::Reverb => "Reverb",
        }
    }

    /// Telemetry channels the plugin's runtime exposes.
    ///
    /// Every plugin reports input and output level. The limiter adds its
    /// attenuation and the compressor its compression amount.
    pub fn telemetry_channels(&self) -> &'static [TelemetryChannel] {
        use TelemetryChannel::{Attenuation, Compression, InputLevel, OutputLevel};
        match self {
            Self::Limiter => &[InputLevel, OutputLevel, Attenuation],
            Self::Compressor => &[InputLevel, OutputLevel, Compression],
            Self::Filter | Self::Equalizer | Self::Reverb => &[InputLevel, OutputLevel],
        }
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PluginId {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        Self::all()
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(token))
            .ok_or_else(|| ChainError::UnknownPlugin(token.to_string()))
    }
}

/// A row of the chain display: either the pinned sentinel or a plugin.
///
/// The sentinel stands for the per-application controls. It always occupies
/// the first display position, cannot be moved, and is never part of a
/// persisted [`OrderRecord`](crate::OrderRecord).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotId {
    /// The pinned "applications" row.
    Applications,
    /// A reorderable plugin row.
    Plugin(PluginId),
}

impl SlotId {
    /// Token of the sentinel slot.
    pub const PINNED_TOKEN: &'static str = "applications";

    /// Whether this is the pinned, non-reorderable slot.
    ///
    /// This is the only place that decides pinning; comparators, controllers
    /// and order validation all go through it.
    #[inline]
    pub fn is_pinned(&self) -> bool {
        matches!(self, SlotId::Applications)
    }

    /// The plugin behind this slot, or `None` for the sentinel.
    pub fn plugin(&self) -> Option<PluginId> {
        match self {
            SlotId::Applications => None,
            SlotId::Plugin(id) => Some(*id),
        }
    }

    /// Token of this slot (`"applications"` or the plugin token).
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotId::Applications => Self::PINNED_TOKEN,
            SlotId::Plugin(id) => id.as_str(),
        }
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            SlotId::Applications => "Applications",
            SlotId::Plugin(id) => id.name(),
        }
    }
}

impl From<PluginId> for SlotId {
    fn from(id: PluginId) -> Self {
        SlotId::Plugin(id)
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlotId {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case(Self::PINNED_TOKEN) {
            Ok(SlotId::Applications)
        } else {
            s.parse().map(SlotId::Plugin)
        }
    }
}

/// Audio stream category a chain is attached to.
///
/// Each chain keeps its own independently persisted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChainKind {
    /// Recording streams (microphone input going to applications).
    #[default]
    SourceOutputs,
    /// Playback streams (applications going to the speakers).
    SinkInputs,
}

impl ChainKind {
    /// All chain kinds.
    pub fn all() -> &'static [ChainKind] {
        &[Self::SourceOutputs, Self::SinkInputs]
    }

    /// Storage key, also used as the persisted file stem.
    pub fn key(&self) -> &'static str {
        match self {
            Self::SourceOutputs => "source_outputs",
            Self::SinkInputs => "sink_inputs",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::SourceOutputs => "Input (source outputs)",
            Self::SinkInputs => "Output (sink inputs)",
        }
    }
}

impl fmt::Display for ChainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ChainKind {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::all()
            .iter()
            .copied()
            .find(|k| k.key() == normalized)
            .ok_or_else(|| ChainError::UnknownChain(s.to_string()))
    }
}
