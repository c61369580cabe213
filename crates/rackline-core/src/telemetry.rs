//! Telemetry channel and sample types.

use core::fmt;
use std::time::Instant;

/// A stream of meter values produced by a plugin runtime.
///
/// All values are in dB. Telemetry is display-only and never feeds back into
/// audio processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TelemetryChannel {
    /// Level entering the plugin.
    InputLevel,
    /// Level leaving the plugin.
    OutputLevel,
    /// Limiter gain reduction.
    Attenuation,
    /// Compressor gain reduction.
    Compression,
}

impl TelemetryChannel {
    /// Short token (e.g. `"input_level"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InputLevel => "input_level",
            Self::OutputLevel => "output_level",
            Self::Attenuation => "attenuation",
            Self::Compression => "compression",
        }
    }

    /// Column label for meter displays.
    pub fn label(&self) -> &'static str {
        match self {
            Self::InputLevel => "In",
            Self::OutputLevel => "Out",
            Self::Attenuation => "Att",
            Self::Compression => "Comp",
        }
    }

    /// Whether the channel carries a signal level (as opposed to gain reduction).
    pub fn is_level(&self) -> bool {
        matches!(self, Self::InputLevel | Self::OutputLevel)
    }

    /// Value a display shows before any sample arrives or after a reset.
    ///
    /// Levels rest at the meter floor, gain reduction at zero.
    pub fn resting_value(&self) -> f32 {
        if self.is_level() { -100.0 } else { 0.0 }
    }
}

impl fmt::Display for TelemetryChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value emitted on a telemetry channel.
///
/// Samples are transient: never persisted, delivered once, and ordered only
/// within their own channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySample {
    /// Channel the value belongs to.
    pub channel: TelemetryChannel,
    /// Value in dB.
    pub value: f32,
    /// When the runtime emitted the value.
    pub emitted_at: Instant,
}

impl TelemetrySample {
    /// Create a sample stamped with the current instant.
    pub fn now(channel: TelemetryChannel, value: f32) -> Self {
        Self {
            channel,
            value,
            emitted_at: Instant::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resting_values() {
        assert_eq!(TelemetryChannel::InputLevel.resting_value(), -100.0);
        assert_eq!(TelemetryChannel::OutputLevel.resting_value(), -100.0);
        assert_eq!(TelemetryChannel::Attenuation.resting_value(), 0.0);
        assert_eq!(TelemetryChannel::Compression.resting_value(), 0.0);
    }

    #[test]
    fn sample_timestamps_are_monotonic() {
        let a = TelemetrySample::now(TelemetryChannel::InputLevel, -12.0);
        let b = TelemetrySample::now(TelemetryChannel::InputLevel, -11.0);
        assert!(b.emitted_at >= a.emitted_at);
    }
}
