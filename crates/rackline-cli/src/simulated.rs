//! Stand-in plugin runtimes for `monitor`.
//!
//! Each runtime runs on its own thread and emits slowly swinging levels, so
//! the panel can be exercised without an audio server.

use rackline_core::{PluginId, TelemetryChannel};
use rackline_panel::{PluginRuntime, TapSet, TelemetryTap};
use std::f32::consts::TAU;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

/// Limiter threshold in dB.
const LIMIT_DB: f32 = -12.0;
/// Compressor threshold in dB.
const COMP_THRESHOLD_DB: f32 = -20.0;
const COMP_RATIO: f32 = 4.0;

/// Runtime producing synthetic meter values for one plugin.
pub struct SimulatedRuntime {
    plugin: PluginId,
    phase: f32,
    taps: TapSet,
}

impl SimulatedRuntime {
    fn new(plugin: PluginId, phase: f32) -> Self {
        Self {
            plugin,
            phase,
            taps: TapSet::new(),
        }
    }

    /// Emit one value per channel for time `t` (seconds).
    fn tick(&self, t: f32) {
        let input = -18.0 + 9.0 * (TAU * 0.25 * t + self.phase).sin();
        let output = match self.plugin {
            PluginId::Limiter => {
                let attenuation = (LIMIT_DB - input).min(0.0);
                self.taps.emit(TelemetryChannel::Attenuation, attenuation);
                input + attenuation
            }
            PluginId::Compressor => {
                let over = (input - COMP_THRESHOLD_DB).max(0.0);
                let reduction = over - over / COMP_RATIO;
                self.taps.emit(TelemetryChannel::Compression, reduction);
                input - reduction
            }
            PluginId::Filter | PluginId::Equalizer => input - 1.5,
            PluginId::Reverb => input - 3.0,
        };
        self.taps.emit(TelemetryChannel::InputLevel, input);
        self.taps.emit(TelemetryChannel::OutputLevel, output);
    }
}

impl PluginRuntime for SimulatedRuntime {
    fn plugin(&self) -> PluginId {
        self.plugin
    }

    fn connect(&self, tap: TelemetryTap) {
        self.taps.connect(tap);
    }

    fn disconnect(&self) {
        self.taps.disconnect();
    }
}

/// One simulated runtime per plugin, each ticking on its own thread.
pub struct Simulator {
    runtimes: Vec<Arc<SimulatedRuntime>>,
    running: Arc<AtomicBool>,
    threads: Vec<JoinHandle<()>>,
}

impl Simulator {
    /// Create runtimes for every plugin. Nothing runs until [`start`](Self::start).
    pub fn new() -> Self {
        #[allow(clippy::cast_precision_loss)]
        let runtimes = PluginId::all()
            .iter()
            .enumerate()
            .map(|(i, &id)| Arc::new(SimulatedRuntime::new(id, i as f32 * 1.3)))
            .collect();
        Self {
            runtimes,
            running: Arc::new(AtomicBool::new(false)),
            threads: Vec::new(),
        }
    }

    /// Runtimes as the panel sees them.
    pub fn runtimes(&self) -> Vec<Arc<dyn PluginRuntime>> {
        self.runtimes
            .iter()
            .map(|rt| Arc::clone(rt) as Arc<dyn PluginRuntime>)
            .collect()
    }

    /// Spawn the emitter threads, each ticking `rate_hz` times per second.
    pub fn start(&mut self, rate_hz: f32) -> std::io::Result<()> {
        self.running.store(true, Ordering::SeqCst);
        let period = Duration::from_secs_f32(1.0 / rate_hz);

        for rt in &self.runtimes {
            let rt = Arc::clone(rt);
            let running = Arc::clone(&self.running);
            let handle = std::thread::Builder::new()
                .name(format!("sim-{}", rt.plugin))
                .spawn(move || {
                    let mut t = 0.0_f32;
                    while running.load(Ordering::SeqCst) {
                        rt.tick(t);
                        std::thread::sleep(period);
                        t += period.as_secs_f32();
                    }
                })?;
            self.threads.push(handle);
        }
        tracing::debug!(threads = self.threads.len(), rate_hz, "simulated runtimes started");
        Ok(())
    }

    /// Stop and join every emitter thread.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        for handle in self.threads.drain(..) {
            if handle.join().is_err() {
                tracing::warn!("simulated runtime thread panicked");
            }
        }
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Simulator {
    fn drop(&mut self) {
        self.stop();
    }
}
