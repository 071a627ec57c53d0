//! Engine configuration.
//!
//! An explicit struct passed into [`SegmentationEngine`] at construction —
//! no global preference store. The only user-facing knob is the silence gap;
//! the remaining fields are tuning parameters with calibrated defaults,
//! overridable from a TOML file or directly in tests.
//!
//! [`SegmentationEngine`]: crate::SegmentationEngine

use crate::defaults;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Segmentation engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Continuous silence (seconds) that forces an utterance boundary.
    /// Clamped to 0.5–5.0 at evaluation time, so a mid-session change
    /// applies on the next evaluation and never retroactively.
    pub silence_gap_secs: f32,
    /// Smoothing factor for the energy moving average (0.0 to 1.0).
    pub energy_alpha: f32,
    /// Minimum interval between emitted partial updates (milliseconds).
    pub partial_min_interval_ms: u64,
    /// Minimum new-suffix length (characters) for a partial to be emitted.
    pub partial_min_chars: usize,
    /// Onset suppression window after each finalize (milliseconds).
    pub refractory_ms: u64,
    /// Cadence of the defensive fallback tick (milliseconds).
    pub tick_interval_ms: u64,
    /// Bound on the serialized event channel.
    pub event_buffer_size: usize,
    /// Bound on the partial/final broadcast channels.
    pub output_buffer_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            silence_gap_secs: defaults::SILENCE_GAP_SECS,
            energy_alpha: defaults::ENERGY_ALPHA,
            partial_min_interval_ms: defaults::PARTIAL_MIN_INTERVAL_MS,
            partial_min_chars: defaults::PARTIAL_MIN_CHARS,
            refractory_ms: defaults::REFRACTORY_MS,
            tick_interval_ms: defaults::TICK_INTERVAL_MS,
            event_buffer_size: defaults::EVENT_BUFFER_SIZE,
            output_buffer_size: defaults::OUTPUT_BUFFER_SIZE,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file is missing or contains invalid TOML.
    /// Missing fields use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: EngineConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file, or return defaults if it doesn't exist.
    ///
    /// Invalid TOML is still an error; only a missing file falls back.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// The silence gap clamped to its valid range.
    ///
    /// Out-of-range values are clamped at the boundary rather than rejected.
    pub fn silence_gap(&self) -> f32 {
        self.silence_gap_secs.clamp(
            defaults::SILENCE_GAP_MIN_SECS,
            defaults::SILENCE_GAP_MAX_SECS,
        )
    }

    /// Partial emission throttle interval as a `Duration`.
    pub fn partial_min_interval(&self) -> Duration {
        Duration::from_millis(self.partial_min_interval_ms)
    }

    /// Refractory window as a `Duration`.
    pub fn refractory(&self) -> Duration {
        Duration::from_millis(self.refractory_ms)
    }

    /// Tick cadence as a `Duration`.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Sets the silence gap, builder-style.
    pub fn with_silence_gap_secs(mut self, secs: f32) -> Self {
        self.silence_gap_secs = secs;
        self
    }
}
