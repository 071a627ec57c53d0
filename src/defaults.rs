//! Default segmentation constants.
//!
//! Shared by `EngineConfig` defaults and by tests so the two never drift.

/// Silence threshold as linear RMS amplitude.
///
/// Equivalent to roughly -45 dBFS (10^(-45/20)). Calibrated once for typical
/// microphone input; deliberately not exposed in `EngineConfig` — the
/// user-facing knob is the silence gap, not the noise floor.
pub const SILENCE_THRESHOLD: f32 = 0.005_623;

/// Smoothing factor for the exponential moving average over per-frame RMS.
///
/// `avg' = avg * (1 - alpha) + rms * alpha`. Higher values react faster to
/// level changes but flutter more around the threshold.
pub const ENERGY_ALPHA: f32 = 0.2;

/// Default continuous-silence duration (seconds) that forces an utterance
/// boundary when the recognizer never reports a final result.
pub const SILENCE_GAP_SECS: f32 = 1.0;

/// Hard bounds for the silence gap. Values outside are clamped, not rejected.
pub const SILENCE_GAP_MIN_SECS: f32 = 0.5;
pub const SILENCE_GAP_MAX_SECS: f32 = 5.0;

/// Minimum interval between emitted partial updates in milliseconds.
///
/// Bounds the update rate seen by a slow rendering consumer; snapshots that
/// arrive faster are still cached for finalization.
pub const PARTIAL_MIN_INTERVAL_MS: u64 = 150;

/// Minimum new-suffix length (characters) for a partial update to be emitted.
pub const PARTIAL_MIN_CHARS: usize = 1;

/// Suppression window after each finalize, in milliseconds.
///
/// Utterance onsets inside this window are dropped so stale trailing
/// recognizer output cannot reopen a closed utterance.
pub const REFRACTORY_MS: u64 = 300;

/// Cadence of the defensive fallback tick in milliseconds.
pub const TICK_INTERVAL_MS: u64 = 500;

/// Bound on the serialized event channel between producers and the
/// single consumer task.
pub const EVENT_BUFFER_SIZE: usize = 100;

/// Bound on the partial/final broadcast channels.
pub const OUTPUT_BUFFER_SIZE: usize = 64;
