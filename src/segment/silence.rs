//! Silence boundary detection.
//!
//! Accumulates consecutive silent time from smoothed energy observations and
//! signals a boundary once the configured gap elapses. The detector resets
//! its own counter when it signals (consume-and-reset), so one silence
//! episode yields one signal; acting on it only while an utterance is open
//! is the caller's job.

use crate::defaults;

/// Result of observing one frame's smoothed energy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SilenceObservation {
    /// Whether the frame was at or above the silence threshold.
    pub voiced: bool,
    /// Whether accumulated silence just reached the configured gap.
    pub boundary: bool,
}

/// Hysteresis counter over consecutive silent frame time.
#[derive(Debug, Clone)]
pub struct SilenceDetector {
    threshold: f32,
    silence_gap_secs: f32,
    consecutive_silent_secs: f32,
}

impl SilenceDetector {
    /// Creates a detector with the given (already clamped) silence gap.
    pub fn new(silence_gap_secs: f32) -> Self {
        Self {
            threshold: defaults::SILENCE_THRESHOLD,
            silence_gap_secs,
            consecutive_silent_secs: 0.0,
        }
    }

    /// Observes one frame's smoothed energy and duration.
    pub fn observe(&mut self, energy: f32, frame_secs: f32) -> SilenceObservation {
        if energy >= self.threshold {
            self.consecutive_silent_secs = 0.0;
            return SilenceObservation {
                voiced: true,
                boundary: false,
            };
        }

        self.consecutive_silent_secs += frame_secs.max(0.0);
        let boundary = self.consecutive_silent_secs >= self.silence_gap_secs;
        if boundary {
            self.consecutive_silent_secs = 0.0;
        }
        SilenceObservation {
            voiced: false,
            boundary,
        }
    }

    /// Updates the silence gap; applies on the next observation.
    pub fn set_silence_gap(&mut self, secs: f32) {
        self.silence_gap_secs = secs;
    }

    /// Accumulated consecutive silence in seconds.
    pub fn consecutive_silent_secs(&self) -> f32 {
        self.consecutive_silent_secs
    }

    /// Zeroes the counter (stop/start and post-finalize).
    pub fn reset(&mut self) {
        self.consecutive_silent_secs = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOUD: f32 = 0.1;
    const QUIET: f32 = 0.001;

    #[test]
    fn test_voiced_frame_resets_counter() {
        let mut detector = SilenceDetector::new(1.0);
        detector.observe(QUIET, 0.5);
        assert!(detector.consecutive_silent_secs() > 0.0);

        let obs = detector.observe(LOUD, 0.1);
        assert!(obs.voiced);
        assert!(!obs.boundary);
        assert_eq!(detector.consecutive_silent_secs(), 0.0);
    }

    #[test]
    fn test_boundary_fires_at_gap() {
        let mut detector = SilenceDetector::new(1.0);
        // 0.9s of silence: no boundary yet
        for _ in 0..9 {
            let obs = detector.observe(QUIET, 0.1);
            assert!(!obs.boundary);
        }
        // Crossing 1.0s fires
        let obs = detector.observe(QUIET, 0.1);
        assert!(obs.boundary);
        assert!(!obs.voiced);
    }

    #[test]
    fn test_boundary_fires_once_per_episode() {
        let mut detector = SilenceDetector::new(1.0);
        for _ in 0..10 {
            detector.observe(QUIET, 0.1);
        }
        // Counter was consumed by the signal; the immediately following
        // silent frame must not fire again.
        let obs = detector.observe(QUIET, 0.1);
        assert!(!obs.boundary);
        assert!((detector.consecutive_silent_secs() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_gap_change_applies_next_observation() {
        let mut detector = SilenceDetector::new(2.0);
        let obs = detector.observe(QUIET, 1.0);
        assert!(!obs.boundary);

        detector.set_silence_gap(1.0);
        let obs = detector.observe(QUIET, 0.1);
        assert!(obs.boundary, "1.1s accumulated against the new 1.0s gap");
    }

    #[test]
    fn test_negative_frame_duration_ignored() {
        let mut detector = SilenceDetector::new(1.0);
        detector.observe(QUIET, -5.0);
        assert_eq!(detector.consecutive_silent_secs(), 0.0);
    }

    #[test]
    fn test_reset_zeroes_counter() {
        let mut detector = SilenceDetector::new(1.0);
        detector.observe(QUIET, 0.7);
        detector.reset();
        assert_eq!(detector.consecutive_silent_secs(), 0.0);
    }
}
