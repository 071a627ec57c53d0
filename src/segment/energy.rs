//! Per-frame loudness estimation.
//!
//! Root-mean-square amplitude per buffer, smoothed with an exponential
//! moving average so single noisy frames don't flip the silence decision.

/// Smoothed loudness estimator.
#[derive(Debug, Clone)]
pub struct EnergyMonitor {
    alpha: f32,
    average: f32,
}

impl EnergyMonitor {
    /// Creates a monitor with the given smoothing factor (0.0 to 1.0).
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            average: 0.0,
        }
    }

    /// Folds one frame into the moving average and returns the new value.
    pub fn update(&mut self, samples: &[f32]) -> f32 {
        let rms = calculate_rms(samples);
        self.average = self.average * (1.0 - self.alpha) + rms * self.alpha;
        // Degenerate alpha or sample values must not poison later frames.
        if !self.average.is_finite() {
            self.average = 0.0;
        }
        self.average
    }

    /// Current smoothed energy.
    pub fn average(&self) -> f32 {
        self.average
    }

    /// Resets the average to zero (stop/start and post-finalize).
    pub fn reset(&mut self) {
        self.average = 0.0;
    }
}

/// Calculates the Root Mean Square (RMS) of float audio samples.
///
/// Returns 0.0 for an empty buffer and collapses non-finite results
/// (NaN/Inf from corrupt capture data) to 0.0 — silence is always the
/// safe interpretation.
pub fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    let rms = (sum_squares / samples.len() as f64).sqrt() as f32;
    if rms.is_finite() { rms } else { 0.0 }
}
