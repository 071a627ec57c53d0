//! Partial hypothesis coalescing.
//!
//! The recognizer re-sends the full hypothesis on every update; snapshots
//! grow, occasionally shrink, and can arrive far faster than a rendering
//! consumer wants them. The coalescer throttles emission and always caches
//! the latest snapshot as the finalize fallback.

use std::time::{Duration, Instant};

/// Throttled merger of cumulative transcription snapshots.
#[derive(Debug, Clone)]
pub struct PartialCoalescer {
    min_interval: Duration,
    min_chars: usize,
    last_text: String,
    last_emit_at: Option<Instant>,
}

impl PartialCoalescer {
    /// Creates a coalescer with the given throttle parameters.
    pub fn new(min_interval: Duration, min_chars: usize) -> Self {
        Self {
            min_interval,
            min_chars,
            last_text: String::new(),
            last_emit_at: None,
        }
    }

    /// Absorbs one cumulative snapshot.
    ///
    /// Returns the full cumulative text to emit when the update passes the
    /// throttle (new suffix non-empty, at least `min_chars` characters, and
    /// `min_interval` elapsed since the last emission), `None` otherwise.
    /// The snapshot is cached either way.
    pub fn absorb(&mut self, text: &str, at: Instant) -> Option<String> {
        let suffix_chars = new_suffix_chars(&self.last_text, text);
        self.last_text.clear();
        self.last_text.push_str(text);

        if suffix_chars < self.min_chars.max(1) {
            return None;
        }
        if let Some(last) = self.last_emit_at
            && at.duration_since(last) < self.min_interval
        {
            return None;
        }

        self.last_emit_at = Some(at);
        Some(self.last_text.clone())
    }

    /// Latest cached snapshot, trimmed; `None` when empty.
    ///
    /// Reflects every absorbed snapshot, including throttled ones.
    pub fn cached(&self) -> Option<&str> {
        let trimmed = self.last_text.trim();
        if trimmed.is_empty() { None } else { Some(trimmed) }
    }

    /// Clears the cache and throttle state (post-finalize and stop/start).
    pub fn clear(&mut self) {
        self.last_text.clear();
        self.last_emit_at = None;
    }
}

/// Characters in `next` past its common prefix with `prev`.
///
/// Used only to decide whether a snapshot carries anything new; emitted
/// updates always carry the full cumulative text.
fn new_suffix_chars(prev: &str, next: &str) -> usize {
    let mut prev_chars = prev.chars();
    let mut common = 0usize;
    for c in next.chars() {
        match prev_chars.next() {
            Some(p) if p == c => common += 1,
            _ => break,
        }
    }
    next.chars().count() - common
}
