//! Utterance identity and lifecycle.
//!
//! One utterance spans continuous speech from onset to finalize, tracked by
//! a monotonically increasing id. The id counter is shared across sessions
//! so ids are never reused within a process lifetime. A refractory window
//! after each close suppresses onsets triggered by stale trailing
//! recognizer output.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Lifecycle state of the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtteranceState {
    /// No speech in progress.
    Idle,
    /// An utterance is open and accumulating text.
    Active,
    /// Transient: resolving a chunk or a drop within the current event step.
    Finalizing,
}

/// Record for one open utterance.
#[derive(Debug, Clone, Copy)]
pub struct Utterance {
    /// Monotonic id, never reused.
    pub id: u64,
    /// Timestamp of the event that opened the utterance.
    pub started_at: Instant,
    /// Timestamp of the most recent text update.
    pub last_text_at: Instant,
}

/// Owns utterance state transitions and id allocation.
#[derive(Debug)]
pub struct UtteranceTracker {
    state: UtteranceState,
    current: Option<Utterance>,
    next_id: Arc<AtomicU64>,
    refractory: Duration,
    refractory_until: Option<Instant>,
}

impl UtteranceTracker {
    /// Creates a tracker drawing ids from the shared counter.
    pub fn new(next_id: Arc<AtomicU64>, refractory: Duration) -> Self {
        Self {
            state: UtteranceState::Idle,
            current: None,
            next_id,
            refractory,
            refractory_until: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> UtteranceState {
        self.state
    }

    /// True while an utterance is Active or Finalizing.
    pub fn is_open(&self) -> bool {
        matches!(
            self.state,
            UtteranceState::Active | UtteranceState::Finalizing
        )
    }

    /// The open utterance record, if any.
    pub fn current(&self) -> Option<&Utterance> {
        self.current.as_ref()
    }

    /// Attempts to open a new utterance at the triggering event's time.
    ///
    /// Returns `None` without side effects when one is already open or when
    /// `at` falls inside the refractory window — the caller must drop the
    /// triggering event entirely in that case.
    pub fn try_open(&mut self, at: Instant) -> Option<Utterance> {
        if self.state != UtteranceState::Idle {
            return None;
        }
        if let Some(until) = self.refractory_until
            && at < until
        {
            return None;
        }

        let utterance = Utterance {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            started_at: at,
            last_text_at: at,
        };
        self.state = UtteranceState::Active;
        self.current = Some(utterance);
        Some(utterance)
    }

    /// Records a text update time on the open utterance.
    pub fn touch_text(&mut self, at: Instant) {
        if let Some(ref mut utterance) = self.current {
            utterance.last_text_at = at;
        }
    }

    /// Moves Active → Finalizing and hands out the utterance record.
    ///
    /// Returns `None` unless an utterance is Active, which is what makes a
    /// late second finalize trigger for the same id a no-op.
    pub fn begin_finalize(&mut self) -> Option<Utterance> {
        if self.state != UtteranceState::Active {
            return None;
        }
        self.state = UtteranceState::Finalizing;
        self.current
    }

    /// Moves Finalizing → Idle and starts the refractory window.
    pub fn close(&mut self, at: Instant) {
        self.state = UtteranceState::Idle;
        self.current = None;
        self.refractory_until = Some(at + self.refractory);
    }

    /// Returns to Idle and clears the refractory window (stop/start).
    pub fn reset(&mut self) {
        self.state = UtteranceState::Idle;
        self.current = None;
        self.refractory_until = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> UtteranceTracker {
        UtteranceTracker::new(Arc::new(AtomicU64::new(1)), Duration::from_millis(300))
    }

    #[test]
    fn test_open_allocates_monotonic_ids() {
        let mut t = tracker();
        let now = Instant::now();

        let first = t.try_open(now).unwrap();
        t.begin_finalize().unwrap();
        t.close(now);

        let later = now + Duration::from_secs(1);
        let second = t.try_open(later).unwrap();
        assert!(second.id > first.id);
        assert_eq!(second.id, first.id + 1);
    }

    #[test]
    fn test_ids_survive_tracker_replacement() {
        let counter = Arc::new(AtomicU64::new(1));
        let now = Instant::now();

        let mut first = UtteranceTracker::new(counter.clone(), Duration::ZERO);
        let a = first.try_open(now).unwrap();

        // A new session builds a new tracker over the same counter.
        let mut second = UtteranceTracker::new(counter, Duration::ZERO);
        let b = second.try_open(now).unwrap();
        assert!(b.id > a.id);
    }

    #[test]
    fn test_open_refused_while_active() {
        let mut t = tracker();
        let now = Instant::now();
        assert!(t.try_open(now).is_some());
        assert!(t.try_open(now).is_none());
        assert_eq!(t.state(), UtteranceState::Active);
    }

    #[test]
    fn test_refractory_suppresses_reopen() {
        let mut t = tracker();
        let now = Instant::now();
        t.try_open(now).unwrap();
        t.begin_finalize().unwrap();
        t.close(now);

        // 200ms later: still inside the 300ms window
        assert!(t.try_open(now + Duration::from_millis(200)).is_none());
        assert_eq!(t.state(), UtteranceState::Idle);

        // Past the window: opens normally
        assert!(t.try_open(now + Duration::from_millis(301)).is_some());
    }

    #[test]
    fn test_begin_finalize_only_from_active() {
        let mut t = tracker();
        assert!(t.begin_finalize().is_none());

        let now = Instant::now();
        t.try_open(now).unwrap();
        assert!(t.begin_finalize().is_some());
        // Second attempt for the same utterance is refused
        assert!(t.begin_finalize().is_none());
    }

    #[test]
    fn test_touch_text_updates_record() {
        let mut t = tracker();
        let now = Instant::now();
        t.try_open(now).unwrap();

        let later = now + Duration::from_millis(500);
        t.touch_text(later);
        assert_eq!(t.current().unwrap().last_text_at, later);
        assert_eq!(t.current().unwrap().started_at, now);
    }

    #[test]
    fn test_reset_clears_refractory() {
        let mut t = tracker();
        let now = Instant::now();
        t.try_open(now).unwrap();
        t.begin_finalize().unwrap();
        t.close(now);

        t.reset();
        // Inside what would have been the window, but reset cleared it
        assert!(t.try_open(now + Duration::from_millis(100)).is_some());
    }
}
