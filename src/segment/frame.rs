//! Frame and event types for the segmentation engine.
//!
//! Defines the data that flows from the three producers into the serialized
//! event stream, and the output events broadcast to subscribers.

use crate::recognizer::RecognitionResult;
use std::time::Instant;

/// One buffer of captured audio.
///
/// Ephemeral: produced by the capture collaborator, consumed immediately for
/// energy measurement, never retained. Samples are mono float PCM.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Channel-1 float samples.
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Timestamp stamped at push time by the feed handle.
    pub timestamp: Instant,
}

impl AudioFrame {
    /// Creates a new audio frame.
    pub fn new(samples: Vec<f32>, sample_rate: u32, timestamp: Instant) -> Self {
        Self {
            samples,
            sample_rate,
            timestamp,
        }
    }

    /// Duration of this frame in seconds.
    ///
    /// Zero for a zero-length buffer or an invalid sample rate.
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// In-progress transcription for the active utterance.
///
/// Emitted zero or more times per utterance; each carries the full cumulative
/// text so far, superseding any earlier update with the same id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialChunk {
    /// Id of the utterance this text belongs to.
    pub utterance_id: u64,
    /// Full cumulative hypothesis text.
    pub text: String,
}

/// Finalized text for one utterance.
///
/// Emitted at most once per utterance id and immutable once constructed.
/// `text` is non-empty after trimming; `started_at <= ended_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalChunk {
    /// Id of the finalized utterance.
    pub utterance_id: u64,
    /// Definitive text, trimmed and non-empty.
    pub text: String,
    /// When the utterance opened.
    pub started_at: Instant,
    /// When the finalizing trigger arrived.
    pub ended_at: Instant,
}

/// One serialized event on the single-consumer queue.
///
/// All three producers (audio feed, recognition forwarder, periodic tick)
/// reduce to this type; the consumer task processes them strictly in
/// arrival order.
#[derive(Debug, Clone)]
pub(crate) enum EngineEvent {
    /// Audio frame from the capture feed.
    Audio(AudioFrame),
    /// Recognition result, stamped when forwarded onto the queue.
    Recognition {
        result: RecognitionResult,
        at: Instant,
    },
    /// Periodic defensive silence check.
    Tick { at: Instant },
    /// Silence-gap reconfiguration; applies on the next evaluation.
    SetSilenceGap { secs: f32 },
}

/// An engine event tagged with the session generation that produced it.
///
/// A stale callback from a torn-down session carries an old generation and
/// is discarded by the consumer instead of mutating fresh state.
#[derive(Debug, Clone)]
pub(crate) struct SessionEvent {
    pub generation: u64,
    pub event: EngineEvent,
}
