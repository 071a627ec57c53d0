//! Single-writer session state machine.
//!
//! One `SessionState` exists per engine session and is owned exclusively by
//! the consumer task, which feeds it the serialized event stream. All
//! mutation of utterance, silence, and coalescer state happens here, one
//! event at a time, which is what rules out the double-finalize race between
//! a silence boundary and a late recognizer final.

use crate::config::EngineConfig;
use crate::recognizer::RecognitionResult;
use crate::segment::coalescer::PartialCoalescer;
use crate::segment::energy::EnergyMonitor;
use crate::segment::finalizer;
use crate::segment::frame::{AudioFrame, EngineEvent, FinalChunk, PartialChunk};
use crate::segment::silence::SilenceDetector;
use crate::segment::utterance::UtteranceTracker;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::time::Instant;

/// Effect of one handled event, applied by the consumer task.
#[derive(Debug, Clone)]
pub(crate) enum SessionOutput {
    /// Broadcast a partial update.
    Partial(PartialChunk),
    /// Broadcast a finalized chunk.
    Final(FinalChunk),
    /// The recognizer failed terminally; perform a stop()-equivalent
    /// teardown of this session.
    Teardown,
}

/// Per-session segmentation state.
pub(crate) struct SessionState {
    config: EngineConfig,
    energy: EnergyMonitor,
    silence: SilenceDetector,
    tracker: UtteranceTracker,
    coalescer: PartialCoalescer,
    /// Most recent voiced-audio timestamp, for the tick fallback.
    last_voice_at: Option<Instant>,
}

impl SessionState {
    /// Builds fresh session state drawing utterance ids from the shared
    /// process-lifetime counter.
    pub fn new(config: EngineConfig, next_id: Arc<AtomicU64>) -> Self {
        let silence = SilenceDetector::new(config.silence_gap());
        let tracker = UtteranceTracker::new(next_id, config.refractory());
        let coalescer =
            PartialCoalescer::new(config.partial_min_interval(), config.partial_min_chars);
        let energy = EnergyMonitor::new(config.energy_alpha);
        Self {
            config,
            energy,
            silence,
            tracker,
            coalescer,
            last_voice_at: None,
        }
    }

    /// Processes one serialized event and returns the resulting outputs.
    pub fn handle(&mut self, event: EngineEvent) -> Vec<SessionOutput> {
        let mut out = Vec::new();
        match event {
            EngineEvent::Audio(frame) => self.handle_audio(&frame, &mut out),
            EngineEvent::Recognition { result, at } => {
                self.handle_recognition(result, at, &mut out)
            }
            EngineEvent::Tick { at } => self.handle_tick(at, &mut out),
            EngineEvent::SetSilenceGap { secs } => self.set_silence_gap(secs),
        }
        out
    }

    /// Applies a silence-gap change; takes effect on the next evaluation.
    pub fn set_silence_gap(&mut self, secs: f32) {
        self.config.silence_gap_secs = secs;
        self.silence.set_silence_gap(self.config.silence_gap());
    }

    fn handle_audio(&mut self, frame: &AudioFrame, out: &mut Vec<SessionOutput>) {
        let energy = self.energy.update(&frame.samples);
        let observation = self.silence.observe(energy, frame.duration_secs());

        if observation.voiced {
            self.last_voice_at = Some(frame.timestamp);
            // Voiced audio after Idle opens an utterance; a refractory drop
            // leaves the tracker untouched.
            let _ = self.tracker.try_open(frame.timestamp);
        } else if observation.boundary && self.tracker.is_open() {
            self.finalize(None, frame.timestamp, out);
        }
    }

    fn handle_recognition(
        &mut self,
        result: RecognitionResult,
        at: Instant,
        out: &mut Vec<SessionOutput>,
    ) {
        match result {
            RecognitionResult::Hypothesis { text, is_final } => {
                self.handle_hypothesis(&text, is_final, at, out)
            }
            RecognitionResult::Error { .. } => {
                // Salvage policy: the cached partial becomes the chunk rather
                // than losing user-visible speech with no recovery path.
                if self.tracker.is_open() {
                    self.finalize(None, at, out);
                }
                out.push(SessionOutput::Teardown);
            }
        }
    }

    fn handle_hypothesis(
        &mut self,
        text: &str,
        is_final: bool,
        at: Instant,
        out: &mut Vec<SessionOutput>,
    ) {
        let has_text = !text.trim().is_empty();

        if !self.tracker.is_open() {
            if !has_text {
                return;
            }
            if self.tracker.try_open(at).is_none() {
                // Refractory window: stale trailing output, dropped entirely.
                // Nothing is cached, so it cannot leak into a later chunk.
                return;
            }
        }

        if has_text {
            self.tracker.touch_text(at);
        }

        if is_final {
            self.finalize(Some(text), at, out);
            return;
        }

        // absorb caches the snapshot for finalization even when the
        // throttle suppresses the emission.
        if has_text
            && let Some(full_text) = self.coalescer.absorb(text, at)
            && let Some(utterance) = self.tracker.current()
        {
            out.push(SessionOutput::Partial(PartialChunk {
                utterance_id: utterance.id,
                text: full_text,
            }));
        }
    }

    /// Defensive fallback boundary: if neither text nor voiced audio has
    /// arrived for a full silence gap, the audio tap has likely gone quiet
    /// without the detector seeing frames — finalize from the cache.
    fn handle_tick(&mut self, at: Instant, out: &mut Vec<SessionOutput>) {
        let Some(utterance) = self.tracker.current() else {
            return;
        };

        let mut last_activity = utterance.last_text_at;
        if let Some(voice) = self.last_voice_at
            && voice > last_activity
        {
            last_activity = voice;
        }

        let gap = self.config.silence_gap();
        if at.duration_since(last_activity).as_secs_f32() >= gap {
            self.finalize(None, at, out);
        }
    }

    /// Resolves the open utterance into at most one chunk and returns to
    /// Idle. Runs synchronously within the current event step.
    fn finalize(&mut self, final_text: Option<&str>, at: Instant, out: &mut Vec<SessionOutput>) {
        let Some(utterance) = self.tracker.begin_finalize() else {
            // Already finalized (or never opened): a late duplicate trigger.
            return;
        };

        if let Some(text) = finalizer::resolve(final_text, self.coalescer.cached()) {
            out.push(SessionOutput::Final(finalizer::build_chunk(
                &utterance, text, at,
            )));
        }

        self.coalescer.clear();
        self.silence.reset();
        self.energy.reset();
        self.last_voice_at = None;
        self.tracker.close(at);
    }
}
