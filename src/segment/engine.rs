//! Segmentation engine.
//!
//! Binds the audio feed, the recognition stream, and the periodic tick into
//! one serialized event sequence consumed by a single task that owns all
//! session state, and exposes the typed output subscriptions.
//!
//! Lifecycle discipline: `start()` is "stop, then start" — any prior session
//! is fully torn down before the new one is wired, and every failure path
//! leaves the engine idle. The session lock is held across the whole
//! transition, so concurrent starts serialize. Events from a torn-down
//! session carry a stale generation and are discarded.

use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::error::{Result, StartError};
use crate::recognizer::SpeechRecognizer;
use crate::segment::frame::{AudioFrame, EngineEvent, FinalChunk, PartialChunk, SessionEvent};
use crate::segment::session::{SessionOutput, SessionState};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{Mutex, broadcast, mpsc};
use tokio::task::JoinHandle;

/// Handle the capture collaborator pushes audio through.
///
/// `push` is safe to call from an audio callback: it stamps the frame and
/// does a non-blocking `try_send`. When the queue is full the frame is
/// dropped (backlog policy is the caller's concern), and after the session
/// ends pushes land in a closed channel and vanish.
#[derive(Clone)]
pub struct AudioFeed {
    tx: mpsc::Sender<SessionEvent>,
    generation: u64,
    clock: Arc<dyn Clock>,
}

impl AudioFeed {
    /// Pushes one buffer of mono float samples.
    pub fn push(&self, samples: Vec<f32>, sample_rate: u32) {
        let frame = AudioFrame::new(samples, sample_rate, self.clock.now());
        let _ = self.tx.try_send(SessionEvent {
            generation: self.generation,
            event: EngineEvent::Audio(frame),
        });
    }
}

/// Tasks and channel of one running session.
struct Session {
    generation: u64,
    event_tx: mpsc::Sender<SessionEvent>,
    consumer: JoinHandle<()>,
    forwarder: JoinHandle<()>,
    tick: JoinHandle<()>,
}

/// Converts audio and recognition streams into bounded text chunks.
pub struct SegmentationEngine<R: SpeechRecognizer> {
    recognizer: Arc<R>,
    config: StdMutex<EngineConfig>,
    clock: Arc<dyn Clock>,
    /// Utterance ids are allocated from here across sessions, so they are
    /// never reused within a process lifetime.
    next_utterance_id: Arc<AtomicU64>,
    /// Incremented on every start and stop; events carrying an older value
    /// are stale.
    generation: AtomicU64,
    session: Arc<Mutex<Option<Session>>>,
    partial_tx: broadcast::Sender<PartialChunk>,
    final_tx: broadcast::Sender<FinalChunk>,
}

impl<R: SpeechRecognizer + 'static> SegmentationEngine<R> {
    /// Creates an engine with the system clock.
    pub fn new(recognizer: R, config: EngineConfig) -> Self {
        Self::with_clock(recognizer, config, Arc::new(SystemClock))
    }

    /// Creates an engine with an injected clock (deterministic tests).
    pub fn with_clock(recognizer: R, config: EngineConfig, clock: Arc<dyn Clock>) -> Self {
        let (partial_tx, _) = broadcast::channel(config.output_buffer_size.max(1));
        let (final_tx, _) = broadcast::channel(config.output_buffer_size.max(1));
        Self {
            recognizer: Arc::new(recognizer),
            config: StdMutex::new(config),
            clock,
            next_utterance_id: Arc::new(AtomicU64::new(1)),
            generation: AtomicU64::new(0),
            session: Arc::new(Mutex::new(None)),
            partial_tx,
            final_tx,
        }
    }

    /// Whether recognition is available on this host.
    pub fn is_supported(&self) -> bool {
        self.recognizer.is_supported()
    }

    /// Subscribes to in-progress partial updates.
    pub fn subscribe_partials(&self) -> broadcast::Receiver<PartialChunk> {
        self.partial_tx.subscribe()
    }

    /// Subscribes to finalized chunks.
    pub fn subscribe_finals(&self) -> broadcast::Receiver<FinalChunk> {
        self.final_tx.subscribe()
    }

    /// True while a session's consumer task is alive.
    pub async fn is_running(&self) -> bool {
        self.session
            .lock()
            .await
            .as_ref()
            .map(|s| !s.consumer.is_finished())
            .unwrap_or(false)
    }

    /// Starts a session and returns the audio feed handle.
    ///
    /// Idempotent: any prior session is torn down first. On any error the
    /// engine is left idle with no partially wired state.
    pub async fn start(&self) -> Result<AudioFeed> {
        // The lock is held through teardown, wiring, and install; a second
        // start() waits here instead of racing a half-built session.
        let mut slot = self.session.lock().await;
        self.teardown(&mut slot).await;

        if !self.recognizer.is_supported() {
            return Err(StartError::Unsupported {
                message: "recognizer reports no on-device support".to_string(),
            });
        }

        // Nothing is wired yet, so a recognizer failure leaves the engine idle.
        let recognition_rx = self.recognizer.start().await?;

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let config = match self.config.lock() {
            Ok(config) => config.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        let tick_interval = config.tick_interval();
        let (event_tx, mut event_rx) =
            mpsc::channel::<SessionEvent>(config.event_buffer_size.max(1));

        // Single consumer: the only writer of session state.
        let mut state = SessionState::new(config, self.next_utterance_id.clone());
        let partial_tx = self.partial_tx.clone();
        let final_tx = self.final_tx.clone();
        let recognizer = self.recognizer.clone();
        let session_slot = Arc::clone(&self.session);
        let consumer = tokio::spawn(async move {
            while let Some(SessionEvent {
                generation: event_generation,
                event,
            }) = event_rx.recv().await
            {
                if event_generation != generation {
                    continue;
                }
                for output in state.handle(event) {
                    match output {
                        SessionOutput::Partial(update) => {
                            // No subscribers is not an error.
                            let _ = partial_tx.send(update);
                        }
                        SessionOutput::Final(chunk) => {
                            let _ = final_tx.send(chunk);
                        }
                        SessionOutput::Teardown => {
                            recognizer.stop().await;
                            // Uninstall this session so the engine reads as
                            // idle and a later stop() finds nothing to do.
                            let mut slot = session_slot.lock().await;
                            if slot.as_ref().is_some_and(|s| s.generation == generation)
                                && let Some(dead) = slot.take()
                            {
                                dead.tick.abort();
                                dead.forwarder.abort();
                            }
                            return;
                        }
                    }
                }
            }
        });

        // Recognition forwarder: stamps results onto the serialized queue.
        let forwarder_tx = event_tx.clone();
        let forwarder_clock = self.clock.clone();
        let forwarder = tokio::spawn(async move {
            let mut recognition_rx = recognition_rx;
            while let Some(result) = recognition_rx.recv().await {
                let event = SessionEvent {
                    generation,
                    event: EngineEvent::Recognition {
                        result,
                        at: forwarder_clock.now(),
                    },
                };
                if forwarder_tx.send(event).await.is_err() {
                    break;
                }
            }
        });

        // Periodic tick: the defensive fallback boundary detector.
        let tick_tx = event_tx.clone();
        let tick_clock = self.clock.clone();
        let tick = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let event = SessionEvent {
                    generation,
                    event: EngineEvent::Tick {
                        at: tick_clock.now(),
                    },
                };
                if tick_tx.send(event).await.is_err() {
                    break;
                }
            }
        });

        let feed = AudioFeed {
            tx: event_tx.clone(),
            generation,
            clock: self.clock.clone(),
        };

        *slot = Some(Session {
            generation,
            event_tx,
            consumer,
            forwarder,
            tick,
        });

        Ok(feed)
    }

    /// Stops the current session. Never fails; safe from any state,
    /// including idle, and safe to call repeatedly.
    pub async fn stop(&self) {
        let mut slot = self.session.lock().await;
        self.teardown(&mut slot).await;
    }

    /// Tears down the session in `slot`, if any. The caller holds the
    /// session lock, so no new session can be wired mid-teardown.
    async fn teardown(&self, slot: &mut Option<Session>) {
        let Some(session) = slot.take() else {
            return;
        };

        // Anything still in flight from this session is stale from here on.
        self.generation.fetch_add(1, Ordering::SeqCst);

        session.tick.abort();
        session.forwarder.abort();
        session.consumer.abort();
        let _ = session.tick.await;
        let _ = session.forwarder.await;
        let _ = session.consumer.await;
        drop(session.event_tx);

        self.recognizer.stop().await;
    }

    /// Updates the silence gap. Clamped at evaluation; a running session
    /// picks the change up on its next evaluation, never retroactively.
    pub async fn set_silence_gap(&self, secs: f32) {
        match self.config.lock() {
            Ok(mut config) => config.silence_gap_secs = secs,
            Err(poisoned) => poisoned.into_inner().silence_gap_secs = secs,
        }
        // The sender is cloned out so the send below never holds the session
        // lock; a full event queue delays the update instead of dropping it.
        let target = self
            .session
            .lock()
            .await
            .as_ref()
            .map(|session| (session.event_tx.clone(), session.generation));
        if let Some((tx, generation)) = target {
            let _ = tx
                .send(SessionEvent {
                    generation,
                    event: EngineEvent::SetSilenceGap { secs },
                })
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::RecognitionResult;
    use async_trait::async_trait;

    /// Recognizer stub that is either supported or not and never yields.
    struct StubRecognizer {
        supported: bool,
    }

    #[async_trait]
    impl SpeechRecognizer for StubRecognizer {
        fn is_supported(&self) -> bool {
            self.supported
        }

        async fn start(&self) -> Result<mpsc::Receiver<RecognitionResult>> {
            let (_tx, rx) = mpsc::channel(1);
            Ok(rx)
        }

        async fn stop(&self) {}
    }

    #[tokio::test]
    async fn test_start_refuses_unsupported_recognizer() {
        let engine = SegmentationEngine::new(
            StubRecognizer { supported: false },
            EngineConfig::default(),
        );
        let result = engine.start().await;
        assert!(matches!(result, Err(StartError::Unsupported { .. })));
        assert!(!engine.is_running().await);
    }

    #[tokio::test]
    async fn test_stop_while_idle_is_a_no_op() {
        let engine = SegmentationEngine::new(
            StubRecognizer { supported: true },
            EngineConfig::default(),
        );
        engine.stop().await;
        engine.stop().await;
        assert!(!engine.is_running().await);
    }

    #[tokio::test]
    async fn test_feed_push_after_stop_is_silently_dropped() {
        let engine = SegmentationEngine::new(
            StubRecognizer { supported: true },
            EngineConfig::default(),
        );
        let feed = engine.start().await.unwrap();
        engine.stop().await;
        // Must not panic or block
        feed.push(vec![0.0; 160], 16_000);
    }

    #[tokio::test]
    async fn test_start_is_stop_then_start() {
        let engine = SegmentationEngine::new(
            StubRecognizer { supported: true },
            EngineConfig::default(),
        );
        let _first = engine.start().await.unwrap();
        let _second = engine.start().await.unwrap();
        assert!(engine.is_running().await);
        engine.stop().await;
        assert!(!engine.is_running().await);
    }
}
