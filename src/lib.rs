//! speechseg - Utterance segmentation core for streaming speech recognition
//!
//! Converts a stream of microphone audio frames and a parallel stream of
//! streaming recognition results into discrete, well-bounded text chunks.
//! Silence in the raw audio is tracked independently of the recognizer, so
//! chunk boundaries are forced even when no final result ever arrives.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod clock;
pub mod config;
pub mod defaults;
pub mod error;
pub mod recognizer;
pub mod segment;

// Core traits (audio in, recognition in, chunks out)
pub use clock::{Clock, ManualClock, SystemClock};
pub use recognizer::{RecognitionResult, SpeechRecognizer};

// Engine
pub use segment::engine::{AudioFeed, SegmentationEngine};
pub use segment::frame::{AudioFrame, FinalChunk, PartialChunk};

// Error handling
pub use error::{Result, StartError};

// Config
pub use config::EngineConfig;
