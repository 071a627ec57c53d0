//! Utterance segmentation pipeline.
//!
//! Components, leaf-first: energy → silence → utterance → coalescer →
//! finalizer, bound together by the session state machine and driven by
//! the engine's serialized event queue.

pub mod coalescer;
pub mod energy;
pub mod engine;
pub mod finalizer;
pub mod frame;
pub mod silence;
pub mod utterance;

pub(crate) mod session;

pub use coalescer::PartialCoalescer;
pub use energy::EnergyMonitor;
pub use engine::{AudioFeed, SegmentationEngine};
pub use frame::{AudioFrame, FinalChunk, PartialChunk};
pub use silence::{SilenceDetector, SilenceObservation};
pub use utterance::{Utterance, UtteranceState, UtteranceTracker};
