//! Recognizer seam.
//!
//! The acoustic/language model is an external capability: it asynchronously
//! yields cumulative hypotheses and a final flag. This crate only defines the
//! trait boundary; production wires a platform recognizer, tests wire a
//! scripted one.

use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// One result from the streaming recognizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionResult {
    /// A transcription snapshot. `text` is the full hypothesis so far
    /// (cumulative, not incremental); `is_final` marks the recognizer's
    /// definitive result for the current utterance.
    Hypothesis { text: String, is_final: bool },
    /// Terminal recognizer failure. The session tears down; no further
    /// results arrive on this stream.
    Error { message: String },
}

impl RecognitionResult {
    /// Convenience constructor for a partial hypothesis.
    pub fn partial(text: impl Into<String>) -> Self {
        Self::Hypothesis {
            text: text.into(),
            is_final: false,
        }
    }

    /// Convenience constructor for a final hypothesis.
    pub fn final_text(text: impl Into<String>) -> Self {
        Self::Hypothesis {
            text: text.into(),
            is_final: true,
        }
    }
}

/// Streaming speech recognizer capability.
///
/// Implementations must tolerate repeated `stop()` calls, including a
/// `stop()` with no active recognition — the engine calls it on every
/// teardown path.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Whether recognition is available on this host (delegated capability
    /// check; the engine refuses to start when false).
    fn is_supported(&self) -> bool;

    /// Starts a recognition stream and returns its result channel.
    ///
    /// Must either fully start or fail with no residual state.
    async fn start(&self) -> Result<mpsc::Receiver<RecognitionResult>>;

    /// Cancels any outstanding recognition work. Idempotent.
    async fn stop(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_constructor() {
        let result = RecognitionResult::partial("こん");
        assert_eq!(
            result,
            RecognitionResult::Hypothesis {
                text: "こん".to_string(),
                is_final: false,
            }
        );
    }

    #[test]
    fn test_final_constructor() {
        let result = RecognitionResult::final_text("こんにちは");
        assert!(matches!(
            result,
            RecognitionResult::Hypothesis { is_final: true, .. }
        ));
    }
}
