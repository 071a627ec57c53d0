//! Chunk finalization.
//!
//! Decides the definitive text for an utterance at its Active → Finalizing
//! transition: the recognizer's final text wins when usable, the cached
//! partial is the fallback, and with neither the utterance drops silently.

use crate::segment::frame::FinalChunk;
use crate::segment::utterance::Utterance;
use std::time::Instant;

/// Resolves the definitive chunk text.
///
/// Precedence: recognizer-reported final text if non-empty after trimming,
/// else the cached partial if non-empty after trimming, else `None`.
pub fn resolve(final_text: Option<&str>, cached: Option<&str>) -> Option<String> {
    if let Some(text) = final_text {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
    }
    cached.and_then(|text| {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Builds the immutable output chunk for a resolved utterance.
///
/// `ended_at` is the finalizing trigger's timestamp; event-time skew between
/// producers must never produce an inverted interval, so it is clamped up to
/// the utterance start.
pub fn build_chunk(utterance: &Utterance, text: String, ended_at: Instant) -> FinalChunk {
    FinalChunk {
        utterance_id: utterance.id,
        text,
        started_at: utterance.started_at,
        ended_at: ended_at.max(utterance.started_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_final_text_takes_precedence() {
        let resolved = resolve(Some("recognized"), Some("cached"));
        assert_eq!(resolved, Some("recognized".to_string()));
    }

    #[test]
    fn test_blank_final_falls_back_to_cache() {
        let resolved = resolve(Some("   "), Some("cached"));
        assert_eq!(resolved, Some("cached".to_string()));
    }

    #[test]
    fn test_no_usable_text_drops() {
        assert_eq!(resolve(None, None), None);
        assert_eq!(resolve(Some("  "), Some(" \n ")), None);
    }

    #[test]
    fn test_resolved_text_is_trimmed() {
        let resolved = resolve(Some("  こんにちは \n"), None);
        assert_eq!(resolved, Some("こんにちは".to_string()));
    }

    #[test]
    fn test_chunk_timestamps_never_invert() {
        let now = Instant::now();
        let utterance = Utterance {
            id: 7,
            started_at: now,
            last_text_at: now,
        };

        // Skewed trigger arriving "before" the utterance opened
        let chunk = build_chunk(&utterance, "text".to_string(), now - Duration::from_millis(5));
        assert_eq!(chunk.started_at, now);
        assert_eq!(chunk.ended_at, now);
        assert!(chunk.started_at <= chunk.ended_at);
    }

    #[test]
    fn test_chunk_carries_utterance_identity() {
        let now = Instant::now();
        let utterance = Utterance {
            id: 42,
            started_at: now,
            last_text_at: now,
        };
        let ended = now + Duration::from_secs(2);
        let chunk = build_chunk(&utterance, "text".to_string(), ended);
        assert_eq!(chunk.utterance_id, 42);
        assert_eq!(chunk.started_at, now);
        assert_eq!(chunk.ended_at, ended);
    }
}
