//! Error types for speechseg.

use thiserror::Error;

/// Errors surfaced synchronously by [`SegmentationEngine::start`].
///
/// Every failure path leaves the engine idle with no partially wired
/// session state. Mid-session recognizer failures are not represented
/// here — they tear the session down internally and never surface as a
/// return value.
///
/// [`SegmentationEngine::start`]: crate::SegmentationEngine::start
#[derive(Error, Debug)]
pub enum StartError {
    #[error("Speech recognition permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("On-device speech recognition not supported: {message}")]
    Unsupported { message: String },

    #[error("Audio device unavailable: {message}")]
    DeviceUnavailable { message: String },

    #[error("Recognition engine failed to start: {message}")]
    EngineStart { message: String },
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, StartError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_display() {
        let error = StartError::PermissionDenied {
            message: "microphone access required".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Speech recognition permission denied: microphone access required"
        );
    }

    #[test]
    fn test_unsupported_display() {
        let error = StartError::Unsupported {
            message: "no on-device model for locale".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "On-device speech recognition not supported: no on-device model for locale"
        );
    }

    #[test]
    fn test_device_unavailable_display() {
        let error = StartError::DeviceUnavailable {
            message: "no input device".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Audio device unavailable: no input device"
        );
    }

    #[test]
    fn test_engine_start_display() {
        let error = StartError::EngineStart {
            message: "recognizer busy".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Recognition engine failed to start: recognizer busy"
        );
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<StartError>();
        assert_sync::<StartError>();
    }
}
