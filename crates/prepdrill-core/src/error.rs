//! Engine error taxonomy.
//!
//! Recording and submission errors are recovered at the component boundary
//! where they occur; nothing in this crate is fatal to the hosting process.
//! Remote-review failures are absorbed entirely by the feedback generator
//! and never appear here.

use thiserror::Error;

/// Errors from the recording-session state machine.
#[derive(Debug, Error)]
pub enum RecordingError {
    /// The capture device could not be acquired (permission refusal, no
    /// hardware). The session stays `Idle`.
    #[error("capture device unavailable: {0}")]
    DeviceUnavailable(String),

    /// A start request arrived while a capture was already in flight.
    /// Rejected with no state change.
    #[error("a capture is already in progress")]
    AlreadyRecording,

    /// A start request arrived while finalized media was still held.
    /// Re-recording requires an explicit discard first.
    #[error("captured media is pending; discard it before re-recording")]
    MediaPending,

    /// Stop was requested with no capture in flight.
    #[error("no capture in progress")]
    NotCapturing,

    /// The device failed while finalizing the capture.
    #[error("capture failed: {0}")]
    CaptureFailed(String),
}

impl RecordingError {
    /// True when the error reflects misuse of the session API rather than a
    /// device condition; callers should report these, not retry them.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            RecordingError::AlreadyRecording
                | RecordingError::MediaPending
                | RecordingError::NotCapturing
        )
    }
}

/// Errors from submitting an attempt.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// Neither answer text nor captured media is present. Rejected before
    /// any feedback-generator call.
    #[error("attempt has neither answer text nor captured media")]
    InvalidSubmission,

    /// The attempt already produced its report; further work requires a new
    /// attempt.
    #[error("attempt was already submitted")]
    AlreadySubmitted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_error_classification() {
        assert!(RecordingError::AlreadyRecording.is_usage_error());
        assert!(RecordingError::MediaPending.is_usage_error());
        assert!(RecordingError::NotCapturing.is_usage_error());
        assert!(!RecordingError::DeviceUnavailable("no mic".into()).is_usage_error());
        assert!(!RecordingError::CaptureFailed("encoder".into()).is_usage_error());
    }
}
