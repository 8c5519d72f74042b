//! Collaborator trait definitions: draft persistence, capture devices, and
//! remote feedback.
//!
//! These async traits are implemented by the `prepdrill-store` and
//! `prepdrill-providers` crates respectively; the capture traits are
//! implemented by the hosting application (or the synthetic device in
//! [`crate::recording`]).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RecordingError;
use crate::model::{DraftKey, MediaBlob, Modality};

// ---------------------------------------------------------------------------
// Draft persistence
// ---------------------------------------------------------------------------

/// Durable storage for in-progress answer drafts.
///
/// Writes are idempotent and last-write-wins; exactly one session controller
/// owns a given key at a time, so no conflict resolution is needed. The
/// backing store must survive a full process restart.
#[async_trait]
pub trait DraftStore: Send + Sync {
    /// Persist `text` under `key`, overwriting any prior value.
    async fn save(&self, key: &DraftKey, text: &str) -> anyhow::Result<()>;

    /// Load the draft for `key`, or `None` when absent.
    async fn load(&self, key: &DraftKey) -> anyhow::Result<Option<String>>;

    /// Remove the draft. Clearing an absent key is not an error.
    async fn clear(&self, key: &DraftKey) -> anyhow::Result<()>;
}

// ---------------------------------------------------------------------------
// Capture devices
// ---------------------------------------------------------------------------

/// Capture hardware abstraction for audio/video answers.
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Acquire the device for the requested modality.
    async fn acquire(&self, modality: Modality)
        -> Result<Box<dyn CaptureHandle>, RecordingError>;
}

/// An in-flight capture.
///
/// Both exits consume the handle, so a live capture cannot be leaked by the
/// state machine. Implementations must release the underlying device/track
/// resources on every path, including a failed `finalize`.
#[async_trait]
pub trait CaptureHandle: Send {
    /// Stop the capture and yield the finalized media.
    async fn finalize(self: Box<Self>) -> Result<MediaBlob, RecordingError>;

    /// Tear down without keeping the media.
    async fn release(self: Box<Self>);
}

// ---------------------------------------------------------------------------
// Remote feedback
// ---------------------------------------------------------------------------

/// A reviewer that turns a question/answer pair into prose feedback.
#[async_trait]
pub trait FeedbackProvider: Send + Sync {
    /// Human-readable provider name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Request one review. Callers bound this with their own timeout and
    /// treat every error as a signal to fall back locally.
    async fn review(&self, request: &ReviewRequest) -> anyhow::Result<ReviewResponse>;
}

/// Request for one remote review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRequest {
    /// The question text the answer responds to.
    pub question: String,
    /// The user's answer text.
    pub answer_text: String,
}

/// Prose feedback from a remote reviewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewResponse {
    /// The feedback text, used verbatim as the report's improvement example.
    pub text: String,
    /// Model that produced the response.
    pub model: String,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}
