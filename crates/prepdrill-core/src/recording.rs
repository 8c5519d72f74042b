//! Recording-session state machine for audio/video answers.
//!
//! `Idle → Capturing → Captured → Idle` (re-record after discard) or
//! `Idle → Capturing → Idle` (cancel without keeping media). The capture
//! handle is consumed on every exit from `Capturing`, so device resources
//! cannot be retained past the transition regardless of which path was
//! taken.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::error::RecordingError;
use crate::model::{MediaBlob, Modality};
use crate::traits::{CaptureDevice, CaptureHandle};

/// Upper bound on a single capture; reaching it auto-finalizes the media so
/// a forgotten recording cannot retain the device indefinitely.
pub const MAX_CAPTURE: Duration = Duration::from_secs(10);

/// Observable capture lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    Idle,
    Capturing,
    Captured,
}

enum Phase {
    Idle,
    Capturing {
        handle: Box<dyn CaptureHandle>,
        deadline: Instant,
    },
    Captured {
        media: MediaBlob,
    },
}

/// Transient capture state for one attempt. At most one capture is in
/// flight at a time.
pub struct RecordingSession {
    device: Arc<dyn CaptureDevice>,
    phase: Phase,
    max_capture: Duration,
}

impl RecordingSession {
    pub fn new(device: Arc<dyn CaptureDevice>) -> Self {
        Self {
            device,
            phase: Phase::Idle,
            max_capture: MAX_CAPTURE,
        }
    }

    /// Override the capture upper bound.
    pub fn with_max_capture(mut self, bound: Duration) -> Self {
        self.max_capture = bound;
        self
    }

    pub fn state(&self) -> RecordingState {
        match self.phase {
            Phase::Idle => RecordingState::Idle,
            Phase::Capturing { .. } => RecordingState::Capturing,
            Phase::Captured { .. } => RecordingState::Captured,
        }
    }

    /// Finalized media, present only in the `Captured` state.
    pub fn media(&self) -> Option<&MediaBlob> {
        match &self.phase {
            Phase::Captured { media } => Some(media),
            _ => None,
        }
    }

    /// Begin capturing for `modality`.
    ///
    /// Rejected while a capture is in flight (`AlreadyRecording`) or while
    /// finalized media is still held (`MediaPending`). A failed device
    /// acquisition leaves the session `Idle`.
    pub async fn start(&mut self, modality: Modality) -> Result<(), RecordingError> {
        match self.phase {
            Phase::Capturing { .. } => return Err(RecordingError::AlreadyRecording),
            Phase::Captured { .. } => return Err(RecordingError::MediaPending),
            Phase::Idle => {}
        }
        let handle = self.device.acquire(modality).await?;
        self.phase = Phase::Capturing {
            handle,
            deadline: Instant::now() + self.max_capture,
        };
        Ok(())
    }

    /// Explicit stop: finalize the in-flight capture into held media.
    ///
    /// On a finalize failure the session returns to `Idle`; the consumed
    /// handle has already released its resources.
    pub async fn stop(&mut self) -> Result<(), RecordingError> {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Capturing { handle, .. } => {
                let media = handle.finalize().await?;
                self.phase = Phase::Captured { media };
                Ok(())
            }
            other => {
                self.phase = other;
                Err(RecordingError::NotCapturing)
            }
        }
    }

    /// Enforce the capture deadline; returns `true` when the bound was
    /// reached and the capture auto-finalized.
    pub async fn poll_deadline(&mut self, now: Instant) -> Result<bool, RecordingError> {
        let due = matches!(&self.phase, Phase::Capturing { deadline, .. } if now >= *deadline);
        if !due {
            return Ok(false);
        }
        self.stop().await?;
        Ok(true)
    }

    /// Drop held media, or force-stop an in-flight capture without keeping
    /// it. Always lands in `Idle`.
    pub async fn discard(&mut self) {
        if let Phase::Capturing { handle, .. } = std::mem::replace(&mut self.phase, Phase::Idle) {
            handle.release().await;
        }
    }
}

// ---------------------------------------------------------------------------
// Synthetic capture device
// ---------------------------------------------------------------------------

/// Deterministic capture device for tests and hosts without real capture
/// hardware. Yields a fixed payload and counts acquisitions/releases so the
/// release invariant is observable.
pub struct ScriptedCaptureDevice {
    payload: Vec<u8>,
    deny_reason: Option<String>,
    acquired: AtomicU32,
    released: Arc<AtomicU32>,
}

impl ScriptedCaptureDevice {
    /// A device that always succeeds, yielding `payload`.
    pub fn new(payload: Vec<u8>) -> Self {
        Self {
            payload,
            deny_reason: None,
            acquired: AtomicU32::new(0),
            released: Arc::new(AtomicU32::new(0)),
        }
    }

    /// A device that refuses every acquisition, as a permission denial
    /// would.
    pub fn denying(reason: &str) -> Self {
        Self {
            payload: Vec::new(),
            deny_reason: Some(reason.to_string()),
            acquired: AtomicU32::new(0),
            released: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Number of successful acquisitions.
    pub fn acquire_count(&self) -> u32 {
        self.acquired.load(Ordering::Relaxed)
    }

    /// Number of handles torn down (finalized or released).
    pub fn release_count(&self) -> u32 {
        self.released.load(Ordering::Relaxed)
    }
}

fn mime_for(modality: Modality) -> Option<&'static str> {
    match modality {
        Modality::Audio => Some("audio/webm"),
        Modality::Video => Some("video/webm"),
        Modality::Text => None,
    }
}

#[async_trait]
impl CaptureDevice for ScriptedCaptureDevice {
    async fn acquire(
        &self,
        modality: Modality,
    ) -> Result<Box<dyn CaptureHandle>, RecordingError> {
        if let Some(reason) = &self.deny_reason {
            return Err(RecordingError::DeviceUnavailable(reason.clone()));
        }
        let Some(mime_type) = mime_for(modality) else {
            return Err(RecordingError::DeviceUnavailable(
                "text answers do not use a capture device".into(),
            ));
        };
        self.acquired.fetch_add(1, Ordering::Relaxed);
        Ok(Box::new(ScriptedHandle {
            payload: self.payload.clone(),
            mime_type,
            released: Arc::clone(&self.released),
        }))
    }
}

struct ScriptedHandle {
    payload: Vec<u8>,
    mime_type: &'static str,
    released: Arc<AtomicU32>,
}

#[async_trait]
impl CaptureHandle for ScriptedHandle {
    async fn finalize(self: Box<Self>) -> Result<MediaBlob, RecordingError> {
        self.released.fetch_add(1, Ordering::Relaxed);
        Ok(MediaBlob {
            mime_type: self.mime_type.to_string(),
            bytes: self.payload,
        })
    }

    async fn release(self: Box<Self>) {
        self.released.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with(device: Arc<ScriptedCaptureDevice>) -> RecordingSession {
        RecordingSession::new(device)
    }

    #[tokio::test]
    async fn start_stop_yields_media() {
        let device = Arc::new(ScriptedCaptureDevice::new(vec![7; 16]));
        let mut session = session_with(Arc::clone(&device));

        session.start(Modality::Audio).await.unwrap();
        assert_eq!(session.state(), RecordingState::Capturing);

        session.stop().await.unwrap();
        assert_eq!(session.state(), RecordingState::Captured);
        let media = session.media().unwrap();
        assert_eq!(media.mime_type, "audio/webm");
        assert_eq!(media.len(), 16);
    }

    #[tokio::test]
    async fn video_modality_gets_video_mime() {
        let device = Arc::new(ScriptedCaptureDevice::new(vec![1]));
        let mut session = session_with(device);
        session.start(Modality::Video).await.unwrap();
        session.stop().await.unwrap();
        assert_eq!(session.media().unwrap().mime_type, "video/webm");
    }

    #[tokio::test]
    async fn start_while_capturing_is_rejected_without_state_change() {
        let device = Arc::new(ScriptedCaptureDevice::new(vec![1]));
        let mut session = session_with(Arc::clone(&device));

        session.start(Modality::Audio).await.unwrap();
        let err = session.start(Modality::Audio).await.unwrap_err();
        assert!(matches!(err, RecordingError::AlreadyRecording));
        assert_eq!(session.state(), RecordingState::Capturing);
        assert_eq!(device.acquire_count(), 1);
    }

    #[tokio::test]
    async fn start_while_captured_requires_discard_first() {
        let device = Arc::new(ScriptedCaptureDevice::new(vec![1]));
        let mut session = session_with(device);

        session.start(Modality::Audio).await.unwrap();
        session.stop().await.unwrap();

        let err = session.start(Modality::Audio).await.unwrap_err();
        assert!(matches!(err, RecordingError::MediaPending));
        assert_eq!(session.state(), RecordingState::Captured);

        session.discard().await;
        assert_eq!(session.state(), RecordingState::Idle);
        session.start(Modality::Audio).await.unwrap();
    }

    #[tokio::test]
    async fn denied_acquisition_stays_idle() {
        let device = Arc::new(ScriptedCaptureDevice::denying("permission denied"));
        let mut session = session_with(device);

        let err = session.start(Modality::Audio).await.unwrap_err();
        assert!(matches!(err, RecordingError::DeviceUnavailable(_)));
        assert_eq!(session.state(), RecordingState::Idle);
    }

    #[tokio::test]
    async fn stop_without_capture_is_a_usage_error() {
        let device = Arc::new(ScriptedCaptureDevice::new(vec![]));
        let mut session = session_with(device);
        let err = session.stop().await.unwrap_err();
        assert!(matches!(err, RecordingError::NotCapturing));
        assert!(err.is_usage_error());
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_auto_finalizes() {
        let device = Arc::new(ScriptedCaptureDevice::new(vec![9; 4]));
        let mut session = session_with(device);
        session.start(Modality::Audio).await.unwrap();

        assert!(!session.poll_deadline(Instant::now()).await.unwrap());
        tokio::time::advance(MAX_CAPTURE).await;
        assert!(session.poll_deadline(Instant::now()).await.unwrap());
        assert_eq!(session.state(), RecordingState::Captured);
    }

    #[tokio::test]
    async fn every_exit_path_releases_the_device() {
        let device = Arc::new(ScriptedCaptureDevice::new(vec![1]));
        let mut session = session_with(Arc::clone(&device));

        // stop path
        session.start(Modality::Audio).await.unwrap();
        session.stop().await.unwrap();
        session.discard().await;

        // discard-while-capturing path
        session.start(Modality::Audio).await.unwrap();
        session.discard().await;

        // timeout path
        session.start(Modality::Audio).await.unwrap();
        let deadline = Instant::now() + MAX_CAPTURE;
        session.poll_deadline(deadline).await.unwrap();
        session.discard().await;

        assert_eq!(device.acquire_count(), 3);
        assert_eq!(device.release_count(), 3);

        // A further start succeeds: nothing was leaked.
        session.start(Modality::Audio).await.unwrap();
        assert_eq!(device.acquire_count(), 4);
    }
}
