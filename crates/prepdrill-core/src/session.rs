//! Session controller: composes the timer, draft store, live scorer,
//! recording session, and feedback generator for one attempt.
//!
//! Single logical thread of control: the host drives `edit` on input and
//! `tick` at the timer cadence; the controller owns the debounce deadline
//! and the capture deadline, so no detached callback can outlive the
//! attempt.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::{RecordingError, SubmissionError};
use crate::feedback::FeedbackGenerator;
use crate::model::{Attempt, Modality, Question};
use crate::recording::{RecordingSession, RecordingState};
use crate::report::FeedbackReport;
use crate::scorer::{self, ExampleSignals, ScoreSnapshot};
use crate::timer::{AttemptTimer, Ticker};
use crate::traits::{CaptureDevice, DraftStore};

/// Quiet period before an edited draft is persisted (trailing edge).
pub const DRAFT_DEBOUNCE: Duration = Duration::from_secs(1);

/// Session tuning knobs.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Trailing-edge debounce for draft saves.
    pub draft_debounce: Duration,
    /// Upper bound on a single capture.
    pub max_capture: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            draft_debounce: DRAFT_DEBOUNCE,
            max_capture: crate::recording::MAX_CAPTURE,
        }
    }
}

/// Lifecycle phase of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Accepting edits and recordings.
    Answering,
    /// A report was produced; the attempt is terminal.
    Completed,
}

/// Owns one attempt from entry to report.
pub struct SessionController {
    question: Question,
    attempt: Attempt,
    timer: AttemptTimer,
    store: Arc<dyn DraftStore>,
    recording: RecordingSession,
    generator: FeedbackGenerator,
    signals: ExampleSignals,
    score: ScoreSnapshot,
    pending_save: Option<Instant>,
    config: SessionConfig,
    phase: SessionPhase,
}

impl SessionController {
    /// Enter a question: start the timer, rehydrate any saved draft, and
    /// prime the live score.
    pub async fn begin(
        question: Question,
        modality: Modality,
        store: Arc<dyn DraftStore>,
        device: Arc<dyn CaptureDevice>,
        generator: FeedbackGenerator,
        config: SessionConfig,
    ) -> anyhow::Result<Self> {
        let mut attempt = Attempt::new(&question, modality);
        if let Some(draft) = store.load(&attempt.draft_key()).await? {
            debug!(key = %attempt.draft_key(), "rehydrated draft");
            attempt.text_content = draft;
        }

        let signals = ExampleSignals::default();
        let score = scorer::score(&attempt.text_content, 0, &signals);
        let recording = RecordingSession::new(device).with_max_capture(config.max_capture);

        Ok(Self {
            question,
            attempt,
            timer: AttemptTimer::start(),
            store,
            recording,
            generator,
            signals,
            score,
            pending_save: None,
            config,
            phase: SessionPhase::Answering,
        })
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn attempt(&self) -> &Attempt {
        &self.attempt
    }

    /// Latest live score.
    pub fn score(&self) -> ScoreSnapshot {
        self.score
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.timer.elapsed_seconds()
    }

    pub fn recording_state(&self) -> RecordingState {
        self.recording.state()
    }

    /// The ≈1 Hz elapsed-seconds stream for UI consumption. Drop it when
    /// the attempt ends.
    pub fn ticker(&self) -> Ticker {
        self.timer.ticker()
    }

    /// Apply an edit: update the answer, re-score, and arm the
    /// trailing-edge debounced draft save. Edits on a completed attempt are
    /// ignored.
    pub fn edit(&mut self, text: &str) {
        if self.phase == SessionPhase::Completed {
            debug!("ignoring edit on a completed attempt");
            return;
        }
        self.attempt.text_content = text.to_string();
        self.rescore();
        self.pending_save = Some(Instant::now() + self.config.draft_debounce);
    }

    /// Periodic maintenance, called at the timer cadence: refresh the score
    /// for elapsed time, flush a due draft save, and enforce the capture
    /// deadline. All failures are recovered here.
    pub async fn tick(&mut self) {
        if self.phase == SessionPhase::Completed {
            return;
        }
        self.rescore();

        if matches!(self.pending_save, Some(deadline) if Instant::now() >= deadline) {
            if let Err(e) = self.flush_draft().await {
                warn!(error = %e, key = %self.attempt.draft_key(), "draft save failed");
            }
        }

        match self.recording.poll_deadline(Instant::now()).await {
            Ok(true) => {
                debug!("capture reached its bound and was auto-finalized");
                self.attempt.captured_media = self.recording.media().cloned();
            }
            Ok(false) => {}
            Err(e) => warn!(error = %e, "capture auto-finalize failed"),
        }
    }

    /// Persist the draft immediately and disarm the debounce.
    pub async fn flush_draft(&mut self) -> anyhow::Result<()> {
        self.pending_save = None;
        self.store
            .save(&self.attempt.draft_key(), &self.attempt.text_content)
            .await
    }

    /// Begin capturing for the attempt's modality.
    pub async fn start_recording(&mut self) -> Result<(), RecordingError> {
        self.recording.start(self.attempt.modality).await
    }

    /// Stop the in-flight capture and attach the media to the attempt.
    pub async fn stop_recording(&mut self) -> Result<(), RecordingError> {
        self.recording.stop().await?;
        self.attempt.captured_media = self.recording.media().cloned();
        Ok(())
    }

    /// Drop any capture state and detach media from the attempt.
    pub async fn discard_recording(&mut self) {
        self.recording.discard().await;
        self.attempt.captured_media = None;
    }

    /// Submit the attempt: validate, generate the report, clear the draft.
    /// On success the attempt is terminal.
    pub async fn submit(&mut self) -> Result<FeedbackReport, SubmissionError> {
        if self.phase == SessionPhase::Completed {
            return Err(SubmissionError::AlreadySubmitted);
        }
        if !self.attempt.is_submittable() {
            return Err(SubmissionError::InvalidSubmission);
        }

        self.rescore();
        let elapsed = self.timer.elapsed_seconds();
        let report = self
            .generator
            .generate(&self.question, &self.attempt, self.score, elapsed)
            .await;

        self.pending_save = None;
        if let Err(e) = self.store.clear(&self.attempt.draft_key()).await {
            warn!(error = %e, key = %self.attempt.draft_key(), "failed to clear submitted draft");
        }
        self.phase = SessionPhase::Completed;
        Ok(report)
    }

    /// Start a fresh attempt on the same question, reinitializing the timer
    /// and live score from zero.
    pub async fn restart(&mut self) {
        self.recording.discard().await;
        self.attempt = Attempt::new(&self.question, self.attempt.modality);
        self.timer.reset();
        self.pending_save = None;
        self.phase = SessionPhase::Answering;
        self.rescore();
    }

    /// Release resources before navigating away: force-stop any capture and
    /// flush an unsaved draft so no typed text is lost.
    pub async fn abandon(&mut self) {
        self.recording.discard().await;
        if self.phase == SessionPhase::Answering && self.pending_save.is_some() {
            if let Err(e) = self.flush_draft().await {
                warn!(error = %e, "draft flush on abandon failed");
            }
        }
    }

    fn rescore(&mut self) {
        self.score = scorer::score(
            &self.attempt.text_content,
            self.timer.elapsed_seconds(),
            &self.signals,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Difficulty;
    use crate::recording::ScriptedCaptureDevice;
    use crate::traits::DraftStore;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// In-memory store with save accounting, enough to observe debounce
    /// behavior.
    #[derive(Default)]
    struct CountingStore {
        entries: Mutex<HashMap<String, String>>,
        saves: AtomicU32,
    }

    impl CountingStore {
        fn save_count(&self) -> u32 {
            self.saves.load(Ordering::Relaxed)
        }

        fn get(&self, key: &crate::model::DraftKey) -> Option<String> {
            self.entries.lock().unwrap().get(&key.storage_key()).cloned()
        }

        fn put(&self, key: &crate::model::DraftKey, text: &str) {
            self.entries
                .lock()
                .unwrap()
                .insert(key.storage_key(), text.to_string());
        }
    }

    #[async_trait]
    impl DraftStore for CountingStore {
        async fn save(&self, key: &crate::model::DraftKey, text: &str) -> anyhow::Result<()> {
            self.saves.fetch_add(1, Ordering::Relaxed);
            self.put(key, text);
            Ok(())
        }

        async fn load(&self, key: &crate::model::DraftKey) -> anyhow::Result<Option<String>> {
            Ok(self.get(key))
        }

        async fn clear(&self, key: &crate::model::DraftKey) -> anyhow::Result<()> {
            self.entries.lock().unwrap().remove(&key.storage_key());
            Ok(())
        }
    }

    fn question() -> Question {
        Question {
            id: "db-indexes".into(),
            category: "database".into(),
            difficulty: Difficulty::Medium,
            title: "indexes".into(),
            prompt: "When does an index help a query, and when does it hurt?".into(),
            tags: vec![],
            expected_minutes: Some(10),
        }
    }

    async fn controller(
        store: Arc<CountingStore>,
        modality: Modality,
    ) -> (SessionController, Arc<ScriptedCaptureDevice>) {
        let device = Arc::new(ScriptedCaptureDevice::new(vec![0xAB; 8]));
        let session = SessionController::begin(
            question(),
            modality,
            store,
            Arc::clone(&device) as Arc<dyn crate::traits::CaptureDevice>,
            FeedbackGenerator::local_only(),
            SessionConfig::default(),
        )
        .await
        .unwrap();
        (session, device)
    }

    #[tokio::test(start_paused = true)]
    async fn begin_rehydrates_existing_draft() {
        let store = Arc::new(CountingStore::default());
        store.put(
            &crate::model::DraftKey::new("database", "db-indexes"),
            "b-tree lookups avoid full scans",
        );

        let (session, _) = controller(Arc::clone(&store), Modality::Text).await;
        assert_eq!(
            session.attempt().text_content,
            "b-tree lookups avoid full scans"
        );
        assert!(session.score().value > 0, "rehydrated text is scored");
    }

    #[tokio::test(start_paused = true)]
    async fn draft_save_debounces_on_the_trailing_edge() {
        let store = Arc::new(CountingStore::default());
        let (mut session, _) = controller(Arc::clone(&store), Modality::Text).await;

        session.edit("indexes speed up reads");
        tokio::time::advance(Duration::from_millis(500)).await;
        session.tick().await;
        assert_eq!(store.save_count(), 0, "still inside the quiet period");

        // A second edit pushes the deadline out.
        session.edit("indexes speed up reads but slow down writes");
        tokio::time::advance(Duration::from_millis(600)).await;
        session.tick().await;
        assert_eq!(store.save_count(), 0, "deadline moved by the second edit");

        tokio::time::advance(Duration::from_millis(500)).await;
        session.tick().await;
        assert_eq!(store.save_count(), 1, "one write for the burst of edits");
        assert_eq!(
            store.get(&session.attempt().draft_key()).as_deref(),
            Some("indexes speed up reads but slow down writes")
        );

        // Quiet ticks do not amplify writes.
        tokio::time::advance(Duration::from_secs(5)).await;
        session.tick().await;
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn score_refreshes_as_time_passes() {
        let store = Arc::new(CountingStore::default());
        let (mut session, _) = controller(store, Modality::Text).await;

        session.edit("an index trades write cost for read speed");
        let early = session.score().value;

        // Enough elapsed time to erode the articulation bonus.
        tokio::time::advance(Duration::from_secs(600)).await;
        session.tick().await;
        assert!(session.score().value < early);
    }

    #[tokio::test(start_paused = true)]
    async fn submit_requires_text_or_media() {
        let store = Arc::new(CountingStore::default());
        let (mut session, _) = controller(store, Modality::Text).await;

        let err = session.submit().await.unwrap_err();
        assert!(matches!(err, SubmissionError::InvalidSubmission));
        assert_eq!(session.phase(), SessionPhase::Answering);
    }

    #[tokio::test(start_paused = true)]
    async fn submit_produces_report_and_clears_draft() {
        let store = Arc::new(CountingStore::default());
        let (mut session, _) = controller(Arc::clone(&store), Modality::Text).await;

        session.edit("covering indexes can satisfy a query entirely");
        session.flush_draft().await.unwrap();
        assert!(store.get(&session.attempt().draft_key()).is_some());

        tokio::time::advance(Duration::from_secs(30)).await;
        let report = session.submit().await.unwrap();

        assert_eq!(report.time_spent_seconds, 30);
        assert_eq!(report.total_score, session.score().value);
        assert!(store.get(&session.attempt().draft_key()).is_none());
        assert_eq!(session.phase(), SessionPhase::Completed);

        // Terminal: no second report, edits ignored.
        assert!(matches!(
            session.submit().await,
            Err(SubmissionError::AlreadySubmitted)
        ));
        session.edit("late edit");
        assert_ne!(session.attempt().text_content, "late edit");
    }

    #[tokio::test(start_paused = true)]
    async fn audio_attempt_submits_captured_media() {
        let store = Arc::new(CountingStore::default());
        let (mut session, device) = controller(store, Modality::Audio).await;

        session.start_recording().await.unwrap();
        assert!(matches!(
            session.start_recording().await,
            Err(RecordingError::AlreadyRecording)
        ));

        session.stop_recording().await.unwrap();
        assert!(session.attempt().captured_media.is_some());
        assert!(session.attempt().is_submittable());

        let report = session.submit().await.unwrap();
        assert_eq!(report.total_score, 0, "no text, no text score");
        assert_eq!(device.acquire_count(), device.release_count());
    }

    #[tokio::test(start_paused = true)]
    async fn capture_bound_is_enforced_by_tick() {
        let store = Arc::new(CountingStore::default());
        let (mut session, _) = controller(store, Modality::Audio).await;

        session.start_recording().await.unwrap();
        tokio::time::advance(crate::recording::MAX_CAPTURE).await;
        session.tick().await;

        assert_eq!(session.recording_state(), RecordingState::Captured);
        assert!(session.attempt().captured_media.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn discard_recording_detaches_media() {
        let store = Arc::new(CountingStore::default());
        let (mut session, device) = controller(store, Modality::Video).await;

        session.start_recording().await.unwrap();
        session.stop_recording().await.unwrap();
        session.discard_recording().await;

        assert!(session.attempt().captured_media.is_none());
        assert_eq!(session.recording_state(), RecordingState::Idle);
        assert_eq!(device.acquire_count(), device.release_count());

        // Re-record after discard.
        session.start_recording().await.unwrap();
        assert_eq!(session.recording_state(), RecordingState::Capturing);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_reinitializes_from_zero() {
        let store = Arc::new(CountingStore::default());
        let (mut session, _) = controller(store, Modality::Text).await;

        session.edit("first pass at an answer");
        tokio::time::advance(Duration::from_secs(45)).await;
        let first_id = session.attempt().id;
        session.submit().await.unwrap();

        session.restart().await;
        assert_eq!(session.phase(), SessionPhase::Answering);
        assert_ne!(session.attempt().id, first_id);
        assert!(session.attempt().text_content.is_empty());
        assert_eq!(session.elapsed_seconds(), 0);
        assert_eq!(session.score(), ScoreSnapshot::empty());
    }

    #[tokio::test(start_paused = true)]
    async fn abandon_flushes_pending_draft_and_releases_capture() {
        let store = Arc::new(CountingStore::default());
        let (mut session, device) = controller(Arc::clone(&store), Modality::Audio).await;

        session.edit("notes typed before switching to audio was possible");
        session.start_recording().await.unwrap();
        session.abandon().await;

        assert_eq!(store.save_count(), 1, "pending draft flushed");
        assert_eq!(device.acquire_count(), device.release_count());
        assert_eq!(session.recording_state(), RecordingState::Idle);
    }
}
