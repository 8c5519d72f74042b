//! Feedback generation: one remote attempt with a strict local fallback.
//!
//! The generator makes at most one outbound request per submission — no
//! retries, because this sits on a user-interactive, latency-sensitive
//! path — and absorbs every remote failure. Callers always receive a
//! complete report; the only visible trace of degradation is
//! `source = local-fallback`.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};

use crate::model::{Attempt, Question};
use crate::report::{
    star_rating_for, FeedbackReport, FeedbackSource, Grade, Subscores, EXPERIENCE_PER_ATTEMPT,
};
use crate::scorer::ScoreSnapshot;
use crate::traits::{FeedbackProvider, ReviewRequest};

/// Bound on the single remote review request; expiry triggers the local
/// fallback.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(12);

/// Answers at or above this many words count as substantial.
const LONG_ANSWER_WORDS: usize = 30;
/// Answers finished within this time count as quick articulation.
const QUICK_ANSWER_SECS: u64 = 120;

/// Feedback generation settings.
#[derive(Debug, Clone)]
pub struct FeedbackConfig {
    pub request_timeout: Duration,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            request_timeout: REQUEST_TIMEOUT,
        }
    }
}

/// Produces the final [`FeedbackReport`] for a submitted attempt.
pub struct FeedbackGenerator {
    provider: Option<Arc<dyn FeedbackProvider>>,
    config: FeedbackConfig,
}

impl FeedbackGenerator {
    pub fn new(provider: Option<Arc<dyn FeedbackProvider>>, config: FeedbackConfig) -> Self {
        Self { provider, config }
    }

    /// A generator with no remote credential; every report comes from the
    /// local fallback.
    pub fn local_only() -> Self {
        Self::new(None, FeedbackConfig::default())
    }

    /// Generate the report for a submitted attempt.
    ///
    /// Numeric fields are always computed locally; a successful remote
    /// review only contributes the improvement prose and the `Remote`
    /// source marker.
    pub async fn generate(
        &self,
        question: &Question,
        attempt: &Attempt,
        live: ScoreSnapshot,
        elapsed_seconds: u64,
    ) -> FeedbackReport {
        let remote_text = match &self.provider {
            Some(provider) => {
                self.request_remote(provider.as_ref(), question, &attempt.text_content)
                    .await
            }
            None => None,
        };

        let total = live.value;
        let stars = star_rating_for(total);
        let mut report = FeedbackReport {
            attempt_id: attempt.id,
            created_at: Utc::now(),
            total_score: total,
            star_rating: stars,
            grade: Grade::from_stars(stars),
            subscores: Subscores::derive(total, &attempt.text_content),
            strengths: local_strengths(live, elapsed_seconds),
            improvement_example: local_improvement(question),
            follow_up_question: local_follow_up(question),
            experience_gained: EXPERIENCE_PER_ATTEMPT,
            time_spent_seconds: elapsed_seconds,
            source: FeedbackSource::LocalFallback,
        };

        if let Some(text) = remote_text {
            report.improvement_example = text;
            report.source = FeedbackSource::Remote;
        }
        report
    }

    /// Make the single remote attempt. Any failure mode — error, timeout,
    /// empty payload — resolves to `None`.
    async fn request_remote(
        &self,
        provider: &dyn FeedbackProvider,
        question: &Question,
        answer_text: &str,
    ) -> Option<String> {
        let request = ReviewRequest {
            question: question.prompt.clone(),
            answer_text: answer_text.to_string(),
        };

        match tokio::time::timeout(self.config.request_timeout, provider.review(&request)).await {
            Ok(Ok(response)) if !response.text.trim().is_empty() => {
                debug!(
                    provider = provider.name(),
                    latency_ms = response.latency_ms,
                    "remote review succeeded"
                );
                Some(response.text)
            }
            Ok(Ok(_)) => {
                warn!(
                    provider = provider.name(),
                    "remote review returned empty feedback; using local fallback"
                );
                None
            }
            Ok(Err(e)) => {
                warn!(
                    provider = provider.name(),
                    error = %e,
                    "remote review failed; using local fallback"
                );
                None
            }
            Err(_) => {
                warn!(
                    provider = provider.name(),
                    timeout_secs = self.config.request_timeout.as_secs(),
                    "remote review timed out; using local fallback"
                );
                None
            }
        }
    }
}

fn local_strengths(live: ScoreSnapshot, elapsed_seconds: u64) -> Vec<String> {
    let mut strengths = Vec::new();
    if live.word_count >= LONG_ANSWER_WORDS {
        strengths.push("Substantial answer with room to develop each point.".to_string());
    }
    if live.has_example {
        strengths.push("Backs the explanation with a concrete example.".to_string());
    }
    if elapsed_seconds <= QUICK_ANSWER_SECS && live.word_count > 0 {
        strengths.push("Quick, confident articulation of the core idea.".to_string());
    }
    if strengths.is_empty() {
        strengths.push("Engages directly with the question asked.".to_string());
    }
    strengths
}

fn local_improvement(question: &Question) -> String {
    format!(
        "Restate the core idea behind \"{}\" in one sentence, then back it up \
         with a concrete example from a project you know well.",
        question.title
    )
}

fn local_follow_up(question: &Question) -> String {
    format!(
        "How would you explain {} to a junior developer in under a minute?",
        question.title
    )
}
