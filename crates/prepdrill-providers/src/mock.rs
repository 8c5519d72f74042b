//! Mock reviewer for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use prepdrill_core::traits::{FeedbackProvider, ReviewRequest, ReviewResponse};

/// A mock reviewer for exercising the feedback path without real API calls.
///
/// Returns a fixed response, or fails every call when scripted to, and
/// records what it was asked.
pub struct MockReviewer {
    response_text: String,
    fail: bool,
    call_count: AtomicU32,
    last_request: Mutex<Option<ReviewRequest>>,
}

impl MockReviewer {
    /// A reviewer that always returns `text`.
    pub fn with_fixed_response(text: &str) -> Self {
        Self {
            response_text: text.to_string(),
            fail: false,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// A reviewer that fails every call, as a dead network would.
    pub fn failing() -> Self {
        Self {
            response_text: String::new(),
            fail: true,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Number of review calls made.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// The most recent request received.
    pub fn last_request(&self) -> Option<ReviewRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedbackProvider for MockReviewer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn review(&self, request: &ReviewRequest) -> anyhow::Result<ReviewResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap() = Some(request.clone());

        if self.fail {
            anyhow::bail!("mock reviewer scripted to fail");
        }

        Ok(ReviewResponse {
            text: self.response_text.clone(),
            model: "mock-model".into(),
            latency_ms: 1,
        })
    }
}
