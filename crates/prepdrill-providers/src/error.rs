//! Provider error types.
//!
//! Every variant is absorbed by the feedback generator's fallback path; the
//! taxonomy exists for logging and tests, not for user-facing surfaces.

use thiserror::Error;

/// Errors that can occur when requesting a remote review.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Authentication failed (invalid or revoked API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// A 2xx response without the expected feedback field.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}
