//! prepdrill-providers — Remote feedback integrations.
//!
//! Implements [`prepdrill_core::traits::FeedbackProvider`] against the
//! Gemini `generateContent` API, plus a mock reviewer for tests and the
//! configuration layer that decides whether a remote credential is
//! available at all.

pub mod config;
pub mod error;
pub mod gemini;
pub mod mock;

pub use config::{configured_reviewer, create_reviewer, load_config, load_config_from};
pub use error::ProviderError;
