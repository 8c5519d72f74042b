//! Core data model types for prepdrill.
//!
//! These are the fundamental types the engine uses to represent questions,
//! attempts, and draft identities.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Answer input modality for an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Text,
    Audio,
    Video,
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modality::Text => write!(f, "text"),
            Modality::Audio => write!(f, "audio"),
            Modality::Video => write!(f, "video"),
        }
    }
}

impl FromStr for Modality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Modality::Text),
            "audio" | "voice" => Ok(Modality::Audio),
            "video" => Ok(Modality::Video),
            other => Err(format!("unknown modality: {other}")),
        }
    }
}

/// Question difficulty bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" | "normal" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// The engine-facing view of a catalog question.
///
/// The catalog itself is an external collaborator; the engine only needs a
/// stable id to key drafts and the prompt text to review against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Stable identifier within its category.
    pub id: String,
    /// Category slug (e.g. "javascript").
    pub category: String,
    /// Difficulty band.
    pub difficulty: Difficulty,
    /// Short human-readable title.
    pub title: String,
    /// The question text presented to the user and sent for review.
    pub prompt: String,
    /// Tags for filtering and display.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Suggested time to answer, for display only.
    #[serde(default)]
    pub expected_minutes: Option<u32>,
}

/// Finalized output of an audio/video capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaBlob {
    /// Media container type (e.g. "audio/webm").
    pub mime_type: String,
    /// The encoded media bytes.
    pub bytes: Vec<u8>,
}

impl MediaBlob {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Identity of a persisted draft: one draft per (category, question).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DraftKey {
    pub category: String,
    pub question_id: String,
}

impl DraftKey {
    pub fn new(category: &str, question_id: &str) -> Self {
        Self {
            category: category.to_string(),
            question_id: question_id.to_string(),
        }
    }

    /// Composite storage key, the external persistence contract.
    pub fn storage_key(&self) -> String {
        format!("draft:{}:{}", self.category, self.question_id)
    }
}

impl fmt::Display for DraftKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.storage_key())
    }
}

/// One user's in-progress or submitted answer to one question.
#[derive(Debug, Clone)]
pub struct Attempt {
    /// Unique identifier for this attempt.
    pub id: Uuid,
    /// Question identity, immutable for the attempt's lifetime.
    pub question_id: String,
    pub category: String,
    pub difficulty: Difficulty,
    /// How the answer is given.
    pub modality: Modality,
    /// Typed answer text (text modality).
    pub text_content: String,
    /// Finalized capture (audio/video modalities).
    pub captured_media: Option<MediaBlob>,
    /// Wall-clock start, set once when the attempt begins.
    pub started_at: DateTime<Utc>,
}

impl Attempt {
    /// Begin a fresh attempt for `question`.
    pub fn new(question: &Question, modality: Modality) -> Self {
        Self {
            id: Uuid::new_v4(),
            question_id: question.id.clone(),
            category: question.category.clone(),
            difficulty: question.difficulty,
            modality,
            text_content: String::new(),
            captured_media: None,
            started_at: Utc::now(),
        }
    }

    pub fn draft_key(&self) -> DraftKey {
        DraftKey::new(&self.category, &self.question_id)
    }

    /// An attempt is submittable when exactly one of answer text or
    /// captured media is present.
    pub fn is_submittable(&self) -> bool {
        let has_text = !self.text_content.trim().is_empty();
        let has_media = self.captured_media.is_some();
        has_text != has_media
    }
}
