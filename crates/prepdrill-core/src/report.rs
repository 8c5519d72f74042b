//! Feedback report types and the numeric derivations shared by both
//! feedback sources.
//!
//! Numeric presentation is always computed locally, whichever source the
//! prose came from, so remote and fallback reports read consistently.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed experience reward per completed attempt. Completion-based, not
/// performance-based.
pub const EXPERIENCE_PER_ATTEMPT: u32 = 25;
/// Minimum star rating a submitted answer receives.
pub const MIN_STAR_RATING: u8 = 3;
/// Scores at or above this earn five stars.
pub const FIVE_STAR_MIN: u8 = 90;
/// Scores at or above this earn four stars.
pub const FOUR_STAR_MIN: u8 = 75;
/// Subscores stay within this distance of the total score.
pub const SUBSCORE_BAND: i32 = 8;

/// Where a report's prose came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeedbackSource {
    Remote,
    LocalFallback,
}

impl fmt::Display for FeedbackSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedbackSource::Remote => write!(f, "remote"),
            FeedbackSource::LocalFallback => write!(f, "local-fallback"),
        }
    }
}

/// Achievement tier, monotonic in star rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl Grade {
    /// Tier for a star rating. The submission floor of
    /// [`MIN_STAR_RATING`] stars means Bronze is reserved for ratings
    /// below it.
    pub fn from_stars(stars: u8) -> Self {
        match stars {
            5.. => Grade::Platinum,
            4 => Grade::Gold,
            3 => Grade::Silver,
            _ => Grade::Bronze,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grade::Bronze => write!(f, "bronze"),
            Grade::Silver => write!(f, "silver"),
            Grade::Gold => write!(f, "gold"),
            Grade::Platinum => write!(f, "platinum"),
        }
    }
}

/// Star rating for a total score: bands map to {3, 4, 5}. Scores below the
/// four-star band still receive the floor of [`MIN_STAR_RATING`] stars.
pub fn star_rating_for(total: u8) -> u8 {
    if total >= FIVE_STAR_MIN {
        5
    } else if total >= FOUR_STAR_MIN {
        4
    } else {
        MIN_STAR_RATING
    }
}

/// Per-dimension quality estimates, each 0–100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscores {
    pub accuracy: u8,
    pub clarity: u8,
    pub completeness: u8,
    pub examples: u8,
}

impl Subscores {
    /// Derive subscores anchored at `total`, independently perturbed within
    /// ±[`SUBSCORE_BAND`] and clamped to [0, 100]. The perturbation is
    /// seeded from the answer text, so identical submissions always yield
    /// identical subscores.
    pub fn derive(total: u8, answer_text: &str) -> Self {
        let mut hasher = DefaultHasher::new();
        answer_text.hash(&mut hasher);
        let mut rng = StdRng::seed_from_u64(hasher.finish());

        let mut dimension = || {
            let offset = rng.gen_range(-SUBSCORE_BAND..=SUBSCORE_BAND);
            (total as i32 + offset).clamp(0, 100) as u8
        };

        Self {
            accuracy: dimension(),
            clarity: dimension(),
            completeness: dimension(),
            examples: dimension(),
        }
    }

    /// All four dimensions in presentation order.
    pub fn as_array(&self) -> [(&'static str, u8); 4] {
        [
            ("accuracy", self.accuracy),
            ("clarity", self.clarity),
            ("completeness", self.completeness),
            ("examples", self.examples),
        ]
    }
}

/// The terminal artifact of a submitted attempt. Created exactly once per
/// submission, immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackReport {
    /// The attempt this report evaluates.
    pub attempt_id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Overall score, 0–100.
    pub total_score: u8,
    /// Star rating, 1–5 (floor of [`MIN_STAR_RATING`] on submission).
    pub star_rating: u8,
    /// Achievement tier, monotonic in the star rating.
    pub grade: Grade,
    /// Per-dimension estimates.
    pub subscores: Subscores,
    /// What the answer did well, ordered.
    pub strengths: Vec<String>,
    /// Concrete suggestion for a better answer.
    pub improvement_example: String,
    /// A follow-up the user can practice next.
    pub follow_up_question: String,
    /// Experience points awarded for completing the attempt.
    pub experience_gained: u32,
    /// Total answer time, taken verbatim from the timer at submission.
    pub time_spent_seconds: u64,
    /// Which path produced the prose.
    pub source: FeedbackSource,
}
