//! The live provisional scorer.
//!
//! A pure function of the answer text and elapsed time, invoked by the
//! session controller whenever either input changes. No I/O, no hidden
//! clock reads; determinism is what makes the session loop testable.

use serde::{Deserialize, Serialize};

/// Points granted per whitespace-separated word.
pub const POINTS_PER_WORD: f64 = 2.0;
/// Cap on the length-based portion of the score.
pub const BASE_SCORE_CAP: f64 = 60.0;
/// Starting value of the articulation-speed bonus.
pub const TIME_BONUS_CEILING: f64 = 30.0;
/// Bonus lost per elapsed second; the bonus floors at zero.
pub const TIME_DECAY_PER_SECOND: f64 = 0.05;
/// Bonus for answers that include an example marker.
pub const EXAMPLE_BONUS: f64 = 10.0;
/// Scores are quantized to multiples of this step.
pub const SCORE_STEP: u8 = 5;

/// Marker substrings that signal the answer contains a concrete example.
///
/// Defaults cover the Korean source-locale markers plus English
/// equivalents; hosts can supply their own set.
#[derive(Debug, Clone)]
pub struct ExampleSignals {
    markers: Vec<String>,
}

impl Default for ExampleSignals {
    fn default() -> Self {
        Self::new(["예시", "예를 들어", "for example", "e.g."].map(String::from))
    }
}

impl ExampleSignals {
    pub fn new(markers: impl IntoIterator<Item = String>) -> Self {
        Self {
            markers: markers
                .into_iter()
                .map(|m| m.to_lowercase())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }

    /// True when any marker occurs in `text` (case-insensitive).
    pub fn matches(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.markers.iter().any(|m| lowered.contains(m.as_str()))
    }
}

/// The live scorer's output: a provisional score in [0, 100], quantized to
/// multiples of [`SCORE_STEP`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    /// Quantized provisional score.
    pub value: u8,
    /// Whitespace-token count of the scored text.
    pub word_count: usize,
    /// Whether an example marker was found.
    pub has_example: bool,
}

impl ScoreSnapshot {
    /// The zero snapshot for an empty answer.
    pub fn empty() -> Self {
        Self {
            value: 0,
            word_count: 0,
            has_example: false,
        }
    }
}

/// Compute the provisional score for the current answer state.
///
/// Empty or whitespace-only text scores zero and earns no bonuses.
pub fn score(text: &str, elapsed_seconds: u64, signals: &ExampleSignals) -> ScoreSnapshot {
    let word_count = text.split_whitespace().count();
    if word_count == 0 {
        return ScoreSnapshot::empty();
    }

    let base = (word_count as f64 * POINTS_PER_WORD).min(BASE_SCORE_CAP);
    let time_bonus =
        (TIME_BONUS_CEILING - elapsed_seconds as f64 * TIME_DECAY_PER_SECOND).max(0.0);
    let has_example = signals.matches(text);
    let quality_bonus = if has_example { EXAMPLE_BONUS } else { 0.0 };

    let raw = (base + time_bonus + quality_bonus).clamp(0.0, 100.0);
    let value = (raw / SCORE_STEP as f64).round() as u8 * SCORE_STEP;

    ScoreSnapshot {
        value,
        word_count,
        has_example,
    }
}
