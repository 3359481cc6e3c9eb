//! Engine configuration and scoring rules.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ScoringPolicy
// ---------------------------------------------------------------------------

/// How repeated correct answers to the same question are scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScoringPolicy {
    /// Points for a question are awarded at most once per participant.
    /// Re-submitting a correct answer reports `correct: true` and leaves
    /// the score unchanged.
    #[default]
    OncePerQuestion,

    /// Every correct submission earns points, even for a question already
    /// answered correctly.
    Cumulative,
}

// ---------------------------------------------------------------------------
// QuizConfig
// ---------------------------------------------------------------------------

/// Settings shared by every session the engine serves.
///
/// Start from `QuizConfig::default()` and override the fields you need.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizConfig {
    /// Points added for a correct answer.
    pub points_per_correct_answer: u32,

    /// Time limit given to questions created without one. Shown to clients
    /// only; answers are accepted at any time.
    pub default_time_limit_secs: u32,

    /// Rule for repeated correct answers.
    pub scoring: ScoringPolicy,

    /// Longest accepted display name, in characters (after trimming).
    pub max_name_len: usize,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            points_per_correct_answer: 10,
            default_time_limit_secs: 30,
            scoring: ScoringPolicy::OncePerQuestion,
            max_name_len: 64,
        }
    }
}
