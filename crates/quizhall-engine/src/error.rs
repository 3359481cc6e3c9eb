//! Error types for the engine layer.

use quizhall_session::SessionError;

/// Errors returned by [`QuizEngine`](crate::QuizEngine) operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Session, participant, or question lookup failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The display name is empty or too long.
    #[error("invalid display name: {0}")]
    InvalidName(String),
}
