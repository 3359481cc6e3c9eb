//! Error types for the session layer.

use quizhall_protocol::{ParticipantId, QuestionId, SessionId};
use quizhall_transport::ConnectionId;

/// Errors that can occur while looking up or mutating session state.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session is registered under this id.
    #[error("session {0} not found")]
    SessionNotFound(SessionId),

    /// The session exists but has no participant with this id.
    #[error("participant {participant} not found in session {session}")]
    ParticipantNotFound {
        session: SessionId,
        participant: ParticipantId,
    },

    /// The session's question list has no question with this id.
    #[error("question {question} not found in session {session}")]
    QuestionNotFound {
        session: SessionId,
        question: QuestionId,
    },

    /// The connection behind a handle is gone; nothing more can be sent to it.
    #[error("connection {0} is closed")]
    ConnectionClosed(ConnectionId),
}
