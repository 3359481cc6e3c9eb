//! Message envelopes: a `type` tag plus a type-specific `payload`.
//!
//! Both directions use serde's "adjacently tagged" representation:
//!
//! ```text
//! { "type": "join",   "payload": { "quizId": "Q1", "userName": "alice" } }
//! { "type": "result", "payload": { "correct": true, "score": 10 } }
//! ```
//!
//! An unknown tag, or a payload that doesn't fit its tag, fails to decode
//! as a whole; the dispatch loop treats both as a malformed message.

use serde::{Deserialize, Serialize};

use crate::{
    AnswerPayload, ErrorPayload, JoinPayload, JoinedPayload, LeaderboardRow,
    ResultPayload,
};

/// Client → Server messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum ClientMessage {
    /// "Put me in this session under this display name."
    Join(JoinPayload),

    /// "Here is my answer to this question."
    Answer(AnswerPayload),
}

impl ClientMessage {
    /// The wire tag of this message, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Join(_) => "join",
            Self::Answer(_) => "answer",
        }
    }
}

/// Server → Client messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum ServerMessage {
    /// Sent to the joining connection only.
    Joined(JoinedPayload),

    /// Sent to the answering connection only.
    #[serde(rename = "result")]
    AnswerResult(ResultPayload),

    /// Sent to the originating connection when a request fails.
    Error(ErrorPayload),

    /// Fanned out to every participant of a session, best score first.
    Leaderboard(Vec<LeaderboardRow>),
}

impl ServerMessage {
    /// Builds an `error` envelope with a human-readable message.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(ErrorPayload {
            message: message.into(),
        })
    }

    /// The wire tag of this message, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Joined(_) => "joined",
            Self::AnswerResult(_) => "result",
            Self::Error(_) => "error",
            Self::Leaderboard(_) => "leaderboard",
        }
    }
}
