//! Identifier and payload types that travel on the wire.
//!
//! Field names follow the browser client's camelCase convention
//! (`quizId`, `userName`, ...), so every payload struct carries
//! `#[serde(rename_all = "camelCase")]`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Value placed in [`QuestionView::answer`] when the correct option is
/// hidden from clients.
pub const REDACTED_ANSWER: i64 = -1;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Identifies one live quiz session (the client calls it `quizId`).
///
/// A newtype over `String` so a session id can't be passed where a
/// participant id is expected. `#[serde(transparent)]` keeps the JSON a
/// plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies a participant within a session (the client calls it `userId`).
///
/// Participants are keyed by display name, so two joins with the same
/// name resolve to the same `ParticipantId`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub String);

impl ParticipantId {
    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ParticipantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies a question within a session's question list.
///
/// Displays as the bare number the client sends as `questionId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub u32);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Inbound payloads
// ---------------------------------------------------------------------------

/// Payload of a `join` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinPayload {
    pub quiz_id: SessionId,
    pub user_name: String,
}

/// Payload of an `answer` envelope.
///
/// `answer` is the index of the chosen option. It is signed because
/// clients are free to send anything; an out-of-range index is simply
/// wrong, not malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerPayload {
    pub quiz_id: SessionId,
    pub user_id: ParticipantId,
    pub question_id: QuestionId,
    pub answer: i64,
}

// ---------------------------------------------------------------------------
// Outbound payloads
// ---------------------------------------------------------------------------

/// Payload of a `joined` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinedPayload {
    pub quiz_id: SessionId,
    pub user_id: ParticipantId,
}

/// Payload of a `result` envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultPayload {
    pub correct: bool,
    pub score: u32,
}

/// Payload of an `error` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}

/// One row of a `leaderboard` envelope: a leaderboard entry enriched with
/// the participant's display name and timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRow {
    pub user_id: ParticipantId,
    pub score: u32,
    pub user_name: String,
    pub joined_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Read-only metadata
// ---------------------------------------------------------------------------

/// A question as shown to clients. `answer` is [`REDACTED_ANSWER`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub id: QuestionId,
    pub text: String,
    pub options: Vec<String>,
    pub answer: i64,
    pub time_limit: u32,
}

/// A session's question list as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizView {
    pub id: SessionId,
    pub questions: Vec<QuestionView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&SessionId::from("Q1")).unwrap();
        assert_eq!(json, "\"Q1\"");
    }

    #[test]
    fn test_question_id_deserializes_from_plain_number() {
        let id: QuestionId = serde_json::from_str("3").unwrap();
        assert_eq!(id, QuestionId(3));
        assert_eq!(id.to_string(), "3");
    }

    #[test]
    fn test_question_id_display_matches_wire_value() {
        let id = QuestionId(42);
        assert_eq!(id.to_string(), serde_json::to_string(&id).unwrap());
    }

    #[test]
    fn test_join_payload_uses_camel_case_fields() {
        let payload: JoinPayload =
            serde_json::from_str(r#"{"quizId":"Q1","userName":"alice"}"#).unwrap();
        assert_eq!(payload.quiz_id, SessionId::from("Q1"));
        assert_eq!(payload.user_name, "alice");
    }

    #[test]
    fn test_answer_payload_accepts_negative_answer() {
        let payload: AnswerPayload = serde_json::from_str(
            r#"{"quizId":"Q1","userId":"alice","questionId":1,"answer":-1}"#,
        )
        .unwrap();
        assert_eq!(payload.answer, -1);
        assert_eq!(payload.question_id, QuestionId(1));
    }

    #[test]
    fn test_answer_payload_missing_field_fails() {
        let result: Result<AnswerPayload, _> =
            serde_json::from_str(r#"{"quizId":"Q1","userId":"alice","answer":1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_leaderboard_row_json_format() {
        let at = DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let row = LeaderboardRow {
            user_id: ParticipantId::from("alice"),
            score: 10,
            user_name: "alice".into(),
            joined_at: at,
            last_active: at,
        };
        let json = serde_json::to_value(&row).unwrap();

        assert_eq!(json["userId"], "alice");
        assert_eq!(json["score"], 10);
        assert_eq!(json["userName"], "alice");
        assert_eq!(json["joinedAt"], "2024-05-01T10:00:00Z");
        assert_eq!(json["lastActive"], "2024-05-01T10:00:00Z");
    }

    #[test]
    fn test_question_view_json_format() {
        let view = QuestionView {
            id: QuestionId(1),
            text: "2 + 2?".into(),
            options: vec!["3".into(), "4".into()],
            answer: REDACTED_ANSWER,
            time_limit: 30,
        };
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["answer"], -1);
        assert_eq!(json["timeLimit"], 30);
        assert_eq!(json["options"], serde_json::json!(["3", "4"]));
    }
}
