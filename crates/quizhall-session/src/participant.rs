//! A participant: one joined identity within a session.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use quizhall_protocol::{ParticipantId, QuestionId};

use crate::ConnectionHandle;

/// A user who joined a session under a display name.
///
/// The identifier *is* the display name, so joining twice with the same
/// name lands on the same participant (a reconnect).
#[derive(Debug, Clone)]
pub struct Participant {
    /// Unique within the session; equal to the display name.
    pub id: ParticipantId,

    /// Name shown on the leaderboard.
    pub name: String,

    /// Accumulated points. Never decreases.
    pub score: u32,

    /// Where this participant's messages go. Replaced on reconnect.
    pub connection: ConnectionHandle,

    pub joined_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,

    /// Position in the session's join order. Assigned on admission and
    /// used to break score ties on the leaderboard.
    pub(crate) join_seq: u64,

    /// Questions this participant has already been awarded points for.
    scored: HashSet<QuestionId>,
}

impl Participant {
    /// Creates a fresh participant with score 0, joined now.
    pub fn new(name: impl Into<String>, connection: ConnectionHandle) -> Self {
        let name = name.into();
        let now = Utc::now();
        Self {
            id: ParticipantId(name.clone()),
            name,
            score: 0,
            connection,
            joined_at: now,
            last_active: now,
            join_seq: 0,
            scored: HashSet::new(),
        }
    }

    /// Points this participant to a new connection and marks it active.
    pub fn rebind(&mut self, connection: ConnectionHandle) {
        self.connection = connection;
        self.touch();
    }

    /// Marks the participant active now.
    pub fn touch(&mut self) {
        self.last_active = Utc::now();
    }

    /// Returns `true` if points were already awarded for `question`.
    pub fn has_scored(&self, question: QuestionId) -> bool {
        self.scored.contains(&question)
    }

    /// Adds `points` for a correct answer to `question`.
    pub fn award(&mut self, question: QuestionId, points: u32) {
        self.scored.insert(question);
        self.score = self.score.saturating_add(points);
    }

    /// Position in the session's join order (0 = first to join).
    pub fn join_order(&self) -> u64 {
        self.join_seq
    }
}
