//! Session types: one live quiz with its questions, participants, and
//! leaderboard.
//!
//! The question list is fixed at creation and read without locking.
//! Participants and the leaderboard live in [`SessionState`] behind a
//! single `RwLock`; every read or write of them goes through that lock.

use std::cmp::Reverse;
use std::collections::HashMap;

use quizhall_protocol::{
    LeaderboardRow, ParticipantId, QuestionId, QuestionView, REDACTED_ANSWER, SessionId,
};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{ConnectionHandle, Participant};

// ---------------------------------------------------------------------------
// Question
// ---------------------------------------------------------------------------

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Unique within the session.
    pub id: QuestionId,
    pub text: String,
    pub options: Vec<String>,
    /// Index into `options` of the right answer.
    pub correct_option: usize,
    /// Shown to clients; the server does not enforce it.
    pub time_limit_secs: u32,
}

impl Question {
    /// Returns `true` if `answer` is the index of the correct option.
    pub fn is_correct(&self, answer: i64) -> bool {
        usize::try_from(answer).is_ok_and(|a| a == self.correct_option)
    }

    /// The question as shown to clients, with the answer hidden.
    pub fn redacted(&self) -> QuestionView {
        QuestionView {
            id: self.id,
            text: self.text.clone(),
            options: self.options.clone(),
            answer: REDACTED_ANSWER,
            time_limit: self.time_limit_secs,
        }
    }
}

// ---------------------------------------------------------------------------
// Leaderboard
// ---------------------------------------------------------------------------

/// One leaderboard position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub participant_id: ParticipantId,
    pub score: u32,
}

/// Outcome of admitting a participant into a session.
///
/// Both variants carry a snapshot of the participant as stored.
#[derive(Debug, Clone)]
pub enum Admission {
    /// A new participant was created.
    Joined(Participant),
    /// A participant with the same id already existed and was rebound.
    Rejoined(Participant),
}

impl Admission {
    /// The admitted participant.
    pub fn participant(&self) -> &Participant {
        match self {
            Self::Joined(p) | Self::Rejoined(p) => p,
        }
    }

    /// Returns `true` if this was a reconnect to an existing identity.
    pub fn is_rejoin(&self) -> bool {
        matches!(self, Self::Rejoined(_))
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// The mutable part of a session. Only reachable through [`Session::read`]
/// and [`Session::write`].
#[derive(Debug, Default)]
pub struct SessionState {
    participants: HashMap<ParticipantId, Participant>,
    leaderboard: Vec<LeaderboardEntry>,
    /// Bumped on every leaderboard recompute.
    version: u64,
    next_join_seq: u64,
}

impl SessionState {
    /// Looks up a participant.
    pub fn participant(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.get(id)
    }

    /// Looks up a participant for mutation.
    pub fn participant_mut(&mut self, id: &ParticipantId) -> Option<&mut Participant> {
        self.participants.get_mut(id)
    }

    /// Iterates over all participants, in no particular order.
    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.participants.values()
    }

    /// Number of participants ever admitted.
    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// Admits a participant, or rebinds the existing one with the same id.
    ///
    /// On rebind, the stored participant keeps its score and join time and
    /// takes the new connection. The lookup and the insert happen under the
    /// same `&mut self`, so two concurrent joins with one name can't both
    /// create a participant. The leaderboard is recomputed either way.
    pub fn admit(&mut self, participant: Participant) -> Admission {
        let admission = match self.participants.get_mut(&participant.id) {
            Some(existing) => {
                existing.rebind(participant.connection);
                Admission::Rejoined(existing.clone())
            }
            None => {
                let mut participant = participant;
                participant.join_seq = self.next_join_seq;
                self.next_join_seq += 1;
                self.participants
                    .insert(participant.id.clone(), participant.clone());
                Admission::Joined(participant)
            }
        };
        self.recompute_leaderboard();
        admission
    }

    /// Rebuilds the leaderboard from the current participants.
    ///
    /// Order: score descending, then join order ascending. Join order is
    /// unique per participant, so the result is a total order.
    pub fn recompute_leaderboard(&mut self) {
        let mut ranked: Vec<&Participant> = self.participants.values().collect();
        ranked.sort_by_key(|p| (Reverse(p.score), p.join_seq));

        self.leaderboard = ranked
            .into_iter()
            .map(|p| LeaderboardEntry {
                participant_id: p.id.clone(),
                score: p.score,
            })
            .collect();
        self.version += 1;
    }

    /// The current ranking.
    pub fn leaderboard(&self) -> &[LeaderboardEntry] {
        &self.leaderboard
    }

    /// Version of the current leaderboard; 0 before the first recompute.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The leaderboard enriched with names and timestamps, ready to send.
    pub fn leaderboard_rows(&self) -> Vec<LeaderboardRow> {
        self.leaderboard
            .iter()
            .filter_map(|entry| {
                let p = self.participants.get(&entry.participant_id)?;
                Some(LeaderboardRow {
                    user_id: entry.participant_id.clone(),
                    score: entry.score,
                    user_name: p.name.clone(),
                    joined_at: p.joined_at,
                    last_active: p.last_active,
                })
            })
            .collect()
    }

    /// Connection handles of every participant, for fan-out.
    pub fn connections(&self) -> impl Iterator<Item = (&ParticipantId, &ConnectionHandle)> {
        self.participants.values().map(|p| (&p.id, &p.connection))
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One live quiz instance.
///
/// Created once at startup and kept for the life of the process.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    questions: Vec<Question>,
    state: RwLock<SessionState>,
}

impl Session {
    /// Creates a session with no participants.
    pub fn new(id: impl Into<SessionId>, questions: Vec<Question>) -> Self {
        Self {
            id: id.into(),
            questions,
            state: RwLock::new(SessionState::default()),
        }
    }

    /// The session's identifier.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// The question list, in order.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Looks up a question by id.
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Acquires the session lock for reading.
    pub async fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().await
    }

    /// Acquires the session lock for writing.
    pub async fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().await
    }
}

#[cfg(test)]
mod tests {
    use quizhall_transport::ConnectionId;

    use super::*;

    fn question(id: u32, correct: usize) -> Question {
        Question {
            id: QuestionId(id),
            text: format!("question {id}"),
            options: vec!["a".into(), "b".into(), "c".into()],
            correct_option: correct,
            time_limit_secs: 30,
        }
    }

    fn participant(name: &str) -> Participant {
        let (conn, _rx) = ConnectionHandle::channel(ConnectionId::new(1));
        Participant::new(name, conn)
    }

    fn ranking(state: &SessionState) -> Vec<(String, u32)> {
        state
            .leaderboard()
            .iter()
            .map(|e| (e.participant_id.to_string(), e.score))
            .collect()
    }

    // =====================================================================
    // Question
    // =====================================================================

    #[test]
    fn test_question_is_correct_matches_only_correct_index() {
        let q = question(1, 1);
        assert!(q.is_correct(1));
        assert!(!q.is_correct(0));
        assert!(!q.is_correct(2));
        assert!(!q.is_correct(-1));
    }

    #[test]
    fn test_question_redacted_hides_answer() {
        let view = question(4, 2).redacted();
        assert_eq!(view.id, QuestionId(4));
        assert_eq!(view.answer, REDACTED_ANSWER);
        assert_eq!(view.options.len(), 3);
        assert_eq!(view.time_limit, 30);
    }

    #[test]
    fn test_session_question_lookup() {
        let session = Session::new("Q1", vec![question(1, 0), question(7, 2)]);
        assert_eq!(session.question(QuestionId(7)).unwrap().correct_option, 2);
        assert!(session.question(QuestionId(3)).is_none());
    }

    // =====================================================================
    // admit()
    // =====================================================================

    #[test]
    fn test_admit_new_participant_creates_entry_with_score_zero() {
        let mut state = SessionState::default();

        let admission = state.admit(participant("alice"));

        assert!(!admission.is_rejoin());
        assert_eq!(state.participant_count(), 1);
        assert_eq!(ranking(&state), vec![("alice".into(), 0)]);
        assert_eq!(state.version(), 1);
    }

    #[test]
    fn test_admit_existing_name_rebinds_and_keeps_score() {
        let mut state = SessionState::default();
        state.admit(participant("alice"));
        state
            .participant_mut(&ParticipantId::from("alice"))
            .unwrap()
            .award(QuestionId(1), 10);

        let (conn, _rx) = ConnectionHandle::channel(ConnectionId::new(2));
        let admission = state.admit(Participant::new("alice", conn));

        assert!(admission.is_rejoin());
        assert_eq!(admission.participant().score, 10);
        assert_eq!(state.participant_count(), 1, "no duplicate entry");
        let stored = state.participant(&ParticipantId::from("alice")).unwrap();
        assert_eq!(stored.connection.id(), ConnectionId::new(2));
        assert_eq!(state.leaderboard().len(), 1);
    }

    #[test]
    fn test_admit_assigns_increasing_join_order() {
        let mut state = SessionState::default();
        state.admit(participant("alice"));
        state.admit(participant("bob"));
        state.admit(participant("alice"));

        let alice = state.participant(&ParticipantId::from("alice")).unwrap();
        let bob = state.participant(&ParticipantId::from("bob")).unwrap();
        assert_eq!(alice.join_order(), 0);
        assert_eq!(bob.join_order(), 1);
    }

    // =====================================================================
    // recompute_leaderboard()
    // =====================================================================

    #[test]
    fn test_leaderboard_sorted_by_score_then_join_order() {
        let mut state = SessionState::default();
        for name in ["carol", "alice", "bob", "dave"] {
            state.admit(participant(name));
        }
        state
            .participant_mut(&ParticipantId::from("bob"))
            .unwrap()
            .award(QuestionId(1), 10);
        state
            .participant_mut(&ParticipantId::from("dave"))
            .unwrap()
            .award(QuestionId(1), 10);
        state.recompute_leaderboard();

        assert_eq!(
            ranking(&state),
            vec![
                ("bob".into(), 10),
                ("dave".into(), 10),
                ("carol".into(), 0),
                ("alice".into(), 0),
            ]
        );
    }

    #[test]
    fn test_recompute_bumps_version() {
        let mut state = SessionState::default();
        assert_eq!(state.version(), 0);
        state.recompute_leaderboard();
        state.recompute_leaderboard();
        assert_eq!(state.version(), 2);
    }

    #[test]
    fn test_leaderboard_rows_carry_names_and_timestamps() {
        let mut state = SessionState::default();
        state.admit(participant("alice"));

        let rows = state.leaderboard_rows();
        let alice = state.participant(&ParticipantId::from("alice")).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_name, "alice");
        assert_eq!(rows[0].joined_at, alice.joined_at);
        assert_eq!(rows[0].last_active, alice.last_active);
    }

    #[tokio::test]
    async fn test_session_lock_guards_state() {
        let session = Session::new("Q1", vec![question(1, 1)]);
        session.write().await.admit(participant("alice"));

        let state = session.read().await;
        assert_eq!(state.participant_count(), 1);
        assert_eq!(session.id(), &SessionId::from("Q1"));
    }
}
