//! `QuizEngine`: the join and answer workflows.

use std::sync::Arc;

use quizhall_protocol::{AnswerPayload, QuizView, SessionId};
use quizhall_session::{
    ConnectionHandle, Participant, Question, Session, SessionError, SessionRepository,
};

use crate::{EngineError, QuizConfig, ScoringPolicy};

/// Result of a successful join.
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    /// The session joined.
    pub session: Arc<Session>,
    /// Snapshot of the participant as stored after the join.
    pub participant: Participant,
    /// `true` if the name was already present and the participant was
    /// rebound rather than created.
    pub rejoined: bool,
}

/// Result of a successfully processed answer.
#[derive(Debug, Clone)]
pub struct AnswerOutcome {
    /// The session answered in.
    pub session: Arc<Session>,
    /// Whether the submitted option was the correct one.
    pub correct: bool,
    /// The participant's score after this submission.
    pub score: u32,
    /// Whether this submission added points.
    pub awarded: bool,
}

/// Implements the session workflows against a [`SessionRepository`].
pub struct QuizEngine<R: SessionRepository> {
    repository: R,
    config: QuizConfig,
}

impl<R: SessionRepository> QuizEngine<R> {
    /// Creates an engine over the given repository.
    pub fn new(repository: R, config: QuizConfig) -> Self {
        Self { repository, config }
    }

    /// The underlying repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// The engine's configuration.
    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    /// Registers a session with the given questions.
    ///
    /// Questions with a zero time limit get
    /// [`QuizConfig::default_time_limit_secs`].
    pub async fn create_session(
        &self,
        id: impl Into<SessionId>,
        mut questions: Vec<Question>,
    ) -> Arc<Session> {
        for question in &mut questions {
            if question.time_limit_secs == 0 {
                question.time_limit_secs = self.config.default_time_limit_secs;
            }
        }
        self.repository.save(Session::new(id, questions)).await
    }

    /// Joins `display_name` to a session on the given connection.
    ///
    /// A name already present in the session is a reconnect: the existing
    /// participant keeps its score and is rebound to `connection`. The
    /// caller is expected to broadcast the leaderboard afterwards.
    ///
    /// # Errors
    /// - [`EngineError::InvalidName`]: empty or over-long name
    /// - [`SessionError::SessionNotFound`]: unknown session
    pub async fn join_session(
        &self,
        session_id: &SessionId,
        display_name: &str,
        connection: ConnectionHandle,
    ) -> Result<JoinOutcome, EngineError> {
        let name = self.validate_name(display_name)?;
        let conn_id = connection.id();

        let (session, admission) = self
            .repository
            .add_participant(session_id, Participant::new(name, connection))
            .await?;

        let rejoined = admission.is_rejoin();
        let participant = admission.participant().clone();
        if rejoined {
            tracing::info!(
                %session_id,
                participant_id = %participant.id,
                %conn_id,
                score = participant.score,
                "participant reconnected"
            );
        } else {
            tracing::info!(
                %session_id,
                participant_id = %participant.id,
                %conn_id,
                "participant joined"
            );
        }

        Ok(JoinOutcome {
            session,
            participant,
            rejoined,
        })
    }

    /// Scores an answer and recomputes the leaderboard.
    ///
    /// The whole operation runs under the session's write lock, so
    /// concurrent submissions to one session are applied one at a time.
    /// Lookups happen before any mutation: a failed call changes nothing.
    ///
    /// # Errors
    /// - [`SessionError::SessionNotFound`]
    /// - [`SessionError::ParticipantNotFound`]
    /// - [`SessionError::QuestionNotFound`]
    pub async fn submit_answer(
        &self,
        answer: &AnswerPayload,
    ) -> Result<AnswerOutcome, EngineError> {
        let session = self.repository.get(&answer.quiz_id).await?;

        let (correct, score, awarded) = {
            let mut state = session.write().await;

            let participant = state.participant_mut(&answer.user_id).ok_or_else(|| {
                SessionError::ParticipantNotFound {
                    session: answer.quiz_id.clone(),
                    participant: answer.user_id.clone(),
                }
            })?;
            let question = session.question(answer.question_id).ok_or_else(|| {
                SessionError::QuestionNotFound {
                    session: answer.quiz_id.clone(),
                    question: answer.question_id,
                }
            })?;

            let correct = question.is_correct(answer.answer);
            let awarded = correct
                && match self.config.scoring {
                    ScoringPolicy::Cumulative => true,
                    ScoringPolicy::OncePerQuestion => !participant.has_scored(question.id),
                };
            if awarded {
                participant.award(question.id, self.config.points_per_correct_answer);
            }
            participant.touch();
            let score = participant.score;

            state.recompute_leaderboard();
            (correct, score, awarded)
        };

        tracing::debug!(
            session_id = %answer.quiz_id,
            participant_id = %answer.user_id,
            question_id = %answer.question_id,
            correct,
            awarded,
            score,
            "answer processed"
        );

        Ok(AnswerOutcome {
            session,
            correct,
            score,
            awarded,
        })
    }

    /// Rebuilds a session's leaderboard from its participants.
    ///
    /// Order is score descending, then join order ascending.
    pub async fn update_leaderboard(&self, session: &Session) {
        session.write().await.recompute_leaderboard();
    }

    /// Returns a session's questions with the correct answers hidden.
    ///
    /// # Errors
    /// [`SessionError::SessionNotFound`] for an unknown id.
    pub async fn quiz_for_client(&self, session_id: &SessionId) -> Result<QuizView, EngineError> {
        let session = self.repository.get(session_id).await?;
        Ok(QuizView {
            id: session.id().clone(),
            questions: session.questions().iter().map(Question::redacted).collect(),
        })
    }

    fn validate_name<'a>(&self, display_name: &'a str) -> Result<&'a str, EngineError> {
        let name = display_name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidName("name must not be empty".into()));
        }
        if name.chars().count() > self.config.max_name_len {
            return Err(EngineError::InvalidName(format!(
                "name must be at most {} characters",
                self.config.max_name_len
            )));
        }
        Ok(name)
    }
}
