//! The session store: the process-wide id → [`Session`] map.
//!
//! The store's own lock protects only the map. Anything inside a session
//! is protected by that session's lock, so a lookup never waits on a busy
//! session and two sessions never contend.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use quizhall_protocol::SessionId;
use tokio::sync::RwLock;

use crate::{Admission, Participant, Session, SessionError};

/// Storage seam for sessions.
///
/// [`SessionStore`] keeps everything in memory. A persistent backend
/// would implement this same contract.
pub trait SessionRepository: Send + Sync + 'static {
    /// Looks up a session.
    ///
    /// # Errors
    /// [`SessionError::SessionNotFound`] if no session has this id.
    fn get(
        &self,
        id: &SessionId,
    ) -> impl Future<Output = Result<Arc<Session>, SessionError>> + Send;

    /// Registers a session, replacing any session with the same id.
    fn save(&self, session: Session) -> impl Future<Output = Arc<Session>> + Send;

    /// Admits a participant into a session under the session's write lock.
    ///
    /// If a participant with the same id exists it is rebound to the new
    /// connection instead (see [`SessionState::admit`](crate::SessionState::admit)).
    ///
    /// # Errors
    /// [`SessionError::SessionNotFound`] if no session has this id.
    fn add_participant(
        &self,
        id: &SessionId,
        participant: Participant,
    ) -> impl Future<Output = Result<(Arc<Session>, Admission), SessionError>> + Send;
}

/// In-memory [`SessionRepository`].
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, Arc<Session>>>,
}

impl SessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Returns `true` if no session is registered.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl SessionRepository for SessionStore {
    async fn get(&self, id: &SessionId) -> Result<Arc<Session>, SessionError> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::SessionNotFound(id.clone()))
    }

    async fn save(&self, session: Session) -> Arc<Session> {
        let session = Arc::new(session);
        let replaced = self
            .sessions
            .write()
            .await
            .insert(session.id().clone(), Arc::clone(&session));

        tracing::info!(
            session_id = %session.id(),
            questions = session.questions().len(),
            replaced = replaced.is_some(),
            "session saved"
        );
        session
    }

    async fn add_participant(
        &self,
        id: &SessionId,
        participant: Participant,
    ) -> Result<(Arc<Session>, Admission), SessionError> {
        // Store lock is released here; only the session lock is held below.
        let session = self.get(id).await?;
        let admission = session.write().await.admit(participant);
        Ok((session, admission))
    }
}

/// A shared repository is still a repository, so a caller can keep a
/// handle to the store it gave to an engine.
impl<R: SessionRepository> SessionRepository for Arc<R> {
    fn get(
        &self,
        id: &SessionId,
    ) -> impl Future<Output = Result<Arc<Session>, SessionError>> + Send {
        (**self).get(id)
    }

    fn save(&self, session: Session) -> impl Future<Output = Arc<Session>> + Send {
        (**self).save(session)
    }

    fn add_participant(
        &self,
        id: &SessionId,
        participant: Participant,
    ) -> impl Future<Output = Result<(Arc<Session>, Admission), SessionError>> + Send {
        (**self).add_participant(id, participant)
    }
}

#[cfg(test)]
mod tests {
    use quizhall_protocol::{ParticipantId, QuestionId};
    use quizhall_transport::ConnectionId;

    use super::*;
    use crate::{ConnectionHandle, Question};

    fn quiz(id: &str) -> Session {
        Session::new(
            id,
            vec![Question {
                id: QuestionId(1),
                text: "2 + 2?".into(),
                options: vec!["3".into(), "4".into()],
                correct_option: 1,
                time_limit_secs: 30,
            }],
        )
    }

    fn participant(name: &str) -> Participant {
        let (conn, _rx) = ConnectionHandle::channel(ConnectionId::new(1));
        Participant::new(name, conn)
    }

    #[tokio::test]
    async fn test_get_unknown_session_returns_not_found() {
        let store = SessionStore::new();
        let err = store.get(&SessionId::from("nope")).await.unwrap_err();
        assert!(matches!(err, SessionError::SessionNotFound(id) if id.as_str() == "nope"));
    }

    #[tokio::test]
    async fn test_save_then_get_returns_same_session() {
        let store = SessionStore::new();
        let saved = store.save(quiz("Q1")).await;

        let found = store.get(&SessionId::from("Q1")).await.unwrap();
        assert!(Arc::ptr_eq(&saved, &found));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_save_same_id_replaces_session() {
        let store = SessionStore::new();
        let first = store.save(quiz("Q1")).await;
        let second = store.save(quiz("Q1")).await;

        let found = store.get(&SessionId::from("Q1")).await.unwrap();
        assert!(Arc::ptr_eq(&second, &found));
        assert!(!Arc::ptr_eq(&first, &found));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_add_participant_unknown_session_returns_not_found() {
        let store = SessionStore::new();
        let result = store
            .add_participant(&SessionId::from("nope"), participant("alice"))
            .await;
        assert!(matches!(result, Err(SessionError::SessionNotFound(_))));
    }

    #[tokio::test]
    async fn test_add_participant_inserts_into_session() {
        let store = SessionStore::new();
        store.save(quiz("Q1")).await;

        let (session, admission) = store
            .add_participant(&SessionId::from("Q1"), participant("alice"))
            .await
            .unwrap();

        assert!(!admission.is_rejoin());
        let state = session.read().await;
        assert!(state.participant(&ParticipantId::from("alice")).is_some());
        assert_eq!(state.leaderboard().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_add_same_name_creates_one_participant() {
        let store = Arc::new(SessionStore::new());
        store.save(quiz("Q1")).await;

        let mut tasks = Vec::new();
        for _ in 0..16 {
            let store = Arc::clone(&store);
            tasks.push(tokio::spawn(async move {
                store
                    .add_participant(&SessionId::from("Q1"), participant("alice"))
                    .await
                    .unwrap()
                    .1
                    .is_rejoin()
            }));
        }

        let mut fresh_joins = 0;
        for task in tasks {
            if !task.await.unwrap() {
                fresh_joins += 1;
            }
        }

        assert_eq!(fresh_joins, 1, "exactly one join creates the participant");
        let session = store.get(&SessionId::from("Q1")).await.unwrap();
        assert_eq!(session.read().await.participant_count(), 1);
    }

    #[tokio::test]
    async fn test_shared_store_sees_sessions_saved_through_arc() {
        let store = Arc::new(SessionStore::new());
        let shared = Arc::clone(&store);

        shared.save(quiz("Q1")).await;
        shared
            .add_participant(&SessionId::from("Q1"), participant("alice"))
            .await
            .unwrap();

        let session = store.get(&SessionId::from("Q1")).await.unwrap();
        let state = session.read().await;
        assert!(state.participant(&ParticipantId::from("alice")).is_some());
    }
}
