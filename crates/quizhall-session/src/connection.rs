//! The connection handle a participant holds.
//!
//! Participants never see a socket. They hold a [`ConnectionHandle`]: a
//! cheap-to-clone sender into the outbound queue of one connection. A
//! writer task on the other end of the queue does the actual network I/O,
//! so sending here never blocks and is safe under a session lock.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use quizhall_protocol::{LeaderboardRow, ServerMessage, SessionId};
use quizhall_transport::ConnectionId;
use tokio::sync::mpsc;

use crate::SessionError;

/// Sender half of one connection's outbound queue.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    sender: mpsc::UnboundedSender<ServerMessage>,
    /// Highest leaderboard version queued on this connection, per session.
    ///
    /// Versions are counted per session, so they are only compared within
    /// one session. Shared by every clone, so a connection bound to two
    /// participants of one session still sees each version once.
    leaderboard_versions: Arc<Mutex<HashMap<SessionId, u64>>>,
}

impl ConnectionHandle {
    /// Wraps an existing queue sender.
    pub fn new(id: ConnectionId, sender: mpsc::UnboundedSender<ServerMessage>) -> Self {
        Self {
            id,
            sender,
            leaderboard_versions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Creates a handle together with the receiving end of its queue.
    pub fn channel(id: ConnectionId) -> (Self, mpsc::UnboundedReceiver<ServerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(id, tx), rx)
    }

    /// Returns the id of the connection this handle points at.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns `true` once the receiving side is gone (writer exited).
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Queues a message for the connection.
    ///
    /// # Errors
    /// [`SessionError::ConnectionClosed`] if the connection's writer has
    /// stopped. The handle stays dead from then on.
    pub fn send(&self, msg: ServerMessage) -> Result<(), SessionError> {
        self.sender
            .send(msg)
            .map_err(|_| SessionError::ConnectionClosed(self.id))
    }

    /// Queues a snapshot of `session`'s leaderboard taken at `version`.
    ///
    /// Returns `Ok(false)` without queuing anything when this connection
    /// already has a snapshot of that session at `version` or newer, so a
    /// client never sees a session's leaderboard go backwards.
    ///
    /// # Errors
    /// [`SessionError::ConnectionClosed`] if the connection's writer has
    /// stopped.
    pub fn send_leaderboard(
        &self,
        session: &SessionId,
        version: u64,
        rows: Vec<LeaderboardRow>,
    ) -> Result<bool, SessionError> {
        // The check and the enqueue happen under one lock; otherwise two
        // broadcasters could pass the check and enqueue in reverse order.
        let mut versions = self.leaderboard_versions.lock();
        if versions.get(session).is_some_and(|last| *last >= version) {
            return Ok(false);
        }
        self.send(ServerMessage::Leaderboard(rows))?;
        versions.insert(session.clone(), version);
        Ok(true)
    }
}
