//! Per-connection handler: envelope dispatch and the outbound writer.
//!
//! Each accepted connection gets its own Tokio task running
//! [`handle_connection`]. The flow is:
//!   1. Spawn a writer task that drains the connection's outbound queue
//!   2. Loop: receive envelopes → decode → dispatch `join` or `answer`
//!   3. After each successful join or answer, broadcast the leaderboard
//!
//! Replies are never written to the socket from the dispatch loop. They go
//! through the connection's [`ConnectionHandle`], the same queue that
//! broadcasts from other connections use, so every frame for one client
//! leaves in queue order.

use std::sync::Arc;

use quizhall_protocol::{
    AnswerPayload, ClientMessage, Codec, JoinPayload, JoinedPayload, ParticipantId,
    ResultPayload, ServerMessage, SessionId,
};
use quizhall_session::{ConnectionHandle, SessionRepository};
use quizhall_transport::{Connection, ConnectionId, WebSocketConnection};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::broadcast::broadcast_leaderboard;
use crate::server::ServerState;

/// Where a connection is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ConnectionState {
    /// Socket is open; no join has succeeded yet.
    Connected,
    /// A join succeeded. A later join moves the connection to another
    /// participant or session.
    Joined {
        session_id: SessionId,
        participant_id: ParticipantId,
    },
    /// The reader loop has ended.
    Closed,
}

/// Drop guard that stops the writer task when the handler exits.
///
/// Aborting drops the outbound receiver, so every `ConnectionHandle` clone
/// still held by a session reports closed from then on.
struct WriterGuard(JoinHandle<()>);

impl Drop for WriterGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<R, C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<R, C>>,
) where
    R: SessionRepository,
    C: Codec + Clone,
{
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    let conn = Arc::new(conn);
    let (handle, outbound) = ConnectionHandle::channel(conn_id);
    let _writer = WriterGuard(tokio::spawn(write_loop(
        Arc::clone(&conn),
        state.codec.clone(),
        outbound,
    )));

    let mut status = ConnectionState::Connected;

    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%conn_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        };

        let msg: ClientMessage = match state.codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "failed to decode envelope");
                reply(&handle, ServerMessage::error(format!("malformed message: {e}")));
                continue;
            }
        };

        tracing::trace!(%conn_id, kind = msg.kind(), "envelope received");
        match msg {
            ClientMessage::Join(payload) => {
                handle_join(&state, &handle, &mut status, payload).await;
            }
            ClientMessage::Answer(payload) => {
                handle_answer(&state, &handle, &status, payload).await;
            }
        }
    }

    if let ConnectionState::Joined {
        session_id,
        participant_id,
    } = &status
    {
        tracing::debug!(%conn_id, %session_id, %participant_id, "participant connection gone");
    }
    status = ConnectionState::Closed;
    tracing::trace!(%conn_id, ?status, "handler exiting");
    // _writer drops here → writer task aborted.
}

/// Joins the connection to a session and broadcasts the new leaderboard.
async fn handle_join<R, C>(
    state: &Arc<ServerState<R, C>>,
    handle: &ConnectionHandle,
    status: &mut ConnectionState,
    payload: JoinPayload,
) where
    R: SessionRepository,
    C: Codec,
{
    let outcome = match state
        .engine
        .join_session(&payload.quiz_id, &payload.user_name, handle.clone())
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::debug!(
                conn_id = %handle.id(),
                session_id = %payload.quiz_id,
                error = %e,
                "join rejected"
            );
            reply(handle, ServerMessage::error(e.to_string()));
            return;
        }
    };

    reply(
        handle,
        ServerMessage::Joined(JoinedPayload {
            quiz_id: outcome.session.id().clone(),
            user_id: outcome.participant.id.clone(),
        }),
    );
    *status = ConnectionState::Joined {
        session_id: outcome.session.id().clone(),
        participant_id: outcome.participant.id,
    };

    broadcast_leaderboard(&outcome.session).await;
}

/// Scores an answer, replies with the result, and broadcasts the leaderboard.
async fn handle_answer<R, C>(
    state: &Arc<ServerState<R, C>>,
    handle: &ConnectionHandle,
    status: &ConnectionState,
    payload: AnswerPayload,
) where
    R: SessionRepository,
    C: Codec,
{
    if !matches!(status, ConnectionState::Joined { .. }) {
        reply(handle, ServerMessage::error("join a session before answering"));
        return;
    }

    let outcome = match state.engine.submit_answer(&payload).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::debug!(
                conn_id = %handle.id(),
                session_id = %payload.quiz_id,
                error = %e,
                "answer rejected"
            );
            reply(handle, ServerMessage::error(e.to_string()));
            return;
        }
    };

    reply(
        handle,
        ServerMessage::AnswerResult(ResultPayload {
            correct: outcome.correct,
            score: outcome.score,
        }),
    );

    broadcast_leaderboard(&outcome.session).await;
}

/// Queues a reply on the connection's own handle.
fn reply(handle: &ConnectionHandle, msg: ServerMessage) {
    let kind = msg.kind();
    if let Err(e) = handle.send(msg) {
        tracing::debug!(conn_id = %handle.id(), kind, error = %e, "reply dropped");
    }
}

/// Drains the outbound queue onto the socket.
///
/// JSON output goes out as text frames. A failed write ends the loop, which
/// closes the queue and marks every handle for this connection dead.
async fn write_loop<C: Codec>(
    conn: Arc<WebSocketConnection>,
    codec: C,
    mut outbound: mpsc::UnboundedReceiver<ServerMessage>,
) {
    let conn_id: ConnectionId = conn.id();

    while let Some(msg) = outbound.recv().await {
        let kind = msg.kind();
        let bytes = match codec.encode(&msg) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(%conn_id, kind, error = %e, "failed to encode outbound message");
                continue;
            }
        };

        let sent = match std::str::from_utf8(&bytes) {
            Ok(text) => conn.send_text(text).await,
            Err(_) => conn.send(&bytes).await,
        };

        if let Err(e) = sent {
            tracing::warn!(%conn_id, kind, error = %e, "write failed; dropping connection");
            break;
        }
    }
}
