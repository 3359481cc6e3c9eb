//! Leaderboard fan-out to every participant of a session.

use quizhall_session::Session;

/// What happened to one leaderboard broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// The leaderboard version that was sent.
    pub version: u64,
    /// Connections the snapshot was queued on.
    pub delivered: usize,
    /// Connections that already had this version or a newer one.
    pub stale: usize,
    /// Connections whose writer has stopped.
    pub dead: usize,
}

/// Sends the session's current leaderboard to every participant.
///
/// The snapshot and its version are taken under one read lock, so the rows
/// always match the version they are tagged with. Each send only queues
/// onto the participant's connection; a dead connection is counted and
/// skipped without affecting the others.
pub async fn broadcast_leaderboard(session: &Session) -> BroadcastReport {
    let state = session.read().await;
    let mut report = BroadcastReport {
        version: state.version(),
        ..BroadcastReport::default()
    };
    let rows = state.leaderboard_rows();

    for (participant_id, connection) in state.connections() {
        match connection.send_leaderboard(session.id(), report.version, rows.clone()) {
            Ok(true) => report.delivered += 1,
            Ok(false) => report.stale += 1,
            Err(e) => {
                report.dead += 1;
                tracing::debug!(
                    session_id = %session.id(),
                    %participant_id,
                    error = %e,
                    "skipping dead connection"
                );
            }
        }
    }

    tracing::debug!(
        session_id = %session.id(),
        version = report.version,
        delivered = report.delivered,
        stale = report.stale,
        dead = report.dead,
        "leaderboard broadcast"
    );
    report
}
