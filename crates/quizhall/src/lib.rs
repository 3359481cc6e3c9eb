//! # Quizhall
//!
//! Live, multi-user quiz sessions over WebSocket.
//!
//! Clients join a session by display name, submit answers, and receive a
//! leaderboard that is pushed to every participant after each join or
//! answer. This crate wires the layers together:
//!
//! ```text
//! transport (bytes) → protocol (envelopes) → engine (join/answer) → session (state)
//!                                         ↘ broadcast (leaderboard fan-out)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quizhall::prelude::*;
//!
//! # async fn run() -> Result<(), QuizhallError> {
//! let server = QuizServer::<SessionStore, JsonCodec>::builder()
//!     .bind("0.0.0.0:8080")
//!     .build(SessionStore::new())
//!     .await?;
//! // server.engine().create_session("Q1", questions).await;
//! server.run().await
//! # }
//! ```

mod broadcast;
mod error;
mod handler;
mod server;

pub use broadcast::{BroadcastReport, broadcast_leaderboard};
pub use error::QuizhallError;
pub use server::{QuizServer, QuizServerBuilder};

/// Installs a `tracing` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Call once at process start. Does nothing if a subscriber is already set.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Everything needed to run a server and seed it with quizzes.
pub mod prelude {
    pub use quizhall_engine::{EngineError, QuizConfig, QuizEngine, ScoringPolicy};
    pub use quizhall_protocol::{
        AnswerPayload, ClientMessage, Codec, ErrorPayload, JoinPayload, JoinedPayload,
        JsonCodec, LeaderboardRow, ParticipantId, QuestionId, QuestionView, QuizView,
        REDACTED_ANSWER, ResultPayload, ServerMessage, SessionId,
    };
    pub use quizhall_session::{
        ConnectionHandle, Question, Session, SessionError, SessionRepository, SessionStore,
    };
    pub use quizhall_transport::ConnectionId;

    pub use crate::{QuizServer, QuizServerBuilder, QuizhallError, init_tracing};
}
