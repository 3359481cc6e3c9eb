//! The quiz session engine for Quizhall.
//!
//! [`QuizEngine`] implements the two workflows that mutate a session:
//!
//! - **join**: admit a participant by display name, or rebind an existing
//!   one to a new connection
//! - **answer**: score a submission and recompute the leaderboard
//!
//! plus the read-only question view handed to clients. It holds no state of
//! its own beyond a [`SessionRepository`](quizhall_session::SessionRepository)
//! and a [`QuizConfig`]; every mutation happens under the target session's
//! lock.
//!
//! Errors are returned, never retried and never fatal. Deciding what to do
//! with them (e.g. send an `error` envelope) is the caller's job.

mod config;
mod engine;
mod error;

pub use config::{QuizConfig, ScoringPolicy};
pub use engine::{AnswerOutcome, JoinOutcome, QuizEngine};
pub use error::EngineError;
