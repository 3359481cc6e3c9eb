//! Quiz session state for Quizhall.
//!
//! This crate owns everything that lives in memory for the lifetime of the
//! process:
//!
//! 1. **Session store**: the id → [`Session`] map ([`SessionStore`], behind
//!    the [`SessionRepository`] trait)
//! 2. **Sessions**: immutable questions plus lock-guarded participants and
//!    leaderboard ([`Session`], [`SessionState`])
//! 3. **Connection handles**: the opaque "send an envelope" capability a
//!    participant holds ([`ConnectionHandle`])
//!
//! # Locking
//!
//! ```text
//! SessionStore lock ── guards the id → Session map only
//!     └─ Session lock ── guards participants + leaderboard of ONE session
//! ```
//!
//! The two levels are never held across each other for different
//! sessions, so there is no cross-session deadlock.

mod connection;
mod error;
mod participant;
mod session;
mod store;

pub use connection::ConnectionHandle;
pub use error::SessionError;
pub use participant::Participant;
pub use session::{Admission, LeaderboardEntry, Question, Session, SessionState};
pub use store::{SessionRepository, SessionStore};
