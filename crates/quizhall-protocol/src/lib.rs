//! Wire protocol for Quizhall.
//!
//! This crate defines the "language" that quiz clients and the server speak:
//!
//! - **Identifiers** ([`SessionId`], [`ParticipantId`], [`QuestionId`]).
//! - **Envelopes** ([`ClientMessage`], [`ServerMessage`]): every message on
//!   the wire is `{ "type": <tag>, "payload": <type-specific> }`.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how envelopes are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Protocol (envelope) → Session / Engine (quiz state)
//! ```
//!
//! The protocol layer doesn't know about connections or sessions; it only
//! knows how to name things and how to serialize messages.

mod codec;
mod envelope;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use envelope::{ClientMessage, ServerMessage};
pub use error::ProtocolError;
pub use types::{
    AnswerPayload, ErrorPayload, JoinPayload, JoinedPayload, LeaderboardRow,
    ParticipantId, QuestionId, QuestionView, QuizView, ResultPayload,
    SessionId, REDACTED_ANSWER,
};
