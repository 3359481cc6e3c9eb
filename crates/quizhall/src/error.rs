//! Unified error type for Quizhall.

use quizhall_engine::EngineError;
use quizhall_protocol::ProtocolError;
use quizhall_session::SessionError;
use quizhall_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impl, so
/// `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum QuizhallError {
    /// A transport-level error (bind, accept, upgrade, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session lookup or connection-handle error.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A join or answer workflow error.
    #[error(transparent)]
    Engine(#[from] EngineError),
}
