//! `QuizServer` builder and accept loop.
//!
//! This is the entry point for running a quiz server. It ties together all
//! the layers: transport → protocol → engine → session.

use std::sync::Arc;

use quizhall_engine::{QuizConfig, QuizEngine};
use quizhall_protocol::{Codec, JsonCodec};
use quizhall_session::SessionRepository;
use quizhall_transport::{PendingConnection, Transport, TransportError, WebSocketTransport};

use crate::QuizhallError;
use crate::handler::handle_connection;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so every connection task shares one engine. All
/// interior mutability lives in the repository and the sessions it holds.
pub(crate) struct ServerState<R: SessionRepository, C: Codec> {
    pub(crate) engine: QuizEngine<R>,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a quiz server.
///
/// # Example
///
/// ```rust,ignore
/// use quizhall::prelude::*;
///
/// let server = QuizServer::builder()
///     .bind("0.0.0.0:8080")
///     .config(QuizConfig::default())
///     .build(SessionStore::new())
///     .await?;
/// server.run().await
/// ```
pub struct QuizServerBuilder {
    bind_addr: String,
    config: QuizConfig,
}

impl QuizServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            config: QuizConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the scoring and validation configuration.
    pub fn config(mut self, config: QuizConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds the listener and builds the server over `repository`.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`, which is what browser
    /// clients speak.
    ///
    /// # Errors
    /// [`QuizhallError::Transport`] if the address cannot be bound.
    pub async fn build<R: SessionRepository>(
        self,
        repository: R,
    ) -> Result<QuizServer<R, JsonCodec>, QuizhallError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            engine: QuizEngine::new(repository, self.config),
            codec: JsonCodec,
        });

        Ok(QuizServer { transport, state })
    }
}

impl Default for QuizServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound quiz server.
///
/// Seed sessions through [`engine()`](Self::engine), then call
/// [`run()`](Self::run) to start accepting connections.
pub struct QuizServer<R: SessionRepository, C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<R, C>>,
}

impl<R, C> QuizServer<R, C>
where
    R: SessionRepository,
    C: Codec + Clone,
{
    /// Creates a new builder.
    pub fn builder() -> QuizServerBuilder {
        QuizServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// The engine shared by every connection.
    pub fn engine(&self) -> &QuizEngine<R> {
        &self.state.engine
    }

    /// Runs the accept loop.
    ///
    /// Each accepted stream gets its own task, which performs the WebSocket
    /// upgrade and then runs the connection handler. A slow or failed
    /// upgrade only affects that one stream. Runs until the process is
    /// terminated or the future is dropped.
    pub async fn run(mut self) -> Result<(), QuizhallError> {
        match self.local_addr() {
            Ok(addr) => tracing::info!(%addr, "quiz server running"),
            Err(_) => tracing::info!("quiz server running"),
        }

        loop {
            match self.transport.accept().await {
                Ok(pending) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        let peer = pending.peer_addr();
                        match pending.upgrade().await {
                            Ok(conn) => handle_connection::<R, C>(conn, state).await,
                            Err(TransportError::UpgradeFailed(reason)) => {
                                tracing::debug!(%peer, %reason, "websocket upgrade failed");
                            }
                            Err(e) => {
                                tracing::debug!(%peer, error = %e, "websocket upgrade failed");
                            }
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
