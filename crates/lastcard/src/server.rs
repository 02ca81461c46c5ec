//! `LastcardServer` builder and accept loop.
//!
//! This is the entry point for running a Lastcard server. It ties
//! together all the layers: transport -> protocol -> router -> rooms and
//! games.

use std::sync::Arc;
use std::time::Duration;

use lastcard_game::GameConfig;
use lastcard_protocol::JsonCodec;
use lastcard_room::RoomConfig;
use lastcard_transport::{TcpLineTransport, Transport, TransportError};
use tokio_util::sync::CancellationToken;

use crate::handler::handle_connection;
use crate::{LastcardError, Router, ServerConfig};

/// Builder for configuring and starting a Lastcard server.
///
/// # Example
///
/// ```rust,no_run
/// use lastcard::LastcardServer;
///
/// # async fn start() -> Result<(), lastcard::LastcardError> {
/// let server = LastcardServer::builder()
///     .bind("0.0.0.0:9090")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct LastcardServerBuilder {
    config: ServerConfig,
    rooms: RoomConfig,
    game: GameConfig,
}

impl LastcardServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all server settings at once.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    pub fn max_line_length(mut self, max: usize) -> Self {
        self.config.max_line_length = max;
        self
    }

    pub fn room_config(mut self, rooms: RoomConfig) -> Self {
        self.rooms = rooms;
        self
    }

    pub fn game_config(mut self, game: GameConfig) -> Self {
        self.game = game;
        self
    }

    /// Binds the listener. The server doesn't accept anything until
    /// [`LastcardServer::run`] is called.
    pub async fn build(self) -> Result<LastcardServer, LastcardError> {
        let transport =
            TcpLineTransport::bind(&self.config.bind_addr, self.config.max_line_length).await?;
        let router = Arc::new(Router::new(self.rooms, self.game));

        Ok(LastcardServer {
            transport,
            router,
            idle_timeout: self.config.idle_timeout,
        })
    }
}

/// A bound Lastcard server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct LastcardServer {
    transport: TcpLineTransport,
    router: Arc<Router<JsonCodec>>,
    idle_timeout: Duration,
}

impl LastcardServer {
    /// Creates a new builder.
    pub fn builder() -> LastcardServerBuilder {
        LastcardServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Returns a token that stops [`run()`](Self::run) when cancelled.
    /// Connections already accepted keep running until they close.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.transport.shutdown_token()
    }

    /// Shared router, for inspecting rooms and players.
    pub fn router(&self) -> Arc<Router<JsonCodec>> {
        Arc::clone(&self.router)
    }

    /// Runs the accept loop, spawning a handler task per connection,
    /// until the shutdown token is cancelled.
    pub async fn run(mut self) -> Result<(), LastcardError> {
        tracing::info!(addr = ?self.transport.local_addr().ok(), "Lastcard server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let router = Arc::clone(&self.router);
                    tokio::spawn(handle_connection(conn, router, self.idle_timeout));
                }
                Err(TransportError::Shutdown) => {
                    tracing::info!("Lastcard server stopped accepting");
                    return Ok(());
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
