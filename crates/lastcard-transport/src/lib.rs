//! Line-oriented networking for the Lastcard server.
//!
//! A [`Transport`] hands out [`Connection`]s; [`TcpLineTransport`] is the
//! only implementation and frames each TCP stream as newline-terminated
//! text. Reading is done by whoever owns the connection. Writing goes
//! through an [`Outbox`], which a per-connection task drains into the
//! socket, so pushing to a slow peer never blocks the caller.

#![allow(async_fn_in_trait)]

mod error;
mod outbox;
mod tcp;

pub use error::TransportError;
pub use outbox::Outbox;
pub use tcp::{DEFAULT_MAX_LINE_LENGTH, LineConnection, TcpLineTransport};

use std::fmt;

/// Identifies one accepted connection for as long as the process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Source of incoming connections.
pub trait Transport: Send + Sync + 'static {
    type Connection: Connection;
    type Error: std::error::Error + Send + Sync;

    /// Resolves with the next peer, or an error once the transport has
    /// been shut down.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;

    /// Stops accepting. Connections already handed out are unaffected.
    async fn shutdown(&self) -> Result<(), Self::Error>;
}

/// One peer, exchanging whole lines (without the trailing newline).
pub trait Connection: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync;

    /// Queues a line for the peer. Returns before it hits the socket.
    async fn send(&self, line: &[u8]) -> Result<(), Self::Error>;

    /// Next line from the peer; `Ok(None)` at end of stream or after
    /// [`close`](Connection::close).
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    async fn close(&self) -> Result<(), Self::Error>;

    fn id(&self) -> ConnectionId;
}
