use std::io;

use crate::ConnectionId;

/// Errors raised while listening for, reading from, or writing to a
/// line connection.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("cannot listen on {addr}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("accepting a connection failed")]
    Accept(#[source] io::Error),

    #[error("reading from {conn} failed")]
    Read {
        conn: ConnectionId,
        #[source]
        source: io::Error,
    },

    /// Outbound data was not valid UTF-8 and cannot be framed as a line.
    #[error("outbound data for {0} is not UTF-8")]
    NotUtf8(ConnectionId),

    /// The writer for this connection has stopped; the peer is gone.
    #[error("{0} is closed")]
    Closed(ConnectionId),

    /// The peer sent a line longer than `limit` bytes. The framing is lost,
    /// so the connection should be dropped.
    #[error("line from {conn} exceeds {limit} bytes")]
    LineTooLong { conn: ConnectionId, limit: usize },

    #[error("listener shut down")]
    Shutdown,
}
