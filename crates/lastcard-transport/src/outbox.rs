//! The write side of a connection.
//!
//! An [`Outbox`] is a cheap, cloneable handle onto a connection's
//! outbound queue. Pushing a line never waits on the network: the
//! connection's writer task owns the socket and drains the queue.

use tokio::sync::mpsc;

use crate::{ConnectionId, TransportError};

/// Queue handle for sending lines to one connection.
#[derive(Debug, Clone)]
pub struct Outbox {
    conn_id: ConnectionId,
    tx: mpsc::UnboundedSender<String>,
}

impl Outbox {
    /// Creates an outbox and the receiving end of its queue.
    ///
    /// The transport hands the receiver to the connection's writer task.
    /// Tests can keep it and read what would have gone over the wire.
    pub fn channel(
        conn_id: ConnectionId,
    ) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { conn_id, tx }, rx)
    }

    /// The connection this outbox delivers to.
    pub fn connection_id(&self) -> ConnectionId {
        self.conn_id
    }

    /// Queues a line (without its trailing newline) for delivery.
    ///
    /// # Errors
    /// Returns [`TransportError::Closed`] if the writer has
    /// stopped, i.e. the peer is gone.
    pub fn send(&self, line: String) -> Result<(), TransportError> {
        self.tx
            .send(line)
            .map_err(|_| TransportError::Closed(self.conn_id))
    }
}
