//! Newline-delimited TCP transport built on `tokio-util`'s `LinesCodec`.

use std::net::SocketAddr;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tokio_util::codec::{Framed, LinesCodec, LinesCodecError};
use tokio_util::sync::CancellationToken;

use crate::{Connection, ConnectionId, Outbox, Transport, TransportError};

/// Longest line accepted from a client unless configured otherwise.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024;

type LineFramed = Framed<TcpStream, LinesCodec>;

/// A TCP [`Transport`] that frames every connection as lines of text.
pub struct TcpLineTransport {
    listener: TcpListener,
    max_line_length: usize,
    next_id: u64,
    shutdown: CancellationToken,
}

impl TcpLineTransport {
    /// Binds a new line transport to the given address.
    pub async fn bind(
        addr: &str,
        max_line_length: usize,
    ) -> Result<Self, TransportError> {
        let listener =
            TcpListener::bind(addr)
                .await
                .map_err(|source| TransportError::Bind {
                    addr: addr.to_string(),
                    source,
                })?;
        tracing::info!(addr, "line transport listening");
        Ok(Self {
            listener,
            max_line_length,
            next_id: 1,
            shutdown: CancellationToken::new(),
        })
    }

    /// Returns the address the listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Returns a token that stops the accept loop when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }
}

impl Transport for TcpLineTransport {
    type Connection = LineConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        let (stream, peer) = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => return Err(TransportError::Shutdown),
            accepted = self.listener.accept() => {
                accepted.map_err(TransportError::Accept)?
            }
        };

        let id = ConnectionId::new(self.next_id);
        self.next_id += 1;
        tracing::debug!(%id, %peer, "accepted TCP connection");

        let framed = Framed::new(
            stream,
            LinesCodec::new_with_max_length(self.max_line_length),
        );
        let (sink, lines) = framed.split();
        let (outbox, queue) = Outbox::channel(id);
        let closed = CancellationToken::new();

        tokio::spawn(write_loop(id, sink, queue, closed.clone()));

        Ok(LineConnection {
            id,
            peer,
            max_line_length: self.max_line_length,
            lines: Mutex::new(lines),
            outbox,
            closed,
        })
    }

    async fn shutdown(&self) -> Result<(), Self::Error> {
        self.shutdown.cancel();
        Ok(())
    }
}

/// One accepted TCP connection.
///
/// Reading happens through [`Connection::recv`]; writing goes through the
/// connection's [`Outbox`], which a dedicated writer task drains.
pub struct LineConnection {
    id: ConnectionId,
    peer: SocketAddr,
    max_line_length: usize,
    lines: Mutex<SplitStream<LineFramed>>,
    outbox: Outbox,
    closed: CancellationToken,
}

impl LineConnection {
    /// Returns a handle for queueing lines to this connection.
    pub fn outbox(&self) -> Outbox {
        self.outbox.clone()
    }

    /// The remote address of the peer.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

impl Connection for LineConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        let line = String::from_utf8(data.to_vec())
            .map_err(|_| TransportError::NotUtf8(self.id))?;
        self.outbox.send(line)
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        let mut lines = self.lines.lock().await;
        tokio::select! {
            biased;
            _ = self.closed.cancelled() => Ok(None),
            next = lines.next() => match next {
                Some(Ok(line)) => Ok(Some(line.into_bytes())),
                Some(Err(LinesCodecError::MaxLineLengthExceeded)) => {
                    Err(TransportError::LineTooLong {
                        conn: self.id,
                        limit: self.max_line_length,
                    })
                }
                Some(Err(LinesCodecError::Io(e))) => {
                    Err(TransportError::Read { conn: self.id, source: e })
                }
                None => Ok(None),
            },
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.closed.cancel();
        Ok(())
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}

/// Drains the outbound queue into the socket until the connection is
/// closed, the peer goes away, or every [`Outbox`] handle is dropped.
async fn write_loop(
    id: ConnectionId,
    mut sink: SplitSink<LineFramed, String>,
    mut queue: mpsc::UnboundedReceiver<String>,
    closed: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = closed.cancelled() => {
                // Flush whatever was queued before the close.
                while let Ok(line) = queue.try_recv() {
                    if sink.feed(line).await.is_err() {
                        break;
                    }
                }
                break;
            }
            next = queue.recv() => match next {
                Some(line) => {
                    if let Err(e) = sink.send(line).await {
                        tracing::debug!(%id, error = %e, "write failed");
                        break;
                    }
                }
                None => break,
            },
        }
    }

    let _ = sink.close().await;
    // Stop the reader too: a connection we can't write to is dead.
    closed.cancel();
    tracing::debug!(%id, "writer stopped");
}
