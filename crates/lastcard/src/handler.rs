//! Per-connection handler: read lines, route them, clean up on exit.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Register the connection's outbox with the router
//!   2. Loop: receive a line (bounded by the idle timeout) and route it
//!   3. On close, error or timeout: leave the room and purge the identity

use std::sync::Arc;
use std::time::Duration;

use lastcard_protocol::Codec;
use lastcard_transport::{Connection, ConnectionId, LineConnection, TransportError};

use crate::Router;

/// Drop guard that disconnects the player when the handler exits.
///
/// This ensures cleanup happens even if the handler panics. Since `Drop`
/// is synchronous, the async cleanup runs on a spawned task.
struct DisconnectGuard<C: Codec> {
    conn_id: ConnectionId,
    router: Arc<Router<C>>,
}

impl<C: Codec> Drop for DisconnectGuard<C> {
    fn drop(&mut self) {
        let conn_id = self.conn_id;
        let router = Arc::clone(&self.router);
        tokio::spawn(async move {
            router.disconnect(conn_id).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: LineConnection,
    router: Arc<Router<C>>,
    idle_timeout: Duration,
) {
    let conn_id = conn.id();
    tracing::info!(%conn_id, peer = %conn.peer_addr(), "client connected");

    router.attach(conn.outbox());
    let _guard = DisconnectGuard {
        conn_id,
        router: Arc::clone(&router),
    };

    loop {
        let line = match tokio::time::timeout(idle_timeout, conn.recv()).await {
            Ok(Ok(Some(line))) => line,
            Ok(Ok(None)) => {
                tracing::info!(%conn_id, "connection closed");
                break;
            }
            Ok(Err(TransportError::LineTooLong { limit, .. })) => {
                tracing::info!(%conn_id, limit, "line too long, dropping connection");
                break;
            }
            Ok(Err(e)) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
            Err(_) => {
                tracing::info!(%conn_id, timeout_secs = idle_timeout.as_secs(), "connection idle, dropping");
                break;
            }
        };

        router.route(conn_id, &line).await;
    }

    let _ = conn.close().await;
    // _guard drops here and the disconnect cleanup fires.
}
