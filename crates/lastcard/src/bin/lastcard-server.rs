//! `lastcard-server`: runs the game server until Ctrl-C.
//!
//! Settings come from `LASTCARD_BIND`, `LASTCARD_IDLE_TIMEOUT_SECS` and
//! `LASTCARD_MAX_LINE`; log verbosity from `RUST_LOG` (default `info`).

use lastcard::{LastcardError, LastcardServer, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), LastcardError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let server = LastcardServer::builder().config(config).build().await?;
    tracing::info!(addr = ?server.local_addr().ok(), "listening");

    let shutdown = server.shutdown_token();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            return;
        }
        tracing::info!("Ctrl-C received, shutting down");
        shutdown.cancel();
    });

    server.run().await
}
