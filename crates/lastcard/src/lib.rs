//! # Lastcard
//!
//! A multiplayer "last card" game server. Clients connect over TCP and
//! exchange one JSON envelope per line: they create and join rooms, and
//! the room's creator starts a game that the server referees.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lastcard::LastcardServer;
//!
//! # async fn start() -> Result<(), lastcard::LastcardError> {
//! let server = LastcardServer::builder()
//!     .bind("127.0.0.1:9090")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod router;
mod server;

pub use config::{ServerConfig, ENV_BIND, ENV_IDLE_TIMEOUT_SECS, ENV_MAX_LINE};
pub use error::LastcardError;
pub use router::Router;
pub use server::{LastcardServer, LastcardServerBuilder};
