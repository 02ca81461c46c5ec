//! Unified error type for the Lastcard server.

use lastcard_game::GameError;
use lastcard_protocol::ProtocolError;
use lastcard_room::RoomError;
use lastcard_session::PlayerError;
use lastcard_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant lets `?` convert layer errors
/// automatically, so router handlers can mix room, game and player calls.
#[derive(Debug, thiserror::Error)]
pub enum LastcardError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Player(#[from] PlayerError),

    #[error(transparent)]
    Room(#[from] RoomError),

    #[error(transparent)]
    Game(#[from] GameError),

    /// A setting could not be read at startup.
    #[error("configuration error: {0}")]
    Config(String),
}

impl LastcardError {
    /// Machine-readable code sent to clients in an `ERROR` message.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Protocol(e) => e.code(),
            Self::Player(e) => e.code(),
            Self::Room(e) => e.code(),
            Self::Game(e) => e.code(),
            Self::Transport(_) | Self::Config(_) => "INTERNAL_ERROR",
        }
    }
}
