//! Error types for the player directory.

use lastcard_protocol::PlayerId;

/// Errors that can occur when looking up players.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlayerError {
    /// No player with this id is known. Usually a player who has
    /// already disconnected.
    #[error("player {0} not found")]
    NotFound(PlayerId),
}

impl PlayerError {
    /// Machine-readable code sent to clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "USER_NOT_FOUND",
        }
    }
}
