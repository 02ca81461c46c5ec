//! Error types for the room layer.

use lastcard_protocol::{PlayerId, RoomId};

/// Errors that can occur during room operations.
///
/// Each check runs before the room is modified, so an `Err` leaves the
/// room exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist, or was closed while the caller waited.
    #[error("room {0} not found")]
    NotFound(RoomId),

    #[error("room {0} is full")]
    RoomFull(RoomId),

    #[error("wrong password for room {0}")]
    InvalidPassword(RoomId),

    /// Only the creator may start the game.
    #[error("{player} did not create room {room}")]
    NotCreator { player: PlayerId, room: RoomId },

    #[error("a game needs at least {needed} players, room has {got}")]
    NotEnoughPlayers { needed: usize, got: usize },

    /// Requested room settings are out of range.
    #[error("invalid room settings: {0}")]
    InvalidConfig(String),

    #[error("room {0} already has a game in progress")]
    GameInProgress(RoomId),

    /// A player can be in at most one room at a time.
    #[error("player {0} already in room {1}")]
    AlreadyInRoom(PlayerId, RoomId),

    #[error("player {0} not in room {1}")]
    NotInRoom(PlayerId, RoomId),

    #[error("player {0} is not in any room")]
    NotInAnyRoom(PlayerId),
}

impl RoomError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "ROOM_NOT_FOUND",
            Self::RoomFull(_) => "ROOM_FULL",
            Self::InvalidPassword(_) => "INVALID_PASSWORD",
            Self::NotCreator { .. } => "NOT_CREATOR",
            Self::NotEnoughPlayers { .. } => "NOT_ENOUGH_PLAYERS",
            Self::InvalidConfig(_) => "INVALID_ROOM_CONFIG",
            Self::GameInProgress(_) => "GAME_IN_PROGRESS",
            Self::AlreadyInRoom(..) => "ALREADY_IN_ROOM",
            Self::NotInRoom(..) | Self::NotInAnyRoom(_) => "NOT_IN_ROOM",
        }
    }
}
