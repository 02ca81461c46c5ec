//! Error types for the game layer.

use lastcard_protocol::{CardColor, PlayerId, RoomId};

/// Errors raised by the rules engine and the session registry.
///
/// Every rejection is raised before the session is touched, so an `Err`
/// always means nothing changed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("not your turn: {current} is to play")]
    NotYourTurn { player: PlayerId, current: PlayerId },

    #[error("card index {index} out of range for a hand of {hand_size}")]
    InvalidCardIndex { index: usize, hand_size: usize },

    #[error("{card} cannot be played on {top}")]
    IllegalPlay { card: String, top: String },

    /// Only the four suit colors can be chosen after a wild.
    #[error("{0} is not a color that can be chosen")]
    InvalidColor(CardColor),

    /// A wild card is on the table and its player must pick a color first.
    #[error("waiting for a color to be chosen")]
    AwaitingColorChoice,

    #[error("no color choice is pending")]
    UnexpectedColorChoice,

    #[error("the game is over")]
    GameFinished,

    #[error("{player} cannot declare last card holding {hand_size} cards")]
    DeclarationNotAllowed { player: PlayerId, hand_size: usize },

    #[error("{0} is not in this game")]
    PlayerNotInGame(PlayerId),

    #[error("a game needs at least {needed} players, got {got}")]
    NotEnoughPlayers { needed: usize, got: usize },

    #[error("not enough cards left to draw")]
    DeckExhausted,

    #[error("discard pile is empty")]
    EmptyDiscard,

    #[error("a game is already running in room {0}")]
    SessionAlreadyExists(RoomId),

    #[error("no game is running in room {0}")]
    NoSuchSession(RoomId),
}

impl GameError {
    /// Machine-readable code sent to clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotYourTurn { .. } => "NOT_YOUR_TURN",
            Self::InvalidCardIndex { .. } => "INVALID_CARD_INDEX",
            Self::IllegalPlay { .. } => "ILLEGAL_PLAY",
            Self::InvalidColor(_) => "INVALID_COLOR",
            Self::AwaitingColorChoice => "AWAITING_COLOR_CHOICE",
            Self::UnexpectedColorChoice => "UNEXPECTED_COLOR_CHOICE",
            Self::GameFinished => "GAME_FINISHED",
            Self::DeclarationNotAllowed { .. } => "DECLARATION_NOT_ALLOWED",
            Self::PlayerNotInGame(_) => "PLAYER_NOT_IN_GAME",
            Self::NotEnoughPlayers { .. } => "NOT_ENOUGH_PLAYERS",
            Self::DeckExhausted => "DECK_EXHAUSTED",
            Self::EmptyDiscard => "EMPTY_DISCARD",
            Self::SessionAlreadyExists(_) => "SESSION_ALREADY_EXISTS",
            Self::NoSuchSession(_) => "NO_SUCH_SESSION",
        }
    }
}
