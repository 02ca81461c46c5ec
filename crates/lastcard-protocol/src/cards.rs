//! Card value types.
//!
//! A [`Card`] is an immutable value: once the deck is built, cards only
//! move between piles and hands, they never change. Cards live in the
//! protocol crate because they travel on the wire (the top card in every
//! game snapshot, and each player's private hand).

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CardColor
// ---------------------------------------------------------------------------

/// The color of a card.
///
/// Wild-type cards carry [`CardColor::Wild`]; the four suit colors are
/// the only ones a player may pick after playing a wild.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardColor {
    Red,
    Blue,
    Green,
    Yellow,
    Wild,
}

impl CardColor {
    /// The four suit colors, in deck-building order.
    pub const SUITS: [CardColor; 4] =
        [Self::Red, Self::Blue, Self::Green, Self::Yellow];

    /// Returns `true` for the four suit colors, `false` for `Wild`.
    pub fn is_suit(self) -> bool {
        !matches!(self, Self::Wild)
    }

    /// Wire name, e.g. `"RED"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Red => "RED",
            Self::Blue => "BLUE",
            Self::Green => "GREEN",
            Self::Yellow => "YELLOW",
            Self::Wild => "WILD",
        }
    }
}

impl fmt::Display for CardColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CardKind
// ---------------------------------------------------------------------------

/// What a card does when played. Serialized under the `type` key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardKind {
    Number,
    Skip,
    Reverse,
    DrawTwo,
    Wild,
    WildDrawFour,
}

impl CardKind {
    /// Wild and wild-draw-four are always playable and need a color choice.
    pub fn is_wild(self) -> bool {
        matches!(self, Self::Wild | Self::WildDrawFour)
    }

    /// Wire name, e.g. `"DRAW_TWO"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Number => "NUMBER",
            Self::Skip => "SKIP",
            Self::Reverse => "REVERSE",
            Self::DrawTwo => "DRAW_TWO",
            Self::Wild => "WILD",
            Self::WildDrawFour => "WILD_DRAW_FOUR",
        }
    }
}

// ---------------------------------------------------------------------------
// Card
// ---------------------------------------------------------------------------

/// A single card.
///
/// `id` is unique within a deck (`"RED_NUMBER_5"`, `"RED_NUMBER_5_2"`,
/// `"WILD_0"`, ...), so two cards with the same face are still distinct
/// values. `number` is present only for number cards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub color: CardColor,
    #[serde(rename = "type")]
    pub kind: CardKind,
    #[serde(default)]
    pub number: Option<u8>,
}

impl Card {
    /// A number card of the given suit.
    pub fn number(id: impl Into<String>, color: CardColor, number: u8) -> Self {
        Self {
            id: id.into(),
            color,
            kind: CardKind::Number,
            number: Some(number),
        }
    }

    /// A colored action card (skip, reverse, draw-two).
    pub fn action(id: impl Into<String>, color: CardColor, kind: CardKind) -> Self {
        Self {
            id: id.into(),
            color,
            kind,
            number: None,
        }
    }

    /// A wild or wild-draw-four card.
    pub fn wild(id: impl Into<String>, kind: CardKind) -> Self {
        Self {
            id: id.into(),
            color: CardColor::Wild,
            kind,
            number: None,
        }
    }

    pub fn is_wild(&self) -> bool {
        self.kind.is_wild()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, self.number) {
            (CardKind::Number, Some(n)) => write!(f, "{} {}", self.color, n),
            (kind, _) if kind.is_wild() => f.write_str(kind.as_str()),
            (kind, _) => write!(f, "{} {}", self.color, kind.as_str()),
        }
    }
}
