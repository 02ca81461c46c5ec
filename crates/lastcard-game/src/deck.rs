//! Deck construction and the draw/discard piles.
//!
//! Both piles are `Vec`s whose last element is the top: drawing pops
//! from the draw pile, playing pushes onto the discard pile. Cards are
//! only ever moved between the piles and the hands, never created or
//! dropped, so the whole table always adds up to [`DECK_SIZE`] cards.

use lastcard_protocol::{Card, CardColor, CardKind};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::GameError;

/// Number of cards in a standard deck.
pub const DECK_SIZE: usize = 108;

/// Builds the 108 cards of a standard deck in a fixed order.
///
/// Per suit color: one 0, two each of 1-9, two each of skip, reverse and
/// draw-two (25 cards). Then four wilds and four wild-draw-fours. The
/// second copy of a card gets a `_2` suffix on its id.
pub fn standard_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);

    for color in CardColor::SUITS {
        deck.push(Card::number(format!("{color}_NUMBER_0"), color, 0));
        for n in 1..=9 {
            let id = format!("{color}_NUMBER_{n}");
            deck.push(Card::number(format!("{id}_2"), color, n));
            deck.push(Card::number(id, color, n));
        }
        for kind in [CardKind::Skip, CardKind::Reverse, CardKind::DrawTwo] {
            let id = format!("{color}_{}", kind.as_str());
            deck.push(Card::action(format!("{id}_2"), color, kind));
            deck.push(Card::action(id, color, kind));
        }
    }

    for i in 1..=4 {
        deck.push(Card::wild(format!("WILD_{i}"), CardKind::Wild));
        deck.push(Card::wild(format!("WILD_DRAW_FOUR_{i}"), CardKind::WildDrawFour));
    }

    deck
}

/// Builds a standard deck and shuffles it with `rng`.
pub fn build_standard_deck<R: Rng + ?Sized>(rng: &mut R) -> Vec<Card> {
    let mut deck = standard_deck();
    deck.shuffle(rng);
    deck
}

// ---------------------------------------------------------------------------
// DeckPiles
// ---------------------------------------------------------------------------

/// The draw pile and the discard pile of one game.
#[derive(Debug, Clone)]
pub struct DeckPiles {
    draw: Vec<Card>,
    discard: Vec<Card>,
    rng: StdRng,
}

impl DeckPiles {
    /// A freshly shuffled deck with one card turned up on the discard pile.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_rng(&mut rand::rng()))
    }

    /// Same as [`DeckPiles::new`] but with a caller-supplied generator,
    /// so tests can replay the same deal from a seed.
    pub fn with_rng(mut rng: StdRng) -> Self {
        let mut draw = build_standard_deck(&mut rng);
        let first = draw.remove(0);
        Self {
            draw,
            discard: vec![first],
            rng,
        }
    }

    /// Builds piles from an arranged layout. The last element of each
    /// `Vec` is the top of that pile.
    ///
    /// # Errors
    /// [`GameError::EmptyDiscard`] if `discard` is empty: a game always
    /// has a card in play.
    pub fn from_piles(
        draw: Vec<Card>,
        discard: Vec<Card>,
        rng: StdRng,
    ) -> Result<Self, GameError> {
        if discard.is_empty() {
            return Err(GameError::EmptyDiscard);
        }
        Ok(Self { draw, discard, rng })
    }

    /// Takes the top card of the draw pile, reshuffling the discard pile
    /// (all but its top card) underneath first if the draw pile is empty.
    ///
    /// # Errors
    /// [`GameError::DeckExhausted`] if no card is left even after the
    /// reshuffle.
    pub fn draw(&mut self) -> Result<Card, GameError> {
        if self.draw.is_empty() {
            self.reshuffle();
        }
        self.draw.pop().ok_or(GameError::DeckExhausted)
    }

    /// Puts a card face up on the discard pile.
    pub fn play(&mut self, card: Card) {
        self.discard.push(card);
    }

    /// The card currently in play.
    ///
    /// # Errors
    /// [`GameError::EmptyDiscard`] if nothing has been placed yet.
    pub fn top_card(&self) -> Result<&Card, GameError> {
        self.discard.last().ok_or(GameError::EmptyDiscard)
    }

    /// How many cards can still be drawn, counting the ones a reshuffle
    /// would bring back.
    pub fn available(&self) -> usize {
        self.draw.len() + self.discard.len().saturating_sub(1)
    }

    pub fn draw_pile(&self) -> &[Card] {
        &self.draw
    }

    pub fn discard_pile(&self) -> &[Card] {
        &self.discard
    }

    fn reshuffle(&mut self) {
        let Some(top) = self.discard.pop() else {
            return;
        };
        self.draw.append(&mut self.discard);
        self.draw.shuffle(&mut self.rng);
        self.discard.push(top);
        tracing::debug!(cards = self.draw.len(), "reshuffled discard pile into draw pile");
    }
}

impl Default for DeckPiles {
    fn default() -> Self {
        Self::new()
    }
}
