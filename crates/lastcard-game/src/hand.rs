//! A player's hand and its "last card" declaration.

use lastcard_protocol::{Card, CardKind, PlayerId};

use crate::GameError;

/// Points a card is worth when left in a losing hand.
pub fn card_points(card: &Card) -> u32 {
    match card.kind {
        CardKind::Number => card.number.map_or(0, u32::from),
        CardKind::Skip | CardKind::Reverse | CardKind::DrawTwo => 20,
        CardKind::Wild | CardKind::WildDrawFour => 50,
    }
}

/// The cards one player holds.
///
/// Order is display order only; clients address cards by index into it.
/// The declaration flag is cleared whenever the hand grows past two cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerHand {
    player_id: PlayerId,
    name: String,
    cards: Vec<Card>,
    declared: bool,
}

impl PlayerHand {
    pub fn new(player_id: PlayerId, name: impl Into<String>) -> Self {
        Self::with_cards(player_id, name, Vec::new())
    }

    pub fn with_cards(
        player_id: PlayerId,
        name: impl Into<String>,
        cards: Vec<Card>,
    ) -> Self {
        Self {
            player_id,
            name: name.into(),
            cards,
            declared: false,
        }
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn has_declared(&self) -> bool {
        self.declared
    }

    pub fn add(&mut self, card: Card) {
        self.cards.push(card);
        self.clear_stale_declaration();
    }

    /// Removes and returns the card at `index`.
    pub fn remove(&mut self, index: usize) -> Result<Card, GameError> {
        if index >= self.cards.len() {
            return Err(GameError::InvalidCardIndex {
                index,
                hand_size: self.cards.len(),
            });
        }
        let card = self.cards.remove(index);
        self.clear_stale_declaration();
        Ok(card)
    }

    /// Declares "last card". Only allowed holding exactly two cards.
    pub fn declare(&mut self) -> Result<(), GameError> {
        if self.cards.len() != 2 {
            return Err(GameError::DeclarationNotAllowed {
                player: self.player_id,
                hand_size: self.cards.len(),
            });
        }
        self.declared = true;
        Ok(())
    }

    /// Sum of [`card_points`] over the hand.
    pub fn score(&self) -> u32 {
        self.cards.iter().map(card_points).sum()
    }

    fn clear_stale_declaration(&mut self) {
        if self.cards.len() > 2 {
            self.declared = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use lastcard_protocol::CardColor;

    use super::*;

    fn red(n: u8) -> Card {
        Card::number(format!("RED_NUMBER_{n}"), CardColor::Red, n)
    }

    fn hand_of(cards: Vec<Card>) -> PlayerHand {
        PlayerHand::with_cards(PlayerId(1), "Player1", cards)
    }

    #[test]
    fn test_card_points_by_kind() {
        assert_eq!(card_points(&red(7)), 7);
        assert_eq!(card_points(&red(0)), 0);
        assert_eq!(
            card_points(&Card::action("s", CardColor::Blue, CardKind::Skip)),
            20
        );
        assert_eq!(card_points(&Card::wild("w", CardKind::WildDrawFour)), 50);
    }

    #[test]
    fn test_declare_with_two_cards_succeeds() {
        let mut hand = hand_of(vec![red(1), red(2)]);
        hand.declare().unwrap();
        assert!(hand.has_declared());
    }

    #[test]
    fn test_declare_with_other_sizes_fails() {
        for size in [0, 1, 3, 7] {
            let mut hand = hand_of((0..size).map(|n| red(n as u8)).collect());
            let err = hand.declare().unwrap_err();
            assert_eq!(err.code(), "DECLARATION_NOT_ALLOWED");
            assert!(!hand.has_declared());
        }
    }

    #[test]
    fn test_add_past_two_cards_clears_declaration() {
        let mut hand = hand_of(vec![red(1), red(2)]);
        hand.declare().unwrap();

        hand.add(red(3));

        assert!(!hand.has_declared());
    }

    #[test]
    fn test_remove_down_to_one_keeps_declaration() {
        let mut hand = hand_of(vec![red(1), red(2)]);
        hand.declare().unwrap();

        let card = hand.remove(0).unwrap();

        assert_eq!(card, red(1));
        assert!(hand.has_declared());
    }

    #[test]
    fn test_remove_out_of_range_fails() {
        let mut hand = hand_of(vec![red(1)]);
        let err = hand.remove(1).unwrap_err();
        assert_eq!(
            err,
            GameError::InvalidCardIndex {
                index: 1,
                hand_size: 1
            }
        );
        assert_eq!(hand.len(), 1);
    }

    #[test]
    fn test_score_sums_all_cards() {
        let hand = hand_of(vec![
            red(9),
            Card::action("r", CardColor::Red, CardKind::Reverse),
            Card::wild("w", CardKind::Wild),
        ]);
        assert_eq!(hand.score(), 79);
    }
}
