//! Game rule settings.

/// Tunables for one game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    /// Cards dealt to each player at the start.
    pub hand_size: usize,

    /// Cards drawn by a player who plays down to one card without
    /// having declared "last card" first.
    pub penalty_cards: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            hand_size: 7,
            penalty_cards: 2,
        }
    }
}

impl GameConfig {
    pub fn with_hand_size(mut self, hand_size: usize) -> Self {
        self.hand_size = hand_size;
        self
    }

    pub fn with_penalty_cards(mut self, penalty_cards: usize) -> Self {
        self.penalty_cards = penalty_cards;
        self
    }
}
