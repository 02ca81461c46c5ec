//! The rules engine for one game.
//!
//! A [`GameSession`] is a small state machine:
//!
//! ```text
//!                play wild, no color
//!   WaitingTurn ---------------------> ChoosingColor
//!       ^  |                                 |
//!       |  | play / draw                     | choose_color
//!       +--+  <------------------------------+
//!       |
//!       | a play empties the actor's hand
//!       v
//!    Finished
//! ```
//!
//! Every operation validates first and mutates second. When a call
//! returns `Err`, the hands, piles, turn and phase are exactly as they
//! were, including when the deck would run dry halfway through.

use std::collections::BTreeMap;

use lastcard_protocol::{
    Card, CardColor, CardKind, Direction, GamePhase, GameSnapshot, PlayerId,
    PlayerSummary, RoomId,
};

use crate::{DeckPiles, GameConfig, GameError, PlayerHand};

/// Fewest players a game can be dealt for.
pub const MIN_PLAYERS: usize = 2;

/// How a finished game ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOutcome {
    pub winner: PlayerId,
    pub winner_name: String,
    /// Only the winner appears, credited with the points left in every
    /// other hand.
    pub scores: BTreeMap<PlayerId, u32>,
}

/// Everything the router sends out after an action: the public
/// snapshot, each player's private hand, and the result once the game
/// is over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    pub snapshot: GameSnapshot,
    pub hands: Vec<(PlayerId, Vec<Card>)>,
    pub outcome: Option<GameOutcome>,
}

/// One game in one room.
#[derive(Debug, Clone)]
pub struct GameSession {
    room_id: RoomId,
    config: GameConfig,
    piles: DeckPiles,
    /// Seats in turn order.
    hands: Vec<PlayerHand>,
    current: usize,
    direction: Direction,
    phase: GamePhase,
    chosen_color: Option<CardColor>,
}

impl GameSession {
    /// Shuffles a fresh deck and deals `config.hand_size` cards to each
    /// player. Turn order follows `players`; the first one starts.
    pub fn new(
        room_id: RoomId,
        players: &[(PlayerId, String)],
        config: GameConfig,
    ) -> Result<Self, GameError> {
        Self::deal(room_id, players, config, DeckPiles::new())
    }

    /// Deals from the given piles instead of a fresh shuffle.
    pub fn deal(
        room_id: RoomId,
        players: &[(PlayerId, String)],
        config: GameConfig,
        mut piles: DeckPiles,
    ) -> Result<Self, GameError> {
        if players.len() < MIN_PLAYERS {
            return Err(GameError::NotEnoughPlayers {
                needed: MIN_PLAYERS,
                got: players.len(),
            });
        }
        if piles.available() < players.len() * config.hand_size {
            return Err(GameError::DeckExhausted);
        }

        let mut hands = Vec::with_capacity(players.len());
        for (id, name) in players {
            let mut hand = PlayerHand::new(*id, name.clone());
            for _ in 0..config.hand_size {
                hand.add(piles.draw()?);
            }
            hands.push(hand);
        }

        Self::from_table(room_id, hands, piles, config)
    }

    /// Resumes play from an arranged table: hands already dealt, first
    /// seat to act, clockwise, nothing pending.
    pub fn from_table(
        room_id: RoomId,
        hands: Vec<PlayerHand>,
        piles: DeckPiles,
        config: GameConfig,
    ) -> Result<Self, GameError> {
        if hands.len() < MIN_PLAYERS {
            return Err(GameError::NotEnoughPlayers {
                needed: MIN_PLAYERS,
                got: hands.len(),
            });
        }
        Ok(Self {
            room_id,
            config,
            piles,
            hands,
            current: 0,
            direction: Direction::Clockwise,
            phase: GamePhase::WaitingTurn,
            chosen_color: None,
        })
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// The turn holder.
    pub fn current_player(&self) -> PlayerId {
        self.hands[self.current].player_id()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn chosen_color(&self) -> Option<CardColor> {
        self.chosen_color
    }

    pub fn top_card(&self) -> Result<&Card, GameError> {
        self.piles.top_card()
    }

    pub fn piles(&self) -> &DeckPiles {
        &self.piles
    }

    /// Seats in turn order.
    pub fn hands(&self) -> &[PlayerHand] {
        &self.hands
    }

    pub fn hand(&self, player: PlayerId) -> Option<&PlayerHand> {
        self.hands.iter().find(|h| h.player_id() == player)
    }

    pub fn is_finished(&self) -> bool {
        self.phase == GamePhase::Finished
    }

    // -----------------------------------------------------------------------
    // Rules
    // -----------------------------------------------------------------------

    /// Whether `card` may be played on the current top card.
    ///
    /// Any card of the top card's kind matches, so a number goes on any
    /// number.
    pub fn can_play(&self, card: &Card) -> Result<bool, GameError> {
        let top = self.piles.top_card()?;
        Ok(card.is_wild()
            || self.chosen_color == Some(card.color)
            || (top.is_wild() && self.chosen_color.is_none())
            || card.color == top.color
            || card.kind == top.kind)
    }

    /// Plays the card at `index` from `player`'s hand.
    ///
    /// A wild played without `chosen_color` leaves the game in
    /// [`GamePhase::ChoosingColor`] until [`GameSession::choose_color`].
    pub fn play_card(
        &mut self,
        player: PlayerId,
        index: usize,
        chosen_color: Option<CardColor>,
    ) -> Result<(), GameError> {
        self.ensure_not_finished()?;
        if self.phase == GamePhase::ChoosingColor {
            return Err(GameError::AwaitingColorChoice);
        }
        let seat = self.ensure_turn(player)?;

        let hand = &self.hands[seat];
        let card = hand
            .cards()
            .get(index)
            .ok_or(GameError::InvalidCardIndex {
                index,
                hand_size: hand.len(),
            })?
            .clone();
        if !self.can_play(&card)? {
            return Err(GameError::IllegalPlay {
                card: card.to_string(),
                top: self.piles.top_card()?.to_string(),
            });
        }
        if card.is_wild() {
            if let Some(color) = chosen_color {
                ensure_choosable(color)?;
            }
        }

        let penalty = if hand.len() == 2 && !hand.has_declared() {
            self.config.penalty_cards
        } else {
            0
        };
        let deferred = card.is_wild() && chosen_color.is_none();
        let effect = if deferred { 0 } else { forced_draws(card.kind) };
        self.ensure_available(penalty + effect)?;

        // Validation done; nothing below can fail.
        if penalty > 0 {
            tracing::debug!(room_id = %self.room_id, %player, penalty, "last card not declared");
            self.draw_into(seat, penalty)?;
        }
        let played = self.hands[seat].remove(index)?;
        self.piles.play(played);

        if card.is_wild() {
            match chosen_color {
                Some(color) => self.chosen_color = Some(color),
                None => {
                    self.phase = GamePhase::ChoosingColor;
                    return Ok(());
                }
            }
        } else {
            self.chosen_color = None;
        }

        self.resolve(seat, card.kind)
    }

    /// Picks the color for the wild card just played, then applies its
    /// effect and passes the turn.
    pub fn choose_color(
        &mut self,
        player: PlayerId,
        color: CardColor,
    ) -> Result<(), GameError> {
        self.ensure_not_finished()?;
        if self.phase != GamePhase::ChoosingColor {
            return Err(GameError::UnexpectedColorChoice);
        }
        let seat = self.ensure_turn(player)?;
        ensure_choosable(color)?;
        let kind = self.piles.top_card()?.kind;
        self.ensure_available(forced_draws(kind))?;

        self.chosen_color = Some(color);
        self.resolve(seat, kind)
    }

    /// The turn holder draws one card and the turn passes.
    pub fn draw_card(&mut self, player: PlayerId) -> Result<(), GameError> {
        self.ensure_not_finished()?;
        if self.phase == GamePhase::ChoosingColor {
            return Err(GameError::AwaitingColorChoice);
        }
        let seat = self.ensure_turn(player)?;
        self.ensure_available(1)?;

        self.draw_into(seat, 1)?;
        self.advance();
        self.phase = GamePhase::WaitingTurn;
        Ok(())
    }

    /// Declares "last card" for `player`. Allowed at any time, in or out
    /// of turn, as long as the hand holds exactly two cards.
    pub fn declare_last_card(&mut self, player: PlayerId) -> Result<(), GameError> {
        self.ensure_not_finished()?;
        let seat = self.seat_of(player)?;
        self.hands[seat].declare()
    }

    /// Scores a finished game. Empty until the game is over.
    pub fn calculate_scores(&self) -> BTreeMap<PlayerId, u32> {
        self.outcome().map(|o| o.scores).unwrap_or_default()
    }

    /// The winner and scores, once the game is over.
    pub fn outcome(&self) -> Option<GameOutcome> {
        if !self.is_finished() {
            return None;
        }
        let winner = self.hands.iter().find(|h| h.is_empty())?;
        let total = self
            .hands
            .iter()
            .filter(|h| h.player_id() != winner.player_id())
            .map(PlayerHand::score)
            .sum();
        Some(GameOutcome {
            winner: winner.player_id(),
            winner_name: winner.name().to_string(),
            scores: BTreeMap::from([(winner.player_id(), total)]),
        })
    }

    /// The public state of the table.
    pub fn snapshot(&self) -> Result<GameSnapshot, GameError> {
        let players = self
            .hands
            .iter()
            .map(|h| {
                let summary = PlayerSummary {
                    name: h.name().to_string(),
                    card_count: h.len(),
                    has_declared_uno: h.has_declared(),
                };
                (h.player_id(), summary)
            })
            .collect();

        Ok(GameSnapshot {
            room_id: self.room_id,
            players,
            current_card: self.piles.top_card()?.clone(),
            current_player_id: self.current_player(),
            direction: self.direction,
            game_phase: self.phase,
            chosen_color: self.chosen_color,
        })
    }

    /// Snapshot, private hands and outcome in one consistent read.
    pub fn view(&self) -> Result<TableView, GameError> {
        Ok(TableView {
            snapshot: self.snapshot()?,
            hands: self
                .hands
                .iter()
                .map(|h| (h.player_id(), h.cards().to_vec()))
                .collect(),
            outcome: self.outcome(),
        })
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn seat_of(&self, player: PlayerId) -> Result<usize, GameError> {
        self.hands
            .iter()
            .position(|h| h.player_id() == player)
            .ok_or(GameError::PlayerNotInGame(player))
    }

    fn ensure_turn(&self, player: PlayerId) -> Result<usize, GameError> {
        let seat = self.seat_of(player)?;
        if seat != self.current {
            return Err(GameError::NotYourTurn {
                player,
                current: self.current_player(),
            });
        }
        Ok(seat)
    }

    fn ensure_not_finished(&self) -> Result<(), GameError> {
        if self.is_finished() {
            return Err(GameError::GameFinished);
        }
        Ok(())
    }

    fn ensure_available(&self, draws: usize) -> Result<(), GameError> {
        if draws > self.piles.available() {
            return Err(GameError::DeckExhausted);
        }
        Ok(())
    }

    fn draw_into(&mut self, seat: usize, count: usize) -> Result<(), GameError> {
        for _ in 0..count {
            let card = self.piles.draw()?;
            self.hands[seat].add(card);
        }
        Ok(())
    }

    /// Applies the played card's effect, then either ends the game or
    /// hands the turn on.
    fn resolve(&mut self, actor: usize, kind: CardKind) -> Result<(), GameError> {
        self.apply_effect(kind)?;

        if self.hands[actor].is_empty() {
            self.phase = GamePhase::Finished;
            tracing::info!(
                room_id = %self.room_id,
                winner = %self.hands[actor].player_id(),
                "game finished"
            );
            return Ok(());
        }

        self.advance();
        self.phase = GamePhase::WaitingTurn;
        Ok(())
    }

    fn apply_effect(&mut self, kind: CardKind) -> Result<(), GameError> {
        match kind {
            CardKind::Skip => self.advance(),
            CardKind::Reverse => {
                self.direction = self.direction.reversed();
                if self.hands.len() == 2 {
                    self.advance();
                }
            }
            CardKind::DrawTwo | CardKind::WildDrawFour => {
                self.advance();
                self.draw_into(self.current, forced_draws(kind))?;
            }
            CardKind::Number | CardKind::Wild => {}
        }
        Ok(())
    }

    fn advance(&mut self) {
        let seats = self.hands.len();
        self.current = match self.direction {
            Direction::Clockwise => (self.current + 1) % seats,
            Direction::CounterClockwise => (self.current + seats - 1) % seats,
        };
    }
}

/// Cards the next player is forced to draw when `kind` resolves.
fn forced_draws(kind: CardKind) -> usize {
    match kind {
        CardKind::DrawTwo => 2,
        CardKind::WildDrawFour => 4,
        _ => 0,
    }
}

fn ensure_choosable(color: CardColor) -> Result<(), GameError> {
    if color.is_suit() {
        Ok(())
    } else {
        Err(GameError::InvalidColor(color))
    }
}
