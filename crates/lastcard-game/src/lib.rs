//! The card game itself: deck, hands, rules, and the registry that keeps
//! one running game per room.
//!
//! # Key types
//!
//! - [`DeckPiles`]: draw and discard piles with reshuffle-on-empty
//! - [`PlayerHand`]: held cards plus the "last card" declaration
//! - [`GameSession`]: the turn-order and rule-validation state machine
//! - [`SessionRegistry`]: sessions keyed by room, each behind its own lock
//! - [`GameError`]: every way an action can be refused
//!
//! This crate knows nothing about connections or lobbies. The server
//! decides who is in a room and asks the registry to deal them in.

mod config;
mod deck;
mod engine;
mod error;
mod hand;
mod registry;

pub use config::GameConfig;
pub use deck::{build_standard_deck, standard_deck, DeckPiles, DECK_SIZE};
pub use engine::{GameOutcome, GameSession, TableView, MIN_PLAYERS};
pub use error::GameError;
pub use hand::{card_points, PlayerHand};
pub use registry::SessionRegistry;
