//! Room lifecycle for Lastcard.
//!
//! Rooms are lobbies: players gather in one, the creator starts a game,
//! and the room tracks whether that game is running.
//!
//! # Key types
//!
//! - [`Room`]: membership, password, capacity, creator and status
//! - [`RoomDirectory`]: creates, locks, lists and removes rooms
//! - [`RoomConfig`]: capacity limits and the minimum to start
//! - [`RoomError`]: every way a room operation can be refused

mod config;
mod directory;
mod error;
mod room;

pub use config::RoomConfig;
pub use directory::RoomDirectory;
pub use error::RoomError;
pub use lastcard_protocol::RoomStatus;
pub use room::{Departure, Member, Room};
