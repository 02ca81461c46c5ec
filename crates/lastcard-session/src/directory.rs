//! The player directory: identities and connection bindings.
//!
//! # Concurrency note
//!
//! Unlike a single-owner registry, the directory is shared by every
//! connection task at once, so both tables are `DashMap`s and the id
//! counter is atomic. Each method is a single map operation or a short
//! sequence on one key; there is no lock held across calls.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use lastcard_protocol::{PlayerId, RoomId};
use lastcard_transport::ConnectionId;

use crate::{Player, PlayerError};

/// Tracks every connected player and which connection they are on.
///
/// ```text
/// first message --> resolve_or_mint() --> [bound] --> unbind() --> gone
///                        |                    ^
///                        +-- already bound ---+
/// ```
#[derive(Debug)]
pub struct PlayerDirectory {
    /// All players, keyed by id.
    players: DashMap<PlayerId, Player>,

    /// Live connection -> player. Kept in sync with `players`.
    bindings: DashMap<ConnectionId, PlayerId>,

    /// Next id to hand out. Starts at 1.
    next_id: AtomicU64,
}

impl PlayerDirectory {
    pub fn new() -> Self {
        Self {
            players: DashMap::new(),
            bindings: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Returns the player bound to `conn`, minting and binding a new one
    /// if the connection has none yet. The flag is `true` when minted.
    pub fn resolve_or_mint(&self, conn: ConnectionId) -> (Player, bool) {
        if let Some(player) = self.resolve(conn) {
            return (player, false);
        }

        let id = PlayerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let player = Player::new(id, conn);
        self.players.insert(id, player.clone());
        self.bindings.insert(conn, id);

        tracing::info!(player_id = %id, conn_id = %conn, "player identity minted");
        (player, true)
    }

    /// The player bound to `conn`, if any.
    pub fn resolve(&self, conn: ConnectionId) -> Option<Player> {
        let id = *self.bindings.get(&conn)?;
        self.players.get(&id).map(|p| p.clone())
    }

    /// # Errors
    /// [`PlayerError::NotFound`] if the player is gone.
    pub fn get(&self, id: PlayerId) -> Result<Player, PlayerError> {
        self.players
            .get(&id)
            .map(|p| p.clone())
            .ok_or(PlayerError::NotFound(id))
    }

    /// The connection `id` is bound to.
    pub fn connection_of(&self, id: PlayerId) -> Option<ConnectionId> {
        self.players.get(&id).map(|p| p.connection)
    }

    /// Records which room the player is in (or `None` after leaving).
    /// Changing rooms clears the ready flag.
    pub fn set_room(&self, id: PlayerId, room: Option<RoomId>) -> Result<(), PlayerError> {
        let mut player = self.players.get_mut(&id).ok_or(PlayerError::NotFound(id))?;
        if player.room != room {
            player.ready = false;
        }
        player.room = room;
        Ok(())
    }

    pub fn set_ready(&self, id: PlayerId, ready: bool) -> Result<(), PlayerError> {
        let mut player = self.players.get_mut(&id).ok_or(PlayerError::NotFound(id))?;
        player.ready = ready;
        Ok(())
    }

    /// Removes the binding for `conn` and purges its player. Returns the
    /// player as it was, so the caller can clean up its room.
    pub fn unbind(&self, conn: ConnectionId) -> Option<Player> {
        let (_, id) = self.bindings.remove(&conn)?;
        let (_, player) = self.players.remove(&id)?;
        tracing::info!(player_id = %id, conn_id = %conn, "player identity released");
        Some(player)
    }

    /// Number of players currently known.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

impl Default for PlayerDirectory {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================
