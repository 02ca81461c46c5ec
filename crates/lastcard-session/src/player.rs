//! A single player identity.

use lastcard_protocol::{PlayerId, RoomId};
use lastcard_transport::ConnectionId;

/// One connected player.
///
/// Identities are minted on a connection's first message and live
/// exactly as long as that connection. There is no login: the id and
/// display name are generated by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Sequential id, unique for the lifetime of the server.
    pub id: PlayerId,

    /// Generated display name (`Player<id>`).
    pub name: String,

    /// Lobby ready flag. Informational only; starting a game doesn't
    /// require it. Cleared whenever the player changes room.
    pub ready: bool,

    /// The room the player is currently in, if any.
    pub room: Option<RoomId>,

    /// The connection this identity is bound to.
    pub connection: ConnectionId,
}

impl Player {
    /// Creates a fresh identity bound to `connection`, not in any room.
    pub fn new(id: PlayerId, connection: ConnectionId) -> Self {
        Self {
            id,
            name: format!("Player{}", id.0),
            ready: false,
            room: None,
            connection,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_player_has_generated_name_and_no_room() {
        let player = Player::new(PlayerId(12), ConnectionId::new(3));

        assert_eq!(player.name, "Player12");
        assert_eq!(player.room, None);
        assert!(!player.ready);
        assert_eq!(player.connection, ConnectionId::new(3));
    }
}
