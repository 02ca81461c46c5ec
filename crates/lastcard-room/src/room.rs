//! A single room: membership, password, capacity and status.
//!
//! A room moves through three statuses:
//!
//! ```text
//! Waiting --start--> InProgress --finish--> Finished
//!    ^                   |                      |
//!    +---member leaves---+                      |
//!                        ^                      |
//!                        +--------start---------+
//! ```
//!
//! Leaving an in-progress room aborts the game and puts the room back to
//! `Waiting`. Once the last member leaves the room is closed for good.

use lastcard_protocol::{LobbySnapshot, PlayerId, PlayerInfo, RoomId, RoomInfo, RoomStatus};

use crate::RoomError;

/// One member of a room, in join order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: PlayerId,
    pub name: String,
}

/// What a departure did to the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Departure {
    /// The room has no members left and is now closed.
    pub emptied: bool,

    /// A game was running and has been abandoned.
    pub interrupted_game: bool,

    /// Set when the creator left and the role passed to someone else.
    pub new_creator: Option<PlayerId>,
}

#[derive(Debug)]
pub struct Room {
    id: RoomId,
    name: String,
    password: Option<String>,
    capacity: usize,
    creator: PlayerId,
    status: RoomStatus,
    members: Vec<Member>,
    closed: bool,
}

impl Room {
    /// Creates a room with its creator as the first member. An empty
    /// password counts as no password.
    pub fn new(
        id: RoomId,
        name: impl Into<String>,
        password: Option<String>,
        capacity: usize,
        creator: PlayerId,
        creator_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            password: password.filter(|p| !p.is_empty()),
            capacity,
            creator,
            status: RoomStatus::Waiting,
            members: vec![Member {
                id: creator,
                name: creator_name.into(),
            }],
            closed: false,
        }
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn creator(&self) -> PlayerId {
        self.creator
    }

    pub fn status(&self) -> RoomStatus {
        self.status
    }

    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Member ids in join order. A copy, so it can be iterated after the
    /// room lock is released.
    pub fn member_ids(&self) -> Vec<PlayerId> {
        self.members.iter().map(|m| m.id).collect()
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        self.members.iter().any(|m| m.id == player)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= self.capacity
    }

    /// A closed room has lost its last member and is being removed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Adds `player` to the room.
    ///
    /// # Errors
    /// `NotFound` if closed, `AlreadyInRoom`, `GameInProgress`, `RoomFull`
    /// or `InvalidPassword`, checked in that order.
    pub fn join(
        &mut self,
        player: PlayerId,
        name: impl Into<String>,
        password: Option<&str>,
    ) -> Result<(), RoomError> {
        if self.closed {
            return Err(RoomError::NotFound(self.id));
        }
        if self.contains(player) {
            return Err(RoomError::AlreadyInRoom(player, self.id));
        }
        if self.status == RoomStatus::InProgress {
            return Err(RoomError::GameInProgress(self.id));
        }
        if self.is_full() {
            return Err(RoomError::RoomFull(self.id));
        }
        if let Some(expected) = &self.password {
            if password != Some(expected.as_str()) {
                return Err(RoomError::InvalidPassword(self.id));
            }
        }

        self.members.push(Member {
            id: player,
            name: name.into(),
        });
        tracing::debug!(room_id = %self.id, player_id = %player, members = self.members.len(), "member joined");
        Ok(())
    }

    /// Removes `player` from the room.
    ///
    /// If the creator leaves, the earliest remaining member becomes the
    /// creator. Leaving mid-game sends the room back to `Waiting`.
    pub fn leave(&mut self, player: PlayerId) -> Result<Departure, RoomError> {
        let position = self
            .members
            .iter()
            .position(|m| m.id == player)
            .ok_or(RoomError::NotInRoom(player, self.id))?;
        self.members.remove(position);

        let interrupted_game = self.status == RoomStatus::InProgress;
        let mut new_creator = None;

        if self.members.is_empty() {
            self.closed = true;
        } else {
            if interrupted_game {
                self.status = RoomStatus::Waiting;
            }
            if player == self.creator {
                self.creator = self.members[0].id;
                new_creator = Some(self.creator);
            }
        }

        tracing::debug!(room_id = %self.id, player_id = %player, members = self.members.len(), "member left");
        Ok(Departure {
            emptied: self.closed,
            interrupted_game,
            new_creator,
        })
    }

    /// Checks that `player` may start a game now and returns the seating
    /// order (join order) with display names. Does not change the room;
    /// call [`Room::mark_started`] once the game has been dealt.
    pub fn seating_for_start(
        &self,
        player: PlayerId,
        min_players: usize,
    ) -> Result<Vec<(PlayerId, String)>, RoomError> {
        if self.closed {
            return Err(RoomError::NotFound(self.id));
        }
        if player != self.creator {
            return Err(RoomError::NotCreator {
                player,
                room: self.id,
            });
        }
        if self.status == RoomStatus::InProgress {
            return Err(RoomError::GameInProgress(self.id));
        }
        if self.members.len() < min_players {
            return Err(RoomError::NotEnoughPlayers {
                needed: min_players,
                got: self.members.len(),
            });
        }
        Ok(self
            .members
            .iter()
            .map(|m| (m.id, m.name.clone()))
            .collect())
    }

    pub fn mark_started(&mut self) {
        self.status = RoomStatus::InProgress;
    }

    /// The game in this room ended with a winner.
    pub fn mark_finished(&mut self) {
        if self.status == RoomStatus::InProgress {
            self.status = RoomStatus::Finished;
        }
    }

    /// Summary for room listings.
    pub fn info(&self) -> RoomInfo {
        let creator_name = self
            .members
            .iter()
            .find(|m| m.id == self.creator)
            .map(|m| m.name.clone())
            .unwrap_or_default();

        RoomInfo {
            room_id: self.id,
            room_name: self.name.clone(),
            has_password: self.has_password(),
            max_players: self.capacity,
            current_players: self.members.len(),
            status: self.status,
            creator_name,
        }
    }

    /// Lobby view of the members. Ready flags live with the player
    /// records, so the caller supplies them.
    pub fn lobby(&self, is_ready: impl Fn(PlayerId) -> bool) -> LobbySnapshot {
        LobbySnapshot {
            players: self
                .members
                .iter()
                .map(|m| PlayerInfo {
                    id: m.id,
                    name: m.name.clone(),
                    is_creator: m.id == self.creator,
                    is_ready: is_ready(m.id),
                })
                .collect(),
            room_status: self.status,
        }
    }
}
