//! Room directory: creates, finds and removes rooms.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use lastcard_protocol::{PlayerId, RoomId, RoomInfo};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{Room, RoomConfig, RoomError};

/// All open rooms.
///
/// Each room sits behind its own async mutex. Anything that reads and
/// then changes a room (join, leave, start, broadcasting a snapshot) holds
/// that room's lock for the whole sequence; different rooms never
/// contend.
#[derive(Debug)]
pub struct RoomDirectory {
    rooms: DashMap<RoomId, Arc<Mutex<Room>>>,

    /// Next room id. Starts at 1.
    next_id: AtomicU64,

    config: RoomConfig,
}

impl RoomDirectory {
    pub fn new(config: RoomConfig) -> Self {
        Self {
            rooms: DashMap::new(),
            next_id: AtomicU64::new(1),
            config,
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Creates a room with `creator` as its only member.
    ///
    /// # Errors
    /// [`RoomError::InvalidConfig`] for a blank name or a capacity
    /// outside the configured range.
    pub fn create(
        &self,
        name: &str,
        password: Option<String>,
        capacity: Option<usize>,
        creator: PlayerId,
        creator_name: &str,
    ) -> Result<RoomInfo, RoomError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RoomError::InvalidConfig("room name is empty".into()));
        }
        let capacity = self.config.capacity_for(capacity)?;

        let room_id = RoomId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let room = Room::new(room_id, name, password, capacity, creator, creator_name);
        let info = room.info();
        self.rooms.insert(room_id, Arc::new(Mutex::new(room)));

        tracing::info!(%room_id, creator = %creator, capacity, "room created");
        Ok(info)
    }

    /// Locks a room for a read-modify-write sequence.
    ///
    /// # Errors
    /// [`RoomError::NotFound`] if the room is unknown, or was closed while
    /// waiting for the lock.
    pub async fn lock(&self, room_id: RoomId) -> Result<OwnedMutexGuard<Room>, RoomError> {
        let room = self
            .rooms
            .get(&room_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(RoomError::NotFound(room_id))?;

        let guard = room.lock_owned().await;
        if guard.is_closed() {
            return Err(RoomError::NotFound(room_id));
        }
        Ok(guard)
    }

    /// Drops a room from the directory. Returns whether it was present.
    pub fn remove(&self, room_id: RoomId) -> bool {
        let removed = self.rooms.remove(&room_id).is_some();
        if removed {
            tracing::info!(%room_id, "room destroyed");
        }
        removed
    }

    /// Summaries of every open room, ordered by id.
    pub async fn list(&self) -> Vec<RoomInfo> {
        // Snapshot the handles first so no map shard is held across an await.
        let rooms: Vec<Arc<Mutex<Room>>> = self
            .rooms
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        let mut infos = Vec::with_capacity(rooms.len());
        for room in rooms {
            let room = room.lock().await;
            if !room.is_closed() {
                infos.push(room.info());
            }
        }
        infos.sort_by_key(|info| info.room_id);
        infos
    }

    /// Number of open rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

impl Default for RoomDirectory {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}
