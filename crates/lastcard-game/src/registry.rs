//! Registry of running games, one per room.

use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use lastcard_protocol::{CardColor, PlayerId, RoomId};
use tokio::sync::Mutex;

use crate::{GameConfig, GameError, GameSession, TableView};

/// Keyed store of active [`GameSession`]s.
///
/// Each session sits behind its own async mutex, so games in different
/// rooms never contend. Every game operation returns the resulting
/// [`TableView`], read under the same lock as the mutation.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<RoomId, Arc<Mutex<GameSession>>>,
    config: GameConfig,
}

impl SessionRegistry {
    pub fn new(config: GameConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Deals a new game for `room_id`. Turn order follows `players`.
    ///
    /// # Errors
    /// [`GameError::SessionAlreadyExists`] if the room already has one.
    pub fn create_session(
        &self,
        room_id: RoomId,
        players: &[(PlayerId, String)],
    ) -> Result<TableView, GameError> {
        self.insert(room_id, GameSession::new(room_id, players, self.config)?)
    }

    /// Registers an already-built session (e.g. one dealt from a seeded deck).
    pub fn insert(
        &self,
        room_id: RoomId,
        session: GameSession,
    ) -> Result<TableView, GameError> {
        match self.sessions.entry(room_id) {
            Entry::Occupied(_) => Err(GameError::SessionAlreadyExists(room_id)),
            Entry::Vacant(slot) => {
                let view = session.view()?;
                slot.insert(Arc::new(Mutex::new(session)));
                tracing::info!(%room_id, players = view.hands.len(), "game session created");
                Ok(view)
            }
        }
    }

    /// Drops the session for `room_id`. Returns whether one existed.
    pub fn remove_session(&self, room_id: RoomId) -> bool {
        let removed = self.sessions.remove(&room_id).is_some();
        if removed {
            tracing::info!(%room_id, "game session removed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub async fn play_card(
        &self,
        room_id: RoomId,
        player: PlayerId,
        index: usize,
        chosen_color: Option<CardColor>,
    ) -> Result<TableView, GameError> {
        self.mutate(room_id, |s| s.play_card(player, index, chosen_color))
            .await
    }

    pub async fn choose_color(
        &self,
        room_id: RoomId,
        player: PlayerId,
        color: CardColor,
    ) -> Result<TableView, GameError> {
        self.mutate(room_id, |s| s.choose_color(player, color)).await
    }

    pub async fn draw_card(
        &self,
        room_id: RoomId,
        player: PlayerId,
    ) -> Result<TableView, GameError> {
        self.mutate(room_id, |s| s.draw_card(player)).await
    }

    pub async fn declare_last_card(
        &self,
        room_id: RoomId,
        player: PlayerId,
    ) -> Result<TableView, GameError> {
        self.mutate(room_id, |s| s.declare_last_card(player)).await
    }

    /// Current view of the table without changing anything.
    pub async fn view(&self, room_id: RoomId) -> Result<TableView, GameError> {
        self.mutate(room_id, |_| Ok(())).await
    }

    pub async fn calculate_scores(
        &self,
        room_id: RoomId,
    ) -> Result<BTreeMap<PlayerId, u32>, GameError> {
        let session = self.get(room_id)?;
        let session = session.lock().await;
        Ok(session.calculate_scores())
    }

    fn get(&self, room_id: RoomId) -> Result<Arc<Mutex<GameSession>>, GameError> {
        // Clone the Arc out so the map shard isn't held across an await.
        self.sessions
            .get(&room_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(GameError::NoSuchSession(room_id))
    }

    async fn mutate<F>(&self, room_id: RoomId, op: F) -> Result<TableView, GameError>
    where
        F: FnOnce(&mut GameSession) -> Result<(), GameError>,
    {
        let session = self.get(room_id)?;
        let mut session = session.lock().await;
        op(&mut *session)?;
        session.view()
    }
}
