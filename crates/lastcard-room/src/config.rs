//! Room settings.

use crate::RoomError;

/// Limits applied when rooms are created and started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomConfig {
    /// Minimum members required to start a game.
    pub min_players: usize,

    /// Largest capacity a creator may ask for.
    pub max_capacity: usize,

    /// Capacity used when the creator does not ask for one.
    pub default_capacity: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            min_players: 2,
            max_capacity: 10,
            default_capacity: 4,
        }
    }
}

impl RoomConfig {
    /// Resolves a requested capacity against the limits.
    ///
    /// # Errors
    /// [`RoomError::InvalidConfig`] if `requested` is outside
    /// `min_players..=max_capacity`.
    pub fn capacity_for(&self, requested: Option<usize>) -> Result<usize, RoomError> {
        let capacity = requested.unwrap_or(self.default_capacity);
        if !(self.min_players..=self.max_capacity).contains(&capacity) {
            return Err(RoomError::InvalidConfig(format!(
                "capacity must be between {} and {}, got {capacity}",
                self.min_players, self.max_capacity
            )));
        }
        Ok(capacity)
    }
}
