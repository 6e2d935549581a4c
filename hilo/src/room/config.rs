//! Room configuration models.

use serde::{Deserialize, Serialize};

use crate::game::state_machine::{DEFAULT_MAX_PLAYERS, DEFAULT_MIN_PLAYERS};

/// Limits applied to every room a registry creates.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RoomConfig {
    /// Players required before a game may start.
    pub min_players: usize,

    /// Seats in the room; further joins are rejected.
    pub max_players: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            min_players: DEFAULT_MIN_PLAYERS,
            max_players: DEFAULT_MAX_PLAYERS,
        }
    }
}

impl RoomConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.min_players < 2 {
            return Err("Minimum players must be at least 2".to_string());
        }
        if self.max_players < self.min_players {
            return Err("Maximum players must be at least the minimum".to_string());
        }
        if self.max_players > 52 {
            return Err("Maximum players must be at most 52 (one card each)".to_string());
        }
        Ok(())
    }
}
