//! Room configuration.

use serde::{Deserialize, Serialize};
use tcgsync_state::DEFAULT_PRIZE_CARDS;

/// Default command channel size for room actors.
pub const DEFAULT_COMMAND_BUFFER: usize = 64;

/// Settings shared by every room the registry spawns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Prize cards each player starts a fresh or reset match with.
    pub starting_prize_cards: i64,

    /// Capacity of each room's command queue. Senders wait when it is
    /// full. Zero is treated as one.
    pub command_buffer: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            starting_prize_cards: DEFAULT_PRIZE_CARDS,
            command_buffer: DEFAULT_COMMAND_BUFFER,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_config_default() {
        let config = RoomConfig::default();
        assert_eq!(config.starting_prize_cards, 6);
        assert_eq!(config.command_buffer, 64);
    }
}
