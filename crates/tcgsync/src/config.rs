//! Server configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tcgsync_room::RoomConfig;

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
/// Default directory scanned for victory sounds.
pub const DEFAULT_SOUNDS_DIR: &str = "static/sounds";
/// Default URL prefix clients use to fetch a victory sound.
pub const DEFAULT_SOUND_URL_PREFIX: &str = "/static/sounds";

const ENV_BIND: &str = "TCGSYNC_BIND";
const ENV_SOUNDS_DIR: &str = "TCGSYNC_SOUNDS_DIR";
const ENV_SOUND_URL_PREFIX: &str = "TCGSYNC_SOUND_URL_PREFIX";
const ENV_PRIZE_CARDS: &str = "TCGSYNC_PRIZE_CARDS";

/// Everything needed to start a server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,

    /// Directory holding the `.mp3` victory sounds.
    pub sounds_dir: PathBuf,

    /// Prefix joined with the file name to form `soundUrl`.
    pub sound_url_prefix: String,

    /// Settings applied to every room.
    pub room: RoomConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            sounds_dir: PathBuf::from(DEFAULT_SOUNDS_DIR),
            sound_url_prefix: DEFAULT_SOUND_URL_PREFIX.to_string(),
            room: RoomConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads overrides from the process environment.
    ///
    /// | Variable | Field |
    /// |---|---|
    /// | `TCGSYNC_BIND` | `bind_addr` |
    /// | `TCGSYNC_SOUNDS_DIR` | `sounds_dir` |
    /// | `TCGSYNC_SOUND_URL_PREFIX` | `sound_url_prefix` |
    /// | `TCGSYNC_PRIZE_CARDS` | `room.starting_prize_cards` |
    ///
    /// Unset variables keep their defaults. An unparseable prize count is
    /// logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through
    /// `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = lookup(ENV_BIND) {
            config.bind_addr = addr;
        }
        if let Some(dir) = lookup(ENV_SOUNDS_DIR) {
            config.sounds_dir = PathBuf::from(dir);
        }
        if let Some(prefix) = lookup(ENV_SOUND_URL_PREFIX) {
            config.sound_url_prefix = prefix;
        }
        if let Some(raw) = lookup(ENV_PRIZE_CARDS) {
            match raw.trim().parse::<i64>() {
                Ok(prizes) => config.room.starting_prize_cards = prizes,
                Err(e) => tracing::warn!(
                    var = ENV_PRIZE_CARDS,
                    value = %raw,
                    error = %e,
                    default = config.room.starting_prize_cards,
                    "ignoring invalid prize card count"
                ),
            }
        }

        config
    }

    /// Sets the listen address.
    pub fn with_bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }

    /// Sets the victory sound directory.
    pub fn with_sounds_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.sounds_dir = dir.into();
        self
    }

    /// Sets the victory sound URL prefix.
    pub fn with_sound_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.sound_url_prefix = prefix.into();
        self
    }

    /// Sets the room settings.
    pub fn with_room(mut self, room: RoomConfig) -> Self {
        self.room = room;
        self
    }
}
