//! Outbound events.

use serde::{Deserialize, Serialize};
use tcgsync_state::{KnockoutRecord, Match, PlayerKey, RoomCode};

/// Codes carried by [`ServerEvent::Error`], HTTP-style.
pub mod error_codes {
    /// The request could not be decoded or addressed a slot that does not
    /// exist.
    pub const BAD_REQUEST: u16 = 400;
    /// The room exists but could not take the request.
    pub const UNAVAILABLE: u16 = 503;
}

/// Everything the server sends to a client.
///
/// `#[serde(tag = "event", content = "data")]` gives the same
/// `{"event": ..., "data": ...}` shape clients use for requests:
///
/// ```text
/// {"event": "game_ended", "data": {"winner": "player1"}}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// To the joining connection only. `player` is `null` for a spectator.
    #[serde(rename_all = "camelCase")]
    PlayerAssigned {
        player: Option<PlayerKey>,
        room_id: RoomCode,
        game_state: Box<Match>,
    },

    /// The full match, to every room member after each change.
    GameStateUpdate(Box<Match>),

    /// The batch removed by one knockout evaluation.
    KnockoutsOccurred { knockouts: Vec<KnockoutRecord> },

    GameEnded { winner: Option<PlayerKey> },

    /// To the requesting connection only. Both fields are `null` when no
    /// sound is available.
    #[serde(rename_all = "camelCase")]
    VictorySound {
        sound_file: Option<String>,
        sound_url: Option<String>,
    },

    /// To the originating connection only.
    Error { code: u16, message: String },
}

impl ServerEvent {
    pub fn state(game: &Match) -> Self {
        Self::GameStateUpdate(Box::new(game.clone()))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Error {
            code: error_codes::BAD_REQUEST,
            message: message.into(),
        }
    }
}
