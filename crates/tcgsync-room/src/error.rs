//! Error types for the room layer.

use tcgsync_state::{RoomCode, StateError};

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// A room with this code is already running.
    #[error("room {0} already exists")]
    AlreadyExists(RoomCode),

    /// The room's command channel is closed or its actor stopped
    /// before replying.
    #[error("room {0} is unavailable")]
    Unavailable(RoomCode),

    /// The match rejected the request.
    #[error(transparent)]
    State(#[from] StateError),
}
