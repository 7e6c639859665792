//! Unified error type for tcgsync.

use tcgsync_protocol::{ProtocolError, error_codes};
use tcgsync_room::RoomError;
use tcgsync_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum TcgsyncError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (bad frame, unknown event, bad payload).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (stopped room, out-of-range slot).
    #[error(transparent)]
    Room(#[from] RoomError),
}

impl TcgsyncError {
    /// The code reported to the client in an `error` event.
    pub fn code(&self) -> u16 {
        match self {
            Self::Protocol(_) | Self::Room(RoomError::State(_)) => {
                error_codes::BAD_REQUEST
            }
            Self::Transport(_) | Self::Room(_) => error_codes::UNAVAILABLE,
        }
    }
}
