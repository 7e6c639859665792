//! # tcgsync
//!
//! Real-time match state sync for two-player card games.
//!
//! Clients connect over WebSocket, join a room by code, and send small
//! events such as "apply 30 damage to player2's active unit". The server
//! applies every change to the room's authoritative match, checks for
//! knockouts and victory, and broadcasts the full state back to everyone
//! in the room.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tcgsync::prelude::*;
//!
//! # async fn start() -> Result<(), TcgsyncError> {
//! let server = TcgsyncServer::builder()
//!     .config(ServerConfig::from_env())
//!     .bind("0.0.0.0:5000")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;
mod sound;

pub use config::ServerConfig;
pub use error::TcgsyncError;
pub use server::{TcgsyncServer, TcgsyncServerBuilder};
pub use sound::{DirectorySounds, SoundLibrary};

/// Everything needed to run a server or write a client test.
pub mod prelude {
    pub use crate::{
        DirectorySounds, ServerConfig, SoundLibrary, TcgsyncError,
        TcgsyncServer, TcgsyncServerBuilder,
    };
    pub use tcgsync_protocol::{
        ClientEvent, Codec, Frame, JsonCodec, ProtocolError, ServerEvent,
    };
    pub use tcgsync_room::{Mutation, RoomConfig, RoomError, RoomRegistry};
    pub use tcgsync_state::{
        KnockoutRecord, Match, PlayerKey, RoomCode, Slot, Unit, UnitPatch,
    };
    pub use tcgsync_transport::{ConnectionId, TransportError};
}
