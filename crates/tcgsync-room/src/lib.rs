//! Rooms for tcgsync.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns one
//! [`Match`](tcgsync_state::Match). Commands reach it through a bounded
//! channel and are applied one at a time in arrival order, so two players
//! hammering the same room can never interleave half-applied changes.
//!
//! # Key types
//!
//! - [`RoomRegistry`]: process-wide map of room codes to running rooms,
//!   plus the reverse index from connections to the rooms they joined
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`Mutation`] / [`apply`]: the client-initiated changes and their rules
//! - [`Members`]: a room's outbound senders and the broadcast fan-out
//! - [`RoomConfig`]: room settings

mod broadcast;
mod config;
mod error;
mod mutation;
mod registry;
mod room;

pub use broadcast::{MemberSender, Members};
pub use config::RoomConfig;
pub use error::RoomError;
pub use mutation::{Mutation, MutationOutcome, apply};
pub use registry::{Membership, RoomRegistry};
pub use room::RoomHandle;
