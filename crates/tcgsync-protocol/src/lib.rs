//! Wire protocol for tcgsync.
//!
//! Every message in either direction is one JSON object naming an event
//! and carrying its payload:
//!
//! ```text
//! {"event": "apply_damage", "data": {"roomId": "ABC", "player": "player1", ...}}
//! ```
//!
//! - **Inbound** ([`Frame`], [`ClientEvent`]): a frame is decoded first,
//!   then its event name is looked up in [`EVENT_TABLE`] to decode the
//!   payload into a typed [`ClientEvent`].
//! - **Outbound** ([`ServerEvent`]): serialises straight to the same
//!   `{event, data}` shape.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): bytes in, bytes out.
//! - **Errors** ([`ProtocolError`]): what can go wrong on the way.
//!
//! The protocol layer knows nothing about rooms or connections. It only
//! turns bytes into events and events into bytes.

mod client;
mod codec;
mod coerce;
mod error;
mod frame;
mod server;

pub use client::{
    ApplyDamage, ClientEvent, Decoder, EVENT_TABLE, HealPokemon, JoinGame,
    ResetGame, StatusChange, SwapPokemon, UpdateDamageCounters,
    UpdatePokemon, UpdatePrizeCards,
};
pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use frame::Frame;
pub use server::{ServerEvent, error_codes};
