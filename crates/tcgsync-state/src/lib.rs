//! Authoritative match state for tcgsync.
//!
//! A match is two players facing each other, each with one active unit,
//! a bench of [`BENCH_SIZE`] slots and a prize-card countdown. This crate
//! owns the data model and every rule that touches it:
//!
//! - [`Unit`] / [`UnitPatch`]: one card slot and its partial-update form
//! - [`Player`]: one side of the table plus its connection metadata
//! - [`Match`]: both players, the knockout history and the end flags,
//!   with knockout detection and the victory check
//!
//! Nothing here does I/O or knows about rooms. The room layer owns a
//! `Match` and mutates it one command at a time.

mod error;
mod game;
mod knockout;
mod player;
mod room_code;
mod slot;
mod unit;

pub use error::StateError;
pub use game::Match;
pub use knockout::KnockoutRecord;
pub use player::{DEFAULT_PRIZE_CARDS, Player, PlayerKey};
pub use room_code::RoomCode;
pub use slot::{BENCH_SIZE, Slot};
pub use unit::{Unit, UnitPatch};
