//! One side of the table and the key that names it.

use std::fmt;

use serde::{Deserialize, Serialize};
use tcgsync_transport::ConnectionId;

use crate::{BENCH_SIZE, Slot, Unit};

/// Prize cards each player starts a fresh match with.
pub const DEFAULT_PRIZE_CARDS: i64 = 6;

/// Names one of the two seats: `"player1"` or `"player2"` on the wire.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PlayerKey {
    Player1,
    Player2,
}

impl PlayerKey {
    /// Both seats in scan order.
    pub const ALL: [PlayerKey; 2] = [PlayerKey::Player1, PlayerKey::Player2];

    pub fn opponent(self) -> Self {
        match self {
            Self::Player1 => Self::Player2,
            Self::Player2 => Self::Player1,
        }
    }
}

impl fmt::Display for PlayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player1 => write!(f, "player1"),
            Self::Player2 => write!(f, "player2"),
        }
    }
}

/// One player's side: the active unit, the bench, the prize counter and
/// who is currently sitting in the seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub active: Unit,
    pub bench: [Unit; BENCH_SIZE],
    /// Not clamped on direct writes; knockout deductions floor at zero.
    pub prize_cards: i64,
    pub connected: bool,
    #[serde(default)]
    pub connection_id: Option<ConnectionId>,
    pub display_name: String,
}

impl Player {
    /// An empty, unseated side holding `prize_cards` prizes.
    pub fn new(prize_cards: i64) -> Self {
        Self {
            active: Unit::default(),
            bench: Default::default(),
            prize_cards,
            connected: false,
            connection_id: None,
            display_name: String::new(),
        }
    }

    /// Returns `true` if a live connection holds this seat.
    pub fn is_seated(&self) -> bool {
        self.connected
    }

    /// Hands the seat to `conn`.
    pub fn seat(&mut self, conn: ConnectionId, display_name: String) {
        self.connected = true;
        self.connection_id = Some(conn);
        self.display_name = display_name;
    }

    /// Marks the seat as free. The display name stays for the scoreboard.
    pub fn vacate(&mut self) {
        self.connected = false;
        self.connection_id = None;
    }

    /// Copies the connection metadata of `other` onto this side.
    pub(crate) fn inherit_seat(&mut self, other: &Player) {
        self.connected = other.connected;
        self.connection_id = other.connection_id;
        self.display_name.clone_from(&other.display_name);
    }

    /// Every slot in scan order: active first, then the bench by index.
    pub fn slots(&self) -> impl Iterator<Item = (Slot, &Unit)> {
        std::iter::once((Slot::Active, &self.active)).chain(
            self.bench
                .iter()
                .enumerate()
                .map(|(i, unit)| (Slot::Bench(i), unit)),
        )
    }

    /// Mutable version of [`slots`](Self::slots).
    pub fn slots_mut(&mut self) -> impl Iterator<Item = (Slot, &mut Unit)> {
        std::iter::once((Slot::Active, &mut self.active)).chain(
            self.bench
                .iter_mut()
                .enumerate()
                .map(|(i, unit)| (Slot::Bench(i), unit)),
        )
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new(DEFAULT_PRIZE_CARDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_key_wire_form() {
        assert_eq!(
            serde_json::to_string(&PlayerKey::Player1).unwrap(),
            r#""player1""#
        );
        let key: PlayerKey = serde_json::from_str(r#""player2""#).unwrap();
        assert_eq!(key, PlayerKey::Player2);
        assert!(serde_json::from_str::<PlayerKey>(r#""player3""#).is_err());
    }

    #[test]
    fn test_opponent_is_symmetric() {
        for key in PlayerKey::ALL {
            assert_ne!(key, key.opponent());
            assert_eq!(key, key.opponent().opponent());
        }
    }

    #[test]
    fn test_new_player_has_empty_bench_of_fixed_size() {
        let player = Player::default();
        assert_eq!(player.bench.len(), BENCH_SIZE);
        assert!(player.slots().all(|(_, unit)| !unit.is_occupied()));
        assert_eq!(player.prize_cards, DEFAULT_PRIZE_CARDS);
        assert!(!player.is_seated());
    }

    #[test]
    fn test_slots_follow_scan_order() {
        let player = Player::default();
        let order: Vec<Slot> = player.slots().map(|(slot, _)| slot).collect();
        assert_eq!(order[0], Slot::Active);
        assert_eq!(&order[1..], &[
            Slot::Bench(0),
            Slot::Bench(1),
            Slot::Bench(2),
            Slot::Bench(3),
            Slot::Bench(4),
        ]);
    }

    #[test]
    fn test_seat_and_vacate() {
        let mut player = Player::default();
        player.seat(ConnectionId::new(3), "Ash".into());
        assert!(player.is_seated());
        assert_eq!(player.connection_id, Some(ConnectionId::new(3)));

        player.vacate();
        assert!(!player.is_seated());
        assert_eq!(player.connection_id, None);
        assert_eq!(player.display_name, "Ash");
    }
}
