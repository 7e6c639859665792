//! The match aggregate: both players, knockout history and end flags.

use serde::{Deserialize, Serialize};
use tcgsync_transport::ConnectionId;

use crate::{
    KnockoutRecord, Player, PlayerKey, RoomCode, Slot, StateError, Unit,
};

/// The authoritative state of one room's match.
///
/// Serialising a `Match` produces the full wire representation sent in
/// every `game_state_update`; deserialising it gives back an equal value.
///
/// # Invariants
///
/// - Exactly two players with [`BENCH_SIZE`](crate::BENCH_SIZE) bench
///   slots each.
/// - `ended` becomes `true` the first time a player's prize count is at or
///   below zero, and `winner` is fixed at that moment. Only
///   [`rematch`](Self::rematch) clears either flag.
/// - After [`evaluate_knockouts`](Self::evaluate_knockouts) no occupied
///   slot has `current_hp <= 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub player1: Player,
    pub player2: Player,
    /// Whole-match history, append-only.
    pub knockout_log: Vec<KnockoutRecord>,
    pub ended: bool,
    pub winner: Option<PlayerKey>,
    pub room_id: RoomCode,
}

impl Match {
    /// A fresh match with both sides empty and unseated.
    pub fn new(room_id: RoomCode, starting_prize_cards: i64) -> Self {
        Self {
            player1: Player::new(starting_prize_cards),
            player2: Player::new(starting_prize_cards),
            knockout_log: Vec::new(),
            ended: false,
            winner: None,
            room_id,
        }
    }

    pub fn player(&self, key: PlayerKey) -> &Player {
        match key {
            PlayerKey::Player1 => &self.player1,
            PlayerKey::Player2 => &self.player2,
        }
    }

    pub fn player_mut(&mut self, key: PlayerKey) -> &mut Player {
        match key {
            PlayerKey::Player1 => &mut self.player1,
            PlayerKey::Player2 => &mut self.player2,
        }
    }

    pub fn opponent(&self, key: PlayerKey) -> &Player {
        self.player(key.opponent())
    }

    /// Looks up the unit at `slot` on `key`'s side.
    pub fn resolve_slot(
        &self,
        key: PlayerKey,
        slot: Slot,
    ) -> Result<&Unit, StateError> {
        let player = self.player(key);
        match slot {
            Slot::Active => Ok(&player.active),
            Slot::Bench(i) => player.bench.get(i).ok_or_else(|| out_of_range(i)),
        }
    }

    /// Mutable version of [`resolve_slot`](Self::resolve_slot).
    pub fn resolve_slot_mut(
        &mut self,
        key: PlayerKey,
        slot: Slot,
    ) -> Result<&mut Unit, StateError> {
        let player = self.player_mut(key);
        match slot {
            Slot::Active => Ok(&mut player.active),
            Slot::Bench(i) => {
                player.bench.get_mut(i).ok_or_else(|| out_of_range(i))
            }
        }
    }

    /// Exchanges the active unit with `bench[index]`, whole units moving
    /// together.
    pub fn swap_active_bench(
        &mut self,
        key: PlayerKey,
        index: usize,
    ) -> Result<(), StateError> {
        let player = self.player_mut(key);
        let benched = player
            .bench
            .get_mut(index)
            .ok_or_else(|| out_of_range(index))?;
        std::mem::swap(&mut player.active, benched);
        Ok(())
    }

    /// Removes every knocked-out unit and returns this call's batch.
    ///
    /// Scan order is player1 then player2, active before bench, bench by
    /// ascending index. Each removed unit is logged and its slot emptied.
    /// When `attacker` is supplied, that player's prize count drops by the
    /// number of the batch's knockouts owned by the other side, floored at
    /// zero. The victory condition is re-checked afterwards.
    pub fn evaluate_knockouts(
        &mut self,
        attacker: Option<PlayerKey>,
    ) -> Vec<KnockoutRecord> {
        let mut batch = Vec::new();

        for owner in PlayerKey::ALL {
            for (slot, unit) in self.player_mut(owner).slots_mut() {
                if unit.is_knocked_out() {
                    let removed = std::mem::take(unit);
                    batch.push(KnockoutRecord::new(
                        removed.name,
                        owner,
                        slot,
                        attacker,
                    ));
                }
            }
        }

        if let Some(attacker) = attacker {
            let taken = batch
                .iter()
                .filter(|ko| ko.owning_player != attacker)
                .count();
            let taken = i64::try_from(taken).unwrap_or(i64::MAX);
            let player = self.player_mut(attacker);
            player.prize_cards = player.prize_cards.saturating_sub(taken).max(0);
        }

        for ko in &batch {
            tracing::info!(
                room_id = %self.room_id,
                unit = %ko.unit_name,
                owner = %ko.owning_player,
                slot = %ko.slot_location,
                credited = %ko.credited_player,
                "unit knocked out"
            );
        }
        self.knockout_log.extend(batch.iter().cloned());
        self.evaluate_victory();
        batch
    }

    /// Ends the match if either prize count is at or below zero.
    ///
    /// The winner is the opponent of the player whose count ran out. If
    /// both counts are out at the same check, player1 wins; this tie-break
    /// is part of the contract. Once the match has ended, further calls do
    /// nothing.
    pub fn evaluate_victory(&mut self) {
        if self.ended {
            return;
        }

        let p1_out = self.player1.prize_cards <= 0;
        let p2_out = self.player2.prize_cards <= 0;
        let winner = match (p1_out, p2_out) {
            (true, true) => PlayerKey::Player1,
            (true, false) => PlayerKey::Player2,
            (false, true) => PlayerKey::Player1,
            (false, false) => return,
        };

        self.ended = true;
        self.winner = Some(winner);
        tracing::info!(room_id = %self.room_id, %winner, "match ended");
    }

    /// A brand-new match for the same room.
    ///
    /// Game state is zeroed; only the seat metadata (`connected`,
    /// `connection_id`, `display_name`) of both players carries over.
    pub fn rematch(&self, starting_prize_cards: i64) -> Self {
        let mut next = Self::new(self.room_id.clone(), starting_prize_cards);
        for key in PlayerKey::ALL {
            next.player_mut(key).inherit_seat(self.player(key));
        }
        next
    }

    /// The seat held by `conn`, if any.
    pub fn seat_of(&self, conn: ConnectionId) -> Option<PlayerKey> {
        PlayerKey::ALL
            .into_iter()
            .find(|key| self.player(*key).connection_id == Some(conn))
    }

    /// The first seat no live connection holds, player1 first.
    pub fn free_seat(&self) -> Option<PlayerKey> {
        PlayerKey::ALL
            .into_iter()
            .find(|key| !self.player(*key).is_seated())
    }
}

fn out_of_range(index: usize) -> StateError {
    StateError::BenchIndexOutOfRange(i64::try_from(index).unwrap_or(i64::MAX))
}
