//! Client-initiated changes to a match and the rules for applying them.
//!
//! One [`Mutation`] variant per action a client can take. [`apply`] is the
//! only place a match is changed after creation; the room actor calls it
//! once per command, in arrival order.

use tcgsync_state::{
    KnockoutRecord, Match, PlayerKey, Slot, StateError, UnitPatch,
};

use crate::RoomConfig;

/// A single change requested by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Merge the present fields of `patch` into the unit at `slot`.
    ReplaceUnit {
        player: PlayerKey,
        slot: Slot,
        patch: UnitPatch,
    },
    /// Subtract `damage` hit points, floored at zero, then remove
    /// knockouts crediting `attacker`.
    ApplyDamage {
        player: PlayerKey,
        slot: Slot,
        damage: i64,
        attacker: Option<PlayerKey>,
    },
    /// Add `amount` hit points, capped at the unit's maximum.
    Heal {
        player: PlayerKey,
        slot: Slot,
        amount: i64,
    },
    SetDamageCounters {
        player: PlayerKey,
        slot: Slot,
        value: i64,
    },
    AddStatus {
        player: PlayerKey,
        slot: Slot,
        status: String,
    },
    RemoveStatus {
        player: PlayerKey,
        slot: Slot,
        status: String,
    },
    /// Overwrite a prize count as given, then check for victory.
    SetPrizeCards { player: PlayerKey, prize_cards: i64 },
    /// Exchange the active unit with `bench[bench_index]`.
    SwapActiveBench { player: PlayerKey, bench_index: i64 },
    /// Start a fresh match, keeping who sits where.
    Reset,
}

impl Mutation {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ReplaceUnit { .. } => "replace_unit",
            Self::ApplyDamage { .. } => "apply_damage",
            Self::Heal { .. } => "heal",
            Self::SetDamageCounters { .. } => "set_damage_counters",
            Self::AddStatus { .. } => "add_status",
            Self::RemoveStatus { .. } => "remove_status",
            Self::SetPrizeCards { .. } => "set_prize_cards",
            Self::SwapActiveBench { .. } => "swap_active_bench",
            Self::Reset => "reset",
        }
    }
}

/// What a successful mutation produced besides the new match state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationOutcome {
    /// Units removed by this mutation's knockout check. Empty for
    /// mutations that do not run one.
    pub knockouts: Vec<KnockoutRecord>,
}

impl MutationOutcome {
    fn with(knockouts: Vec<KnockoutRecord>) -> Self {
        Self { knockouts }
    }
}

/// Applies `mutation` to `game`.
///
/// | Mutation | Knockout check | Victory check |
/// |---|---|---|
/// | `ReplaceUnit` | yes, no attacker | via knockouts |
/// | `ApplyDamage` | yes, crediting `attacker` | via knockouts |
/// | `Heal`, `SetDamageCounters`, `AddStatus`, `RemoveStatus` | no | no |
/// | `SetPrizeCards` | no | yes |
/// | `SwapActiveBench` | yes, no attacker | via knockouts |
/// | `Reset` | no | no, both flags cleared |
///
/// # Errors
/// Returns `StateError::BenchIndexOutOfRange` when the slot or bench index
/// does not exist. The match is unchanged in that case.
pub fn apply(
    game: &mut Match,
    mutation: Mutation,
    config: &RoomConfig,
) -> Result<MutationOutcome, StateError> {
    let outcome = match mutation {
        Mutation::ReplaceUnit {
            player,
            slot,
            patch,
        } => {
            game.resolve_slot_mut(player, slot)?.merge(patch);
            MutationOutcome::with(game.evaluate_knockouts(None))
        }
        Mutation::ApplyDamage {
            player,
            slot,
            damage,
            attacker,
        } => {
            game.resolve_slot_mut(player, slot)?.apply_damage(damage);
            MutationOutcome::with(game.evaluate_knockouts(attacker))
        }
        Mutation::Heal {
            player,
            slot,
            amount,
        } => {
            game.resolve_slot_mut(player, slot)?.heal(amount);
            MutationOutcome::default()
        }
        Mutation::SetDamageCounters {
            player,
            slot,
            value,
        } => {
            game.resolve_slot_mut(player, slot)?.set_damage_counters(value);
            MutationOutcome::default()
        }
        Mutation::AddStatus {
            player,
            slot,
            status,
        } => {
            game.resolve_slot_mut(player, slot)?.add_status(status);
            MutationOutcome::default()
        }
        Mutation::RemoveStatus {
            player,
            slot,
            status,
        } => {
            game.resolve_slot_mut(player, slot)?.remove_status(&status);
            MutationOutcome::default()
        }
        Mutation::SetPrizeCards {
            player,
            prize_cards,
        } => {
            game.player_mut(player).prize_cards = prize_cards;
            game.evaluate_victory();
            MutationOutcome::default()
        }
        Mutation::SwapActiveBench {
            player,
            bench_index,
        } => {
            let index = usize::try_from(bench_index)
                .map_err(|_| StateError::BenchIndexOutOfRange(bench_index))?;
            game.swap_active_bench(player, index)?;
            MutationOutcome::with(game.evaluate_knockouts(None))
        }
        Mutation::Reset => {
            *game = game.rematch(config.starting_prize_cards);
            tracing::info!(room_id = %game.room_id, "match reset");
            MutationOutcome::default()
        }
    };
    Ok(outcome)
}
