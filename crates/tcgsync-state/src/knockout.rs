//! Knockout history entries.

use serde::{Deserialize, Serialize};

use crate::{PlayerKey, Slot};

/// One unit removed from play.
///
/// `credited_player` is the player the knockout counts for: the supplied
/// attacker when that is not the owner, otherwise the owner's opponent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnockoutRecord {
    pub unit_name: String,
    pub owning_player: PlayerKey,
    pub slot_location: Slot,
    pub credited_player: PlayerKey,
}

impl KnockoutRecord {
    pub(crate) fn new(
        unit_name: String,
        owner: PlayerKey,
        slot: Slot,
        attacker: Option<PlayerKey>,
    ) -> Self {
        let credited_player = match attacker {
            Some(attacker) if attacker != owner => attacker,
            _ => owner.opponent(),
        };
        Self {
            unit_name,
            owning_player: owner,
            slot_location: slot,
            credited_player,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_goes_to_attacking_opponent() {
        let ko = KnockoutRecord::new(
            "Eevee".into(),
            PlayerKey::Player2,
            Slot::Active,
            Some(PlayerKey::Player1),
        );
        assert_eq!(ko.credited_player, PlayerKey::Player1);
    }

    #[test]
    fn test_self_knockout_credits_opponent() {
        let ko = KnockoutRecord::new(
            "Eevee".into(),
            PlayerKey::Player2,
            Slot::Bench(1),
            Some(PlayerKey::Player2),
        );
        assert_eq!(ko.credited_player, PlayerKey::Player1);

        let ko = KnockoutRecord::new(
            "Eevee".into(),
            PlayerKey::Player2,
            Slot::Bench(1),
            None,
        );
        assert_eq!(ko.credited_player, PlayerKey::Player1);
    }

    #[test]
    fn test_record_wire_shape() {
        let ko = KnockoutRecord::new(
            "Pikachu".into(),
            PlayerKey::Player1,
            Slot::Bench(2),
            Some(PlayerKey::Player2),
        );
        let json = serde_json::to_value(&ko).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "unitName": "Pikachu",
                "owningPlayer": "player1",
                "slotLocation": "bench-2",
                "creditedPlayer": "player2",
            })
        );
    }
}
