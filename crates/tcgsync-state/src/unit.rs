//! A single card slot: name, hit points, status tags and damage counters.

use serde::{Deserialize, Serialize};

/// One Pokémon slot.
///
/// An empty `name` means the slot is unoccupied; [`Unit::default`] is the
/// unoccupied unit. `current_hp` is signed because a raw merge may push it
/// outside `0..=max_hp`; only [`apply_damage`](Self::apply_damage) and
/// [`heal`](Self::heal) clamp.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Unit {
    pub name: String,
    pub max_hp: u32,
    pub current_hp: i64,
    /// Ordered, duplicate-free.
    pub status_effects: Vec<String>,
    /// Tracked independently of `current_hp`.
    pub damage_counters: u32,
}

impl Unit {
    /// Creates an occupied unit at full health.
    pub fn new(name: impl Into<String>, max_hp: u32) -> Self {
        Self {
            name: name.into(),
            max_hp,
            current_hp: i64::from(max_hp),
            ..Self::default()
        }
    }

    /// Returns `true` if a card is sitting in this slot.
    pub fn is_occupied(&self) -> bool {
        !self.name.is_empty()
    }

    /// An occupied unit at or below zero hit points.
    pub fn is_knocked_out(&self) -> bool {
        self.is_occupied() && self.current_hp <= 0
    }

    /// Overwrites exactly the fields present in `patch`.
    pub fn merge(&mut self, patch: UnitPatch) {
        let UnitPatch {
            name,
            max_hp,
            current_hp,
            status_effects,
            damage_counters,
        } = patch;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(max_hp) = max_hp {
            self.max_hp = max_hp;
        }
        if let Some(current_hp) = current_hp {
            self.current_hp = current_hp;
        }
        if let Some(tags) = status_effects {
            self.status_effects.clear();
            for tag in tags {
                self.add_status(tag);
            }
        }
        if let Some(counters) = damage_counters {
            self.damage_counters = counters;
        }
    }

    /// `current_hp = max(0, current_hp - amount)`.
    pub fn apply_damage(&mut self, amount: i64) {
        self.current_hp = self.current_hp.saturating_sub(amount).max(0);
    }

    /// `current_hp = min(max_hp, current_hp + amount)`.
    ///
    /// A negative amount heals nothing. Healing never runs a knockout
    /// check, so it must not be able to lower hit points.
    pub fn heal(&mut self, amount: i64) {
        self.current_hp = self
            .current_hp
            .saturating_add(amount.max(0))
            .min(i64::from(self.max_hp));
    }

    /// Sets the damage counters, flooring negative requests at zero.
    pub fn set_damage_counters(&mut self, value: i64) {
        self.damage_counters =
            u32::try_from(value.max(0)).unwrap_or(u32::MAX);
    }

    /// Adds a status tag. Returns `false` if it was already present.
    pub fn add_status(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.status_effects.contains(&tag) {
            return false;
        }
        self.status_effects.push(tag);
        true
    }

    /// Removes a status tag. Returns `false` if it was not present.
    pub fn remove_status(&mut self, tag: &str) -> bool {
        let before = self.status_effects.len();
        self.status_effects.retain(|t| t != tag);
        self.status_effects.len() != before
    }
}

/// A partial unit edit sent by a client.
///
/// Every field is optional; absent (or `null`) fields leave the target
/// untouched when merged with [`Unit::merge`]. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_hp: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_hp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_effects: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_counters: Option<u32>,
}
