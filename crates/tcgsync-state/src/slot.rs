//! Slot addressing: the active position or one of the bench positions.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of bench slots per player. Never changes during a match.
pub const BENCH_SIZE: usize = 5;

/// An addressable unit position on one player's side.
///
/// On the wire a slot is written as `"active"` or `"bench-<i>"`. When
/// reading, clients may also send a bare bench index, either as a number
/// (`2`) or as a numeric string (`"2"`).
///
/// A `Bench` index is not range-checked here; the match rejects indexes
/// at or above [`BENCH_SIZE`] when the slot is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Active,
    Bench(usize),
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Bench(i) => write!(f, "bench-{i}"),
        }
    }
}

impl Serialize for Slot {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Slot {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        d.deserialize_any(SlotVisitor)
    }
}

struct SlotVisitor;

impl<'de> Visitor<'de> for SlotVisitor {
    type Value = Slot;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(r#""active", "bench-<i>" or a non-negative bench index"#)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Slot, E> {
        usize::try_from(v)
            .map(Slot::Bench)
            .map_err(|_| E::custom(format!("bench index {v} is too large")))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Slot, E> {
        u64::try_from(v)
            .map_err(|_| E::custom(format!("bench index {v} is negative")))
            .and_then(|v| self.visit_u64(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Slot, E> {
        if v == "active" {
            return Ok(Slot::Active);
        }
        let digits = v.strip_prefix("bench-").unwrap_or(v).trim();
        digits
            .parse::<usize>()
            .map(Slot::Bench)
            .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}
