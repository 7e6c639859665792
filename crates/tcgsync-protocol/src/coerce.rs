//! Lenient field readers for client payloads.
//!
//! Browser clients send numbers in whatever shape the form field produced:
//! `70`, `70.0` or `"70"`. These helpers accept all of them and reject
//! anything that is not recognisably an integer.

use std::fmt;

use serde::Deserializer;
use serde::de::{self, Visitor};
use tcgsync_state::RoomCode;

/// Reads an integer from a JSON integer, a finite float (truncated toward
/// zero) or a string holding an integer (surrounding whitespace allowed).
pub(crate) fn int<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    d.deserialize_any(IntVisitor)
}

/// Reads a room id and canonicalises it.
pub(crate) fn room_code<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<RoomCode, D::Error> {
    let raw: String = serde::Deserialize::deserialize(d)?;
    Ok(RoomCode::normalize(&raw))
}

struct IntVisitor;

impl Visitor<'_> for IntVisitor {
    type Value = i64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer, a number or a numeric string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
        Ok(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
        i64::try_from(v)
            .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
        // `as` saturates at the i64 bounds once NaN and infinities are out.
        if v.is_finite() {
            Ok(v.trunc() as i64)
        } else {
            Err(E::invalid_value(de::Unexpected::Float(v), &self))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
        v.trim()
            .parse()
            .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}
