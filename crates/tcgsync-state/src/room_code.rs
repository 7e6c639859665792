//! Case-insensitive room identifiers.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Length of a generated room code.
const GENERATED_LEN: usize = 8;

/// A room identifier in canonical (uppercase) form.
///
/// Every lookup and every creation goes through [`RoomCode::normalize`],
/// so `"abc"` and `"ABC"` name the same room.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Canonicalises a client-supplied room id.
    pub fn normalize(raw: &str) -> Self {
        Self(raw.to_uppercase())
    }

    /// A fresh random code: eight uppercase hexadecimal characters.
    ///
    /// Uniqueness against live rooms is the registry's job.
    pub fn generate() -> Self {
        let value: u32 = rand::rng().random();
        let code = format!("{value:0width$X}", width = GENERATED_LEN);
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_uppercases() {
        assert_eq!(RoomCode::normalize("abc"), RoomCode::normalize("ABC"));
        assert_eq!(RoomCode::normalize("aBc9").as_str(), "ABC9");
    }

    #[test]
    fn test_generated_code_shape() {
        for _ in 0..32 {
            let code = RoomCode::generate();
            assert_eq!(code.as_str().len(), GENERATED_LEN);
            assert!(
                code.as_str()
                    .chars()
                    .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()),
                "unexpected character in {code}"
            );
            assert_eq!(RoomCode::normalize(code.as_str()), code);
        }
    }

    #[test]
    fn test_room_code_serializes_as_string() {
        let json = serde_json::to_string(&RoomCode::normalize("x1")).unwrap();
        assert_eq!(json, r#""X1""#);
    }
}
