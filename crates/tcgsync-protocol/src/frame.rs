//! The inbound envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One inbound message before its payload is interpreted.
///
/// `data` may be omitted by the client; it then reads as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

impl Frame {
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_data_reads_as_null() {
        let frame: Frame =
            serde_json::from_str(r#"{"event":"get_victory_sound"}"#).unwrap();
        assert_eq!(frame.event, "get_victory_sound");
        assert_eq!(frame.data, Value::Null);
    }

    #[test]
    fn test_frame_requires_event_name() {
        assert!(serde_json::from_str::<Frame>(r#"{"data":{}}"#).is_err());
    }
}
