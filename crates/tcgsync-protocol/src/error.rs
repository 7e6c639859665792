//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding events.
///
/// All decode-side variants describe a bad request from one client. The
/// server answers them with an `error` event to that client only.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning an event into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// The bytes were not a valid `{event, data}` frame.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame named an event nobody handles.
    #[error("unknown event: {0}")]
    UnknownEvent(String),

    /// The event is known but its payload is missing a field or holds a
    /// value of the wrong shape.
    #[error("invalid payload for {event}: {source}")]
    InvalidPayload {
        event: String,
        #[source]
        source: serde_json::Error,
    },
}
