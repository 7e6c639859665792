//! Codec trait and its JSON implementation.
//!
//! A codec turns Rust values into the bytes that travel over the socket
//! and back. The server never calls `serde_json` directly for wire
//! traffic: the connection handler owns one [`Codec`] and every inbound
//! [`Frame`](crate::Frame) and outbound [`ServerEvent`](crate::ServerEvent)
//! goes through it. Keeping the encoding behind a trait means the
//! handler, the pump task and the tests all agree on one format without
//! naming it.
//!
//! Browser clients speak JSON, so [`JsonCodec`] is the only codec and the
//! server builder always picks it.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Converts values to bytes and back.
///
/// ## Trait bounds
///
/// - `Send + Sync`: one codec is shared by every connection task, and
///   Tokio may poll those tasks on any worker thread.
/// - `'static`: the codec lives inside the server state for as long as
///   the server runs, so it cannot borrow anything shorter-lived.
///
/// ## Generic methods
///
/// `encode` and `decode` are generic over the value type, so the same
/// codec handles inbound frames and outbound events:
/// - `encode<T: Serialize>` works for any [`ServerEvent`](crate::ServerEvent),
///   including the large `game_state_update` snapshot.
/// - `decode<T: DeserializeOwned>` produces values that own their data.
///   The receive buffer is dropped right after decoding, so a decoded
///   [`Frame`](crate::Frame) must not borrow from it.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the value cannot be represented
    /// in this format. The handler logs it and drops that one event.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// truncated, or do not match the expected type. The handler answers
    /// with a 400 `error` event to the sender only.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] backed by `serde_json`.
///
/// ```rust
/// use tcgsync_protocol::{Codec, Frame, JsonCodec};
///
/// let codec = JsonCodec;
/// let frame: Frame = codec
///     .decode(br#"{"event":"reset_game","data":{"roomId":"abc"}}"#)
///     .unwrap();
/// assert_eq!(frame.event, "reset_game");
///
/// let bytes = codec.encode(&frame).unwrap();
/// assert_eq!(codec.decode::<Frame>(&bytes).unwrap(), frame);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
