use std::io;

/// Boxed error from the underlying socket library.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while accepting or talking to a client.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The listening socket could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// A TCP connection could not be accepted.
    #[error("accept failed: {0}")]
    Accept(#[source] io::Error),

    /// The client never completed the WebSocket upgrade.
    #[error("websocket handshake failed: {0}")]
    Handshake(#[source] BoxError),

    #[error("send failed: {0}")]
    Send(#[source] BoxError),

    #[error("receive failed: {0}")]
    Receive(#[source] BoxError),
}

impl TransportError {
    /// `true` when the peer has already gone and retrying is pointless.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, Self::Send(_) | Self::Receive(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_error_names_the_address() {
        let err = TransportError::Bind {
            addr: "0.0.0.0:5000".into(),
            source: io::Error::from(io::ErrorKind::AddrInUse),
        };
        assert!(err.to_string().starts_with("failed to bind 0.0.0.0:5000"));
        assert!(!err.is_disconnect());
    }

    #[test]
    fn test_socket_failures_count_as_disconnects() {
        let err = TransportError::Receive("reset".into());
        assert!(err.is_disconnect());
        assert_eq!(err.to_string(), "receive failed: reset");
    }
}
