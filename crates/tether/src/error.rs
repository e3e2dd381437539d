//! Unified error type for the client crate.

use tether_protocol::ProtocolError;
use tether_transport::TransportError;

/// Top-level error that wraps the sub-crate errors.
///
/// Only two operations return errors synchronously — `connect` (address
/// validation) and the typed `send_message` (payload serialization).
/// Everything else reports through the event stream.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A transport-level error (bad address, closed connection).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, payload mismatch).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::InvalidUrl("nope".into());
        let client_err: ClientError = err.into();
        assert!(matches!(client_err, ClientError::Transport(_)));
        assert!(client_err.to_string().contains("nope"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = serde_json::from_str::<tether_protocol::Envelope>("garbage")
            .map_err(ProtocolError::Decode)
            .unwrap_err();
        let client_err: ClientError = err.into();
        assert!(matches!(client_err, ClientError::Protocol(_)));
    }
}
