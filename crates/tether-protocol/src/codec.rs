//! Codec trait and implementations for (de)serializing envelopes.
//!
//! A codec converts between [`Envelope`]s and the text frames the
//! transport carries. The session layer doesn't care HOW frames are
//! serialized — it just needs something that implements [`Codec`], so a
//! future binary codec can slot in without touching the state machine.

use crate::{Envelope, ProtocolError};

/// Encodes envelopes to text frames and decodes them back.
///
/// `Send + Sync + 'static` because a codec may be held by types that
/// cross thread boundaries; implementations are expected to be
/// stateless values.
pub trait Codec: Send + Sync + 'static {
    /// Serializes an envelope into one text frame.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    fn encode(&self, envelope: &Envelope) -> Result<String, ProtocolError>;

    /// Parses one text frame into an envelope.
    ///
    /// Succeeds for any well-formed `{"type", "data"}` object, even
    /// when the type code is unrecognized — routing on unknown codes is
    /// the dispatcher's problem, not the codec's.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the frame is malformed.
    fn decode(&self, frame: &str) -> Result<Envelope, ProtocolError>;
}

/// A [`Codec`] that speaks the server's JSON wire format.
///
/// ## Example
///
/// ```rust
/// use tether_protocol::{Codec, Envelope, JsonCodec, PlayerId};
///
/// let codec = JsonCodec;
/// let envelope = Envelope::chat(PlayerId(7), "hello").unwrap();
///
/// let frame = codec.encode(&envelope).unwrap();
/// let decoded = codec.decode(&frame).unwrap();
/// assert_eq!(envelope, decoded);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode(&self, envelope: &Envelope) -> Result<String, ProtocolError> {
        serde_json::to_string(envelope).map_err(ProtocolError::Encode)
    }

    fn decode(&self, frame: &str) -> Result<Envelope, ProtocolError> {
        serde_json::from_str(frame).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MessageType, PlayerId};
    use serde_json::json;

    #[test]
    fn test_encode_produces_wire_shape() {
        let envelope = Envelope::heartbeat(PlayerId(7), 1234).unwrap();
        let frame = JsonCodec.encode(&envelope).unwrap();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["type"], 99);
        assert_eq!(value["data"]["playerId"], 7);
        assert_eq!(value["data"]["timestamp"], 1234);
    }

    #[test]
    fn test_decode_known_frame() {
        let envelope = JsonCodec
            .decode(r#"{"type":7,"data":{"playerId":3,"message":"hi"}}"#)
            .unwrap();
        assert_eq!(envelope.message_type(), Some(MessageType::ChatMessage));
    }

    #[test]
    fn test_decode_unknown_type_succeeds() {
        let envelope = JsonCodec
            .decode(r#"{"type":1000,"data":{"whatever":1}}"#)
            .unwrap();
        assert_eq!(envelope.kind, 1000);
        assert_eq!(envelope.message_type(), None);
    }

    #[test]
    fn test_decode_garbage_is_an_error() {
        let result = JsonCodec.decode("not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_wrong_shape_is_an_error() {
        // Valid JSON, but not an envelope.
        let result = JsonCodec.decode(r#"{"name":"hello"}"#);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_round_trip_law() {
        let envelopes = vec![
            Envelope::connect_request("Alice").unwrap(),
            Envelope::player_move(PlayerId(7), 1.5, -2.0, 0.25).unwrap(),
            Envelope::chat(PlayerId(7), "hello").unwrap(),
            Envelope::heartbeat(PlayerId(7), 9999).unwrap(),
            // Unknown type code, still must round-trip.
            Envelope {
                kind: 42,
                data: json!({ "mystery": [1, 2, 3] }),
            },
        ];
        for envelope in envelopes {
            let frame = JsonCodec.encode(&envelope).unwrap();
            let decoded = JsonCodec.decode(&frame).unwrap();
            assert_eq!(envelope, decoded);
        }
    }
}
