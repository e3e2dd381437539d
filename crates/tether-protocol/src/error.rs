//! Error types for the protocol layer.
//!
//! Each crate in Tether defines its own error enum. A `ProtocolError`
//! always means a (de)serialization problem — never networking, never
//! session state.

/// Errors that can occur while encoding or decoding messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into a frame).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (the frame is not a valid envelope).
    ///
    /// Common causes: malformed JSON, missing `type` or `data` fields,
    /// or a truncated frame.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The envelope decoded fine, but its raw payload does not match
    /// the shape requested for this message type.
    #[error("payload does not match message type {kind}: {source}")]
    Payload {
        /// The envelope's raw type code.
        kind: i32,
        /// The underlying shape mismatch.
        source: serde_json::Error,
    },
}
