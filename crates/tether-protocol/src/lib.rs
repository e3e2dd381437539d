//! Wire protocol for Tether.
//!
//! This crate defines the "language" the client and the game server speak:
//!
//! - **Types** ([`Envelope`], [`MessageType`], the payload structs) —
//!   the message structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages
//!   are converted to/from text frames.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! # Two-phase decoding
//!
//! Every frame is a JSON object `{"type": <int>, "data": <object>}`.
//! Decoding a frame yields an [`Envelope`] whose `data` stays an opaque
//! JSON value; the dispatcher routes on `type` first and only then asks
//! for a concrete payload via [`Envelope::payload`]. A frame with a
//! `type` code we've never heard of still decodes cleanly — it just has
//! no typed accessor.
//!
//! The protocol layer is pure (de)serialization. It does no I/O and
//! knows nothing about connections or ticks.

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    ChatMessage, ConnectRequest, ConnectResponse, Envelope, Heartbeat,
    MessageType, PlayerId, PlayerJoin, PlayerLeave, PlayerMove,
    PlayerSnapshot, WorldState,
};
