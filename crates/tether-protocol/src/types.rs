//! Core protocol types for Tether's wire format.
//!
//! The server speaks a flat JSON protocol: every frame is an envelope
//! `{"type": <int>, "data": <object>}` where the integer selects which
//! payload shape `data` carries. Field names on the wire are camelCase,
//! matching the server's JSON mapper.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A server-assigned player identifier.
///
/// Newtype over the wire's plain integer: you can't accidentally pass
/// some other counter where a player id is expected, and `0` has a
/// defined meaning — "the server hasn't told us who we are yet".
///
/// `#[serde(transparent)]` keeps the JSON a bare number, so
/// `PlayerId(7)` serializes as `7`, not `{"0":7}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub i32);

impl PlayerId {
    /// The id a client holds before its `ConnectResponse` arrives.
    pub const UNASSIGNED: PlayerId = PlayerId(0);

    /// Whether the server has assigned this id.
    pub fn is_assigned(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Message type codes
// ---------------------------------------------------------------------------

/// The message types this client knows how to interpret.
///
/// The wire carries a raw integer; [`MessageType::from_code`] maps it
/// back. Codes outside this set are valid on the wire — an [`Envelope`]
/// holds them just fine — they simply have no typed payload accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// Client → server: introduce the player (code 1).
    ConnectRequest,
    /// Server → client: assigned id and spawn position (code 2).
    ConnectResponse,
    /// Either direction: a position update (code 3).
    PlayerMove,
    /// Server → client: another player appeared (code 4).
    PlayerJoin,
    /// Server → client: a player left (code 5).
    PlayerLeave,
    /// Server → client: full snapshot of every player (code 6).
    WorldState,
    /// Either direction: a chat line (code 7).
    ChatMessage,
    /// Either direction: liveness probe and its echo (code 99).
    Heartbeat,
}

impl MessageType {
    /// The integer this type is tagged with on the wire.
    pub const fn code(self) -> i32 {
        match self {
            MessageType::ConnectRequest => 1,
            MessageType::ConnectResponse => 2,
            MessageType::PlayerMove => 3,
            MessageType::PlayerJoin => 4,
            MessageType::PlayerLeave => 5,
            MessageType::WorldState => 6,
            MessageType::ChatMessage => 7,
            MessageType::Heartbeat => 99,
        }
    }

    /// Maps a wire code back to a known type, or `None` for codes this
    /// client does not recognize.
    pub const fn from_code(code: i32) -> Option<MessageType> {
        match code {
            1 => Some(MessageType::ConnectRequest),
            2 => Some(MessageType::ConnectResponse),
            3 => Some(MessageType::PlayerMove),
            4 => Some(MessageType::PlayerJoin),
            5 => Some(MessageType::PlayerLeave),
            6 => Some(MessageType::WorldState),
            7 => Some(MessageType::ChatMessage),
            99 => Some(MessageType::Heartbeat),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Payload variants
// ---------------------------------------------------------------------------

/// First frame a client sends after the socket opens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    pub player_name: String,
}

/// The server's answer: who you are and where you spawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectResponse {
    pub player_id: PlayerId,
    pub x: f32,
    pub y: f32,
}

/// A position update for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerMove {
    pub player_id: PlayerId,
    pub x: f32,
    pub y: f32,
    pub direction: f32,
}

/// One player's state as carried in snapshots and join notices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub direction: f32,
}

/// A player joined the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerJoin {
    pub player: PlayerSnapshot,
}

/// A player left the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerLeave {
    pub player_id: PlayerId,
}

/// Full snapshot of every player, in server order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldState {
    pub players: Vec<PlayerSnapshot>,
}

/// A chat line.
///
/// The wire field is `message` (the server's name for it); the Rust
/// field is `text` to avoid "message.message" noise at call sites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub player_id: PlayerId,
    #[serde(rename = "message")]
    pub text: String,
}

/// Liveness probe. The server echoes it back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Heartbeat {
    pub player_id: PlayerId,
    /// Sender's wall-clock timestamp in milliseconds since the epoch.
    #[serde(rename = "timestamp")]
    pub timestamp_ticks: i64,
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The top-level wire wrapper. Every frame is an `Envelope`.
///
/// `data` stays an opaque [`serde_json::Value`] until a consumer asks
/// for a concrete shape with [`Envelope::payload`]. That split is what
/// lets the dispatcher route on `kind` before committing to a payload
/// type — and what lets envelopes with unrecognized codes round-trip
/// without error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// The raw wire type code. See [`MessageType`] for known values.
    #[serde(rename = "type")]
    pub kind: i32,

    /// The payload, still encoded. Decode on demand via
    /// [`Envelope::payload`].
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    /// Wraps `payload` under a known message type.
    pub fn new<T: Serialize>(
        kind: MessageType,
        payload: &T,
    ) -> Result<Self, ProtocolError> {
        Self::with_code(kind.code(), payload)
    }

    /// Wraps `payload` under a raw type code.
    ///
    /// Escape hatch for codes outside [`MessageType`] (test probes,
    /// server extensions this client predates).
    pub fn with_code<T: Serialize>(
        code: i32,
        payload: &T,
    ) -> Result<Self, ProtocolError> {
        let data = serde_json::to_value(payload).map_err(ProtocolError::Encode)?;
        Ok(Self { kind: code, data })
    }

    /// The known message type this envelope carries, or `None` for an
    /// unrecognized code.
    pub fn message_type(&self) -> Option<MessageType> {
        MessageType::from_code(self.kind)
    }

    /// Decodes the payload as `T` — the second phase of the two-phase
    /// decode.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Payload`] if the raw data does not
    /// match the requested shape.
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T, ProtocolError> {
        serde_json::from_value(self.data.clone()).map_err(|source| {
            ProtocolError::Payload {
                kind: self.kind,
                source,
            }
        })
    }

    // -- Convenience constructors for the frames a client sends --

    /// A [`ConnectRequest`] envelope.
    pub fn connect_request(player_name: &str) -> Result<Self, ProtocolError> {
        Self::new(
            MessageType::ConnectRequest,
            &ConnectRequest {
                player_name: player_name.to_owned(),
            },
        )
    }

    /// A [`PlayerMove`] envelope.
    pub fn player_move(
        player_id: PlayerId,
        x: f32,
        y: f32,
        direction: f32,
    ) -> Result<Self, ProtocolError> {
        Self::new(
            MessageType::PlayerMove,
            &PlayerMove {
                player_id,
                x,
                y,
                direction,
            },
        )
    }

    /// A [`ChatMessage`] envelope.
    pub fn chat(player_id: PlayerId, text: &str) -> Result<Self, ProtocolError> {
        Self::new(
            MessageType::ChatMessage,
            &ChatMessage {
                player_id,
                text: text.to_owned(),
            },
        )
    }

    /// A [`Heartbeat`] envelope.
    pub fn heartbeat(
        player_id: PlayerId,
        timestamp_ticks: i64,
    ) -> Result<Self, ProtocolError> {
        Self::new(
            MessageType::Heartbeat,
            &Heartbeat {
                player_id,
                timestamp_ticks,
            },
        )
    }
}

// =========================================================================
// Tests
// =========================================================================
