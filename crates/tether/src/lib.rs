//! # Tether
//!
//! Client-side session layer for realtime multiplayer games: a
//! connection state machine, a typed JSON message protocol, queued
//! delivery, and heartbeat-based liveness, all driven by a single
//! `poll` call per game tick.
//!
//! The [`GameClient`] never blocks and never surprises the game loop:
//! connects are initiated and resolved asynchronously, failures arrive
//! as [`ClientEvent`]s, and a connection that goes quiet is torn down
//! by the heartbeat and idle guards rather than left hanging.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use tether::prelude::*;
//!
//! let mut client = GameClient::new(ClientConfig::default());
//! client.subscribe(EventKind::Connected, |_| {
//!     println!("connected!");
//! });
//! client.connect("localhost:8080", "Alice").ok();
//!
//! loop {
//!     for event in client.poll() {
//!         if let ClientEvent::MessageReceived(envelope) = event {
//!             println!("got message type {}", envelope.kind);
//!         }
//!     }
//!     // ... render, read input, sleep until the next tick ...
//! }
//! ```
//!
//! # Crates
//!
//! - `tether` (this crate) — the state machine and event bus
//! - `tether-protocol` — envelopes, payload types, the JSON codec
//! - `tether-transport` — the poll-oriented transport seam and its
//!   WebSocket implementation
//! - `tether-tick` — a fixed-rate tick scheduler for hosts without a
//!   game loop of their own

mod client;
mod config;
mod error;
mod events;

pub use client::GameClient;
pub use config::ClientConfig;
pub use error::ClientError;
pub use events::{ClientEvent, EventBus, EventKind, SubscriptionId};

/// Everything a typical consumer needs, in one import.
pub mod prelude {
    pub use crate::{
        ClientConfig, ClientError, ClientEvent, EventKind, GameClient,
        SubscriptionId,
    };
    pub use tether_protocol::{
        ChatMessage, Codec, ConnectRequest, ConnectResponse, Envelope, Heartbeat,
        JsonCodec, MessageType, PlayerId, PlayerJoin, PlayerLeave, PlayerMove,
        PlayerSnapshot, WorldState,
    };
    pub use tether_transport::TransportState;
}
