//! Transport seam for Tether.
//!
//! The session layer is driven by a tick loop and must never block, so
//! the transport it talks to is *poll-oriented*: every method returns
//! immediately, and the actual socket I/O runs wherever the
//! implementation likes (the WebSocket one uses a background tokio
//! task). The tick thread and the I/O side share nothing but a state
//! cell and FIFO queues.
//!
//! - [`Transport`] — one live connection, inspected and drained per tick.
//! - [`Connector`] — opens transports; the dependency-injection point
//!   that lets tests substitute scripted connections.
//! - [`SharedQueue`] — the thread-safe FIFO crossing the I/O boundary.
//!
//! # Feature Flags
//!
//! - `websocket` (default) — WebSocket transport via `tokio-tungstenite`

mod error;
mod queue;
mod state;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
pub use queue::SharedQueue;
pub use state::StateCell;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketTransport, WsConnector};

use std::fmt;

/// Ready state of a transport.
///
/// A client with no transport at all is simply idle; these are the
/// states a *held* transport can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TransportState {
    /// The connection attempt is in flight.
    Connecting = 0,
    /// Frames can be sent and received.
    Open = 1,
    /// An orderly close is underway.
    Closing = 2,
    /// The connection is gone. Terminal — a transport never reopens.
    Closed = 3,
}

impl TransportState {
    /// Whether the transport is closing or already closed.
    pub fn is_terminal(self) -> bool {
        matches!(self, TransportState::Closing | TransportState::Closed)
    }
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportState::Connecting => "connecting",
            TransportState::Open => "open",
            TransportState::Closing => "closing",
            TransportState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// A text-frame connection to the game server, driven by polling.
///
/// Mirrors a polled WebSocket peer: the tick thread asks for the
/// current state and drains whole frames, and nothing here ever waits
/// for the I/O side. One transport serves exactly one connection
/// attempt; after [`TransportState::Closed`] it is only good for
/// dropping.
pub trait Transport: Send + 'static {
    /// The current ready state.
    fn state(&self) -> TransportState;

    /// How many received frames are waiting to be taken.
    fn buffered(&self) -> usize;

    /// Takes the oldest buffered frame, if any.
    fn try_receive(&mut self) -> Option<String>;

    /// Queues one text frame for delivery.
    ///
    /// # Errors
    /// Returns [`TransportError::Closed`] if the connection is already
    /// gone and the frame was not queued.
    fn send_text(&mut self, frame: String) -> Result<(), TransportError>;

    /// Requests an orderly close. Safe to call in any state.
    fn close(&mut self);
}

/// Opens fresh transports.
///
/// Each `connect` call on the session layer gets a brand-new transport
/// through this trait — handles are never reused across reconnects.
pub trait Connector: Send {
    /// Starts opening a connection to `url`.
    ///
    /// # Errors
    /// Fails synchronously only when the address itself is rejected;
    /// everything that happens after initiation is reported through
    /// [`Transport::state`].
    fn open(&self, url: &str) -> Result<Box<dyn Transport>, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!TransportState::Connecting.is_terminal());
        assert!(!TransportState::Open.is_terminal());
        assert!(TransportState::Closing.is_terminal());
        assert!(TransportState::Closed.is_terminal());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(TransportState::Connecting.to_string(), "connecting");
        assert_eq!(TransportState::Closed.to_string(), "closed");
    }
}
