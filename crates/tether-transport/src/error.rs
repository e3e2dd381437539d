//! Error type for the transport crate.

/// Errors surfaced by transports and connectors.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The server address could not be turned into a valid request.
    #[error("invalid server address: {0}")]
    InvalidUrl(String),

    /// The connection is gone; the frame was not queued.
    #[error("transport closed")]
    Closed,
}
