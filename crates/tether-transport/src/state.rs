//! Lock-free state sharing between the I/O side and the tick thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::TransportState;

/// A shared cell holding the current [`TransportState`].
///
/// The I/O task writes transitions, the tick thread reads them; an
/// atomic keeps both sides wait-free. Cloning shares the cell.
#[derive(Clone)]
pub struct StateCell {
    inner: Arc<AtomicU8>,
}

impl StateCell {
    /// Creates a cell holding `state`.
    pub fn new(state: TransportState) -> Self {
        Self {
            inner: Arc::new(AtomicU8::new(state as u8)),
        }
    }

    /// Reads the current state.
    pub fn get(&self) -> TransportState {
        match self.inner.load(Ordering::Acquire) {
            0 => TransportState::Connecting,
            1 => TransportState::Open,
            2 => TransportState::Closing,
            _ => TransportState::Closed,
        }
    }

    /// Publishes a new state.
    pub fn set(&self, state: TransportState) {
        self.inner.store(state as u8, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trips_every_state() {
        let cell = StateCell::new(TransportState::Connecting);
        for state in [
            TransportState::Connecting,
            TransportState::Open,
            TransportState::Closing,
            TransportState::Closed,
        ] {
            cell.set(state);
            assert_eq!(cell.get(), state);
        }
    }

    #[test]
    fn test_clone_shares_the_cell() {
        let cell = StateCell::new(TransportState::Connecting);
        let writer = cell.clone();
        writer.set(TransportState::Open);
        assert_eq!(cell.get(), TransportState::Open);
    }
}
