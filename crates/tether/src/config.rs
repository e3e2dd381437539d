//! Timing configuration for the connection state machine.

use std::time::Duration;

/// Timing knobs for the session layer.
///
/// Defaults match the deployed server: it answers a connect within
/// seconds, expects a heartbeat every 15 s, and a minute of total
/// silence means the connection is dead whatever the socket claims.
/// All deadlines are wall-clock, checked once per tick.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// How long a `connect` call may stay pending before it is failed.
    /// Default: 5 s.
    pub connect_timeout: Duration,

    /// Cadence of the liveness probe while connected. Default: 15 s.
    pub heartbeat_interval: Duration,

    /// Idle time after which an Open connection is proactively torn
    /// down without waiting for heartbeats to exhaust. Default: 60 s.
    pub idle_timeout: Duration,

    /// Consecutive unacknowledged heartbeats tolerated before forced
    /// teardown. Default: 3.
    pub max_heartbeat_failures: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            heartbeat_interval: Duration::from_secs(15),
            idle_timeout: Duration::from_secs(60),
            max_heartbeat_failures: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.connect_timeout, Duration::from_secs(5));
        assert_eq!(cfg.heartbeat_interval, Duration::from_secs(15));
        assert_eq!(cfg.idle_timeout, Duration::from_secs(60));
        assert_eq!(cfg.max_heartbeat_failures, 3);
    }
}
