//! Fixed-rate tick scheduler for the Tether client loop.
//!
//! The session layer is poll-driven: something has to call
//! `GameClient::poll` at a steady cadence. [`TickScheduler`] provides
//! that cadence on top of a tokio interval.
//!
//! Late ticks are skipped rather than replayed — the client re-reads
//! its wall-clock deadlines on every tick, so a burst of catch-up
//! ticks would observe the same deadlines and do the same work twice.
//!
//! # Integration
//!
//! ```ignore
//! let mut scheduler = TickScheduler::with_rate(30);
//! loop {
//!     scheduler.wait_for_tick().await;
//!     client.poll();
//! }
//! ```

use std::time::Duration;

use tokio::time::{self, Interval, MissedTickBehavior};
use tracing::{debug, trace, warn};

/// Configuration for the tick scheduler.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Tick rate in Hz. Clamped to `1..=`[`TickConfig::MAX_RATE_HZ`].
    pub rate_hz: u32,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self { rate_hz: 30 }
    }
}

impl TickConfig {
    /// Maximum supported tick rate.
    pub const MAX_RATE_HZ: u32 = 128;

    /// Creates a config for a specific tick rate.
    pub fn with_rate(rate_hz: u32) -> Self {
        Self { rate_hz }
    }

    /// Clamps out-of-range rates so the config is always usable.
    ///
    /// Called automatically by [`TickScheduler::new`].
    pub fn validated(mut self) -> Self {
        if self.rate_hz == 0 {
            warn!("rate_hz of 0 is not allowed for a client loop — using 1");
            self.rate_hz = 1;
        }
        if self.rate_hz > Self::MAX_RATE_HZ {
            warn!(
                rate = self.rate_hz,
                max = Self::MAX_RATE_HZ,
                "rate_hz exceeds maximum — clamping"
            );
            self.rate_hz = Self::MAX_RATE_HZ;
        }
        self
    }

    /// Duration of a single tick.
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.rate_hz.max(1) as f64)
    }
}

/// Information about a fired tick, returned by
/// [`TickScheduler::wait_for_tick`].
#[derive(Debug, Clone, Copy)]
pub struct TickInfo {
    /// Monotonically increasing tick number (starts at 1).
    pub tick: u64,
    /// Fixed delta time for this tick (always `1 / rate_hz`).
    pub dt: Duration,
}

/// Fixed-rate tick scheduler.
///
/// One scheduler drives one client loop. Missed ticks are skipped, not
/// replayed.
pub struct TickScheduler {
    config: TickConfig,
    interval: Interval,
    tick_count: u64,
    dt: Duration,
}

impl TickScheduler {
    /// Creates a scheduler from config. The first tick fires one full
    /// period after creation.
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        let dt = config.tick_duration();

        let mut interval = time::interval_at(time::Instant::now() + dt, dt);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        debug!(rate_hz = config.rate_hz, "tick scheduler created");

        Self {
            config,
            interval,
            tick_count: 0,
            dt,
        }
    }

    /// Creates a scheduler for a specific tick rate.
    pub fn with_rate(rate_hz: u32) -> Self {
        Self::new(TickConfig::with_rate(rate_hz))
    }

    /// Waits until the next tick is due.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        self.interval.tick().await;
        self.tick_count += 1;
        trace!(tick = self.tick_count, "tick fired");
        TickInfo {
            tick: self.tick_count,
            dt: self.dt,
        }
    }

    /// Ticks fired so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// The configured tick rate in Hz.
    pub fn rate_hz(&self) -> u32 {
        self.config.rate_hz
    }

    /// The fixed tick duration.
    pub fn tick_duration(&self) -> Duration {
        self.dt
    }
}
