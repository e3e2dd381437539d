//! Tests for the fixed-rate tick scheduler.
//!
//! The async tests run with `start_paused = true` so tokio auto-advances
//! the clock and `wait_for_tick` resolves deterministically.

use std::time::Duration;

use tether_tick::{TickConfig, TickScheduler};

// =========================================================================
// TickConfig
// =========================================================================

#[test]
fn test_default_rate_is_30hz() {
    let cfg = TickConfig::default();
    assert_eq!(cfg.rate_hz, 30);
}

#[test]
fn test_tick_duration_20hz() {
    let cfg = TickConfig::with_rate(20);
    assert_eq!(cfg.tick_duration(), Duration::from_millis(50));
}

#[test]
fn test_tick_duration_60hz() {
    let cfg = TickConfig::with_rate(60);
    assert_eq!(cfg.tick_duration(), Duration::from_secs_f64(1.0 / 60.0));
}

#[test]
fn test_validated_clamps_zero_rate() {
    let cfg = TickConfig::with_rate(0).validated();
    assert_eq!(cfg.rate_hz, 1);
}

#[test]
fn test_validated_clamps_excessive_rate() {
    let cfg = TickConfig::with_rate(100_000).validated();
    assert_eq!(cfg.rate_hz, TickConfig::MAX_RATE_HZ);
}

// =========================================================================
// TickScheduler
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_scheduler_initial_state() {
    let scheduler = TickScheduler::with_rate(20);
    assert_eq!(scheduler.tick_count(), 0);
    assert_eq!(scheduler.rate_hz(), 20);
    assert_eq!(scheduler.tick_duration(), Duration::from_millis(50));
}

#[tokio::test(start_paused = true)]
async fn test_ticks_number_from_one() {
    let mut scheduler = TickScheduler::with_rate(20);
    let first = scheduler.wait_for_tick().await;
    assert_eq!(first.tick, 1);
    assert_eq!(first.dt, Duration::from_millis(50));

    let second = scheduler.wait_for_tick().await;
    assert_eq!(second.tick, 2);
    assert_eq!(scheduler.tick_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_dt_is_fixed_across_ticks() {
    let mut scheduler = TickScheduler::with_rate(64);
    let dt = scheduler.tick_duration();
    for _ in 0..10 {
        let info = scheduler.wait_for_tick().await;
        assert_eq!(info.dt, dt);
    }
}

#[tokio::test(start_paused = true)]
async fn test_invalid_rate_is_clamped_on_construction() {
    let scheduler = TickScheduler::with_rate(0);
    assert_eq!(scheduler.rate_hz(), 1);

    let scheduler = TickScheduler::with_rate(100_000);
    assert_eq!(scheduler.rate_hz(), TickConfig::MAX_RATE_HZ);
}
