//! Monotonic clock sources for duration measurement.
//!
//! Durations must come from a steady clock, never calendar time and never
//! process-CPU time: CPU time undercounts calls that block or wait on I/O.
//! Timestamps are offsets from the clock's own origin, so only differences
//! between two readings of the same clock are meaningful.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A monotonic time source.
///
/// **Public** - seam between the tracker and the host's notion of time
///
/// Implementations must never run backward across calls on the same thread.
/// Resolution must be at least milliseconds.
pub trait Clock {
    /// Current offset from the clock's origin.
    fn now(&self) -> Duration;
}

/// Production clock backed by `std::time::Instant`.
///
/// **Public** - default clock for live instrumentation
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Create a clock whose origin is "now"
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-advanced clock for replay and tests.
///
/// **Public** - used by the event-log replayer to reproduce recorded time
///
/// Clones share the same underlying time cell, so one clone can drive the
/// clock while trackers forked onto other logical threads read it.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock at t=0
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock to an absolute offset in milliseconds.
    ///
    /// Negative or backward inputs are clamped so the clock stays monotonic;
    /// the tracker additionally clamps any duration that would still come
    /// out negative.
    pub fn set_millis(&self, millis: f64) {
        let nanos = if millis <= 0.0 {
            0
        } else {
            (millis * 1_000_000.0) as u64
        };
        self.nanos.fetch_max(nanos, Ordering::SeqCst);
    }

    /// Advance the clock by a delta
    pub fn advance(&self, delta: Duration) {
        self.nanos
            .fetch_add(delta.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_clock_never_decreases() {
        let clock = MonotonicClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn test_manual_clock_set_and_read() {
        let clock = ManualClock::new();
        assert_eq!(clock.now(), Duration::ZERO);

        clock.set_millis(5.0);
        assert_eq!(clock.now(), Duration::from_millis(5));
    }

    #[test]
    fn test_manual_clock_clamps_backward_moves() {
        let clock = ManualClock::new();
        clock.set_millis(10.0);
        clock.set_millis(3.0);
        assert_eq!(clock.now(), Duration::from_millis(10));
    }

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let clone = clock.clone();
        clock.advance(Duration::from_millis(7));
        assert_eq!(clone.now(), Duration::from_millis(7));
    }

    #[test]
    fn test_manual_clock_negative_millis_clamped() {
        let clock = ManualClock::new();
        clock.set_millis(-1.0);
        assert_eq!(clock.now(), Duration::ZERO);
    }
}
