//! Per-function statistics accumulation.
//!
//! The aggregator owns the mapping from function identity to running
//! statistics. Accumulation is a running sum, so memory stays proportional
//! to the number of distinct tracked functions, never to the number of
//! invocations.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Aggregate statistics for one function identity.
///
/// **Public** - returned from snapshots, serialized into reports
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionStats {
    /// Number of completed invocations
    pub invocation_count: u64,

    /// Duration of the most recent completed invocation (milliseconds)
    pub last_duration_ms: f64,

    /// Sum of all completed invocation durations (milliseconds).
    /// Monotonically non-decreasing until an explicit reset.
    pub cumulative_duration_ms: f64,
}

impl FunctionStats {
    /// Mean duration per completed invocation
    pub fn mean_duration_ms(&self) -> f64 {
        if self.invocation_count == 0 {
            0.0
        } else {
            self.cumulative_duration_ms / self.invocation_count as f64
        }
    }
}

/// Receives a push notification per completed invocation.
///
/// **Public** - seam for a printing/logging collaborator
///
/// Called synchronously from `record`, so implementations must not block;
/// anything slow belongs behind a queue owned by the sink.
pub trait StatsSink: Send {
    /// Called after the stats for `identity` were updated
    fn on_record(&mut self, identity: &str, duration_ms: f64, stats: &FunctionStats);
}

/// Owns the FunctionIdentity -> FunctionStats mapping.
///
/// **Public** - one instance per profiling session
#[derive(Default)]
pub struct StatsAggregator {
    stats: HashMap<String, FunctionStats>,
    sink: Option<Box<dyn StatsSink>>,
}

impl StatsAggregator {
    /// Create an empty aggregator with no sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sink notified on every record.
    ///
    /// **Public** - replaces any previously registered sink
    pub fn set_sink(&mut self, sink: Box<dyn StatsSink>) {
        self.sink = Some(sink);
    }

    /// Record one completed invocation.
    ///
    /// **Public** - called by the profiler for every matched exit
    ///
    /// Creates the entry lazily on first observation, then bumps the count,
    /// sets the last duration, and adds to the running sum. Notifies the
    /// registered sink, if any, with the updated snapshot.
    pub fn record(&mut self, identity: &str, duration_ms: f64) {
        let entry = self.stats.entry(identity.to_string()).or_default();
        entry.invocation_count += 1;
        entry.last_duration_ms = duration_ms;
        entry.cumulative_duration_ms += duration_ms;

        if let Some(sink) = self.sink.as_mut() {
            // Re-borrow immutably for the notification
            if let Some(stats) = self.stats.get(identity) {
                sink.on_record(identity, duration_ms, stats);
            }
        }
    }

    /// Read-only snapshot for one identity.
    ///
    /// **Public** - absent means the function was never tracked/called
    pub fn snapshot(&self, identity: &str) -> Option<FunctionStats> {
        self.stats.get(identity).cloned()
    }

    /// Iterate all (identity, stats) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FunctionStats)> {
        self.stats.iter().map(|(name, stats)| (name.as_str(), stats))
    }

    /// Number of distinct observed identities
    pub fn len(&self) -> usize {
        self.stats.len()
    }

    /// Whether nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Sum of cumulative durations across all identities (milliseconds).
    ///
    /// Inclusive time: nested tracked calls are counted in every enclosing
    /// tracked frame, so this can exceed wall time.
    pub fn total_tracked_ms(&self) -> f64 {
        self.stats.values().map(|s| s.cumulative_duration_ms).sum()
    }

    /// Total completed invocations across all identities
    pub fn total_invocations(&self) -> u64 {
        self.stats.values().map(|s| s.invocation_count).sum()
    }

    /// Clear one entry, or all entries if `identity` is `None`.
    ///
    /// **Public** - explicit operator action only, never implicit
    pub fn reset(&mut self, identity: Option<&str>) {
        match identity {
            Some(name) => {
                debug!("Resetting stats for {}()", name);
                self.stats.remove(name);
            }
            None => {
                debug!("Resetting stats for all {} functions", self.stats.len());
                self.stats.clear();
            }
        }
    }
}

impl fmt::Debug for StatsAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatsAggregator")
            .field("stats", &self.stats)
            .field("sink", &self.sink.as_ref().map(|_| "StatsSink"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_creates_entry_lazily() {
        let mut agg = StatsAggregator::new();
        assert!(agg.snapshot("fib").is_none());

        agg.record("fib", 5.0);

        let stats = agg.snapshot("fib").unwrap();
        assert_eq!(stats.invocation_count, 1);
        assert!((stats.last_duration_ms - 5.0).abs() < 1e-9);
        assert!((stats.cumulative_duration_ms - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_record_accumulates() {
        let mut agg = StatsAggregator::new();
        agg.record("fib", 5.0);
        agg.record("fib", 3.0);

        let stats = agg.snapshot("fib").unwrap();
        assert_eq!(stats.invocation_count, 2);
        assert!((stats.last_duration_ms - 3.0).abs() < 1e-9);
        assert!((stats.cumulative_duration_ms - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_snapshot_is_idempotent() {
        let mut agg = StatsAggregator::new();
        agg.record("fib", 1.5);

        let first = agg.snapshot("fib");
        let second = agg.snapshot("fib");
        assert_eq!(first, second);
    }

    #[test]
    fn test_reset_single_entry() {
        let mut agg = StatsAggregator::new();
        agg.record("fib", 1.0);
        agg.record("main", 2.0);

        agg.reset(Some("fib"));

        assert!(agg.snapshot("fib").is_none());
        assert!(agg.snapshot("main").is_some());
    }

    #[test]
    fn test_reset_all() {
        let mut agg = StatsAggregator::new();
        agg.record("fib", 1.0);
        agg.record("main", 2.0);

        agg.reset(None);

        assert!(agg.is_empty());
    }

    #[test]
    fn test_mean_duration() {
        let mut agg = StatsAggregator::new();
        agg.record("fib", 2.0);
        agg.record("fib", 4.0);

        let stats = agg.snapshot("fib").unwrap();
        assert!((stats.mean_duration_ms() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_mean_duration_zero_invocations() {
        let stats = FunctionStats::default();
        assert_eq!(stats.mean_duration_ms(), 0.0);
    }

    struct RecordingSink {
        lines: std::sync::Arc<std::sync::Mutex<Vec<String>>>,
    }

    impl StatsSink for RecordingSink {
        fn on_record(&mut self, identity: &str, duration_ms: f64, stats: &FunctionStats) {
            self.lines.lock().unwrap().push(format!(
                "{} {} {}",
                identity, duration_ms, stats.cumulative_duration_ms
            ));
        }
    }

    #[test]
    fn test_sink_notified_per_record() {
        let lines = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut agg = StatsAggregator::new();
        agg.set_sink(Box::new(RecordingSink {
            lines: lines.clone(),
        }));

        agg.record("fib", 5.0);
        agg.record("fib", 3.0);

        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "fib 5 5");
        assert_eq!(lines[1], "fib 3 8");
    }

    #[test]
    fn test_totals() {
        let mut agg = StatsAggregator::new();
        agg.record("fib", 5.0);
        agg.record("fib", 3.0);
        agg.record("main", 10.0);

        assert_eq!(agg.len(), 2);
        assert_eq!(agg.total_invocations(), 3);
        assert!((agg.total_tracked_ms() - 18.0).abs() < 1e-9);
    }
}
