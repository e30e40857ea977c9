//! Event dispatcher facade: the contract an instrumentation source drives.
//!
//! A host embeds the core by implementing scoped enter/exit notification at
//! its own instrumentation boundary (interpreter hook, binary rewriting,
//! manual annotations) and forwarding the events here. The host must call
//! `on_exit` exactly once per successful `on_enter`, on every exit path —
//! normal return, thrown error, or early return. The core side never raises
//! back through this boundary.

use crate::aggregator::{FunctionStats, StatsAggregator, StatsSink};
use crate::clock::Clock;
use crate::tracker::{CallId, CallStackTracker, FilterPolicy};
use log::warn;
use std::sync::{Arc, Mutex};

/// Capability set required of any instrumentation source.
///
/// **Public** - the narrow seam between host and core
pub trait CallObserver {
    /// Notify that a function body is about to execute
    fn on_enter(&mut self, identity: &str) -> CallId;

    /// Notify that the invocation identified by `call_id` has exited
    fn on_exit(&mut self, call_id: CallId);
}

/// Aggregator shared across per-thread profilers.
///
/// **Public** - query/sink boundary exposed to the host
///
/// Multiple threads may record concurrently, so the mapping sits behind a
/// mutex; each lock is held only for one hash-map update.
#[derive(Clone, Default)]
pub struct SharedStats {
    inner: Arc<Mutex<StatsAggregator>>,
}

impl SharedStats {
    /// Create an empty shared aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed invocation
    pub fn record(&self, identity: &str, duration_ms: f64) {
        match self.inner.lock() {
            Ok(mut agg) => agg.record(identity, duration_ms),
            // A poisoned lock means another thread panicked mid-update;
            // dropping one measurement beats crashing the host.
            Err(_) => warn!("Stats aggregator lock poisoned; dropping measurement"),
        }
    }

    /// Read-only snapshot for one identity; absent if never observed
    pub fn snapshot(&self, identity: &str) -> Option<FunctionStats> {
        self.inner.lock().ok().and_then(|agg| agg.snapshot(identity))
    }

    /// Register a sink notified synchronously on every record
    pub fn set_sink(&self, sink: Box<dyn StatsSink>) {
        if let Ok(mut agg) = self.inner.lock() {
            agg.set_sink(sink);
        }
    }

    /// Clear one entry, or all entries. Explicit operator action only.
    pub fn reset(&self, identity: Option<&str>) {
        if let Ok(mut agg) = self.inner.lock() {
            agg.reset(identity);
        }
    }

    /// Run a closure against the locked aggregator (reporting, totals)
    pub fn with<R>(&self, f: impl FnOnce(&StatsAggregator) -> R) -> Option<R> {
        self.inner.lock().ok().map(|agg| f(&agg))
    }
}

/// Per-thread profiling facade: one call stack plus the shared aggregator.
///
/// **Public** - implements [`CallObserver`] for the host to drive
///
/// Single-threaded hosts use one profiler. Multi-threaded hosts call
/// [`CallProfiler::fork`] once per thread so every thread owns its own
/// stack and nesting order can never be corrupted across threads.
pub struct CallProfiler<C: Clock> {
    tracker: CallStackTracker<C>,
    stats: SharedStats,
}

impl<C: Clock> CallProfiler<C> {
    /// Create a profiler with its own fresh aggregator
    pub fn new(clock: C, filter: FilterPolicy) -> Self {
        Self::with_stats(clock, filter, SharedStats::new())
    }

    /// Create a profiler recording into an existing shared aggregator
    pub fn with_stats(clock: C, filter: FilterPolicy, stats: SharedStats) -> Self {
        Self {
            tracker: CallStackTracker::new(clock, filter),
            stats,
        }
    }

    /// Create a sibling profiler for another logical thread.
    ///
    /// **Public** - the fork shares this profiler's aggregator and clock
    /// but owns an independent call stack.
    pub fn fork(&self, filter: FilterPolicy) -> Self
    where
        C: Clone,
    {
        Self {
            tracker: CallStackTracker::new(self.tracker.clock().clone(), filter),
            stats: self.stats.clone(),
        }
    }

    /// Handle to the shared aggregator (query/sink boundary)
    pub fn stats(&self) -> &SharedStats {
        &self.stats
    }

    /// Replace the tracked-function filter for this thread's tracker
    pub fn set_filter(&mut self, filter: FilterPolicy) {
        self.tracker.set_filter(filter);
    }

    /// Anomalies absorbed by this thread's tracker
    pub fn anomaly_count(&self) -> u64 {
        self.tracker.anomaly_count()
    }

    /// Frames currently open on this thread
    pub fn open_frames(&self) -> usize {
        self.tracker.open_frames()
    }
}

impl<C: Clock> CallObserver for CallProfiler<C> {
    fn on_enter(&mut self, identity: &str) -> CallId {
        self.tracker.on_enter(identity)
    }

    fn on_exit(&mut self, call_id: CallId) {
        if let Some(call) = self.tracker.on_exit(call_id) {
            self.stats.record(&call.identity, call.duration_ms);
        }
    }
}
