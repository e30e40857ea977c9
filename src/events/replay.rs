//! Drive recorded events through the profiling core.
//!
//! The replayer is an instrumentation source in its own right: it plays a
//! captured event log against per-thread call stack trackers, advancing a
//! manual clock to each event's recorded timestamp so durations come out
//! exactly as they were measured live.

use super::schema::TraceEvent;
use crate::aggregator::{CollapsedStack, StackProfileBuilder, StatsAggregator, StatsSink};
use crate::clock::ManualClock;
use crate::tracker::{CallId, CallStackTracker, FilterPolicy};
use log::{debug, warn};
use std::collections::HashMap;
use std::time::Duration;

/// Everything a replay run produces.
///
/// **Public** - consumed by the replay command and tests
pub struct ReplayOutcome {
    /// Per-function statistics accumulated over the run
    pub aggregator: StatsAggregator,

    /// Self-time collapsed stacks for flamegraph generation
    pub stacks: Vec<CollapsedStack>,

    /// Anomalies absorbed (unbalanced exits, frames left open at EOF)
    pub anomaly_count: u64,

    /// Number of events replayed
    pub events_replayed: usize,
}

/// Per-thread replay state: the tracker plus the ids it handed out,
/// in nesting order, so exit events can be matched LIFO.
///
/// Each thread drives its own clock; the recording only guarantees
/// monotonic timestamps per thread, not across threads.
struct ThreadReplay {
    clock: ManualClock,
    tracker: CallStackTracker<ManualClock>,
    open_calls: Vec<(CallId, String)>,
}

impl ThreadReplay {
    fn new(filter: FilterPolicy) -> Self {
        let clock = ManualClock::new();
        Self {
            tracker: CallStackTracker::new(clock.clone(), filter),
            clock,
            open_calls: Vec::new(),
        }
    }
}

/// Replay an event log through the profiling core
///
/// **Public** - main entry point for the replay pipeline
///
/// # Arguments
/// * `events` - Validated events in recorded order
/// * `filter` - Which function identities to track
/// * `sink` - Optional per-call notification (e.g., live echo to stdout)
///
/// # Returns
/// Aggregated statistics, collapsed stacks, and anomaly counts
pub fn replay_events(
    events: &[TraceEvent],
    filter: &FilterPolicy,
    sink: Option<Box<dyn StatsSink>>,
) -> ReplayOutcome {
    let mut aggregator = StatsAggregator::new();
    if let Some(sink) = sink {
        aggregator.set_sink(sink);
    }

    let mut stack_builder = StackProfileBuilder::new();
    let mut threads: HashMap<u64, ThreadReplay> = HashMap::new();
    let mut replay_anomalies: u64 = 0;

    for event in events {
        let thread_id = event.thread();
        let thread = threads
            .entry(thread_id)
            .or_insert_with(|| ThreadReplay::new(filter.clone()));

        // Recorded timestamps drive this thread's measurement clock
        thread.clock.set_millis(event.ts_ms());

        match event {
            TraceEvent::Enter { function, .. } => {
                let call_id = thread.tracker.on_enter(function);
                thread.open_calls.push((call_id, function.clone()));
                if call_id.is_tracked() {
                    stack_builder.on_enter(thread_id, function);
                }
            }
            TraceEvent::Exit { function, .. } => {
                let Some((call_id, entered_as)) = thread.open_calls.pop() else {
                    warn!(
                        "Exit for {}() on thread {} with no open call",
                        function, thread_id
                    );
                    replay_anomalies += 1;
                    continue;
                };

                if entered_as != *function {
                    // Diagnostic only: matching is positional, by frame
                    debug!(
                        "Exit names {}() but innermost open call is {}()",
                        function, entered_as
                    );
                }

                if let Some(call) = thread.tracker.on_exit(call_id) {
                    stack_builder.on_exit(
                        thread_id,
                        Duration::from_secs_f64(call.duration_ms / 1_000.0),
                    );
                    aggregator.record(&call.identity, call.duration_ms);
                }
            }
        }
    }

    // Enters that never saw an exit leak their frames; count and discard
    let mut anomaly_count = replay_anomalies;
    for (thread_id, thread) in &threads {
        let leaked = thread.tracker.open_frames();
        if leaked > 0 {
            warn!(
                "{} call(s) still open on thread {} at end of log; discarding",
                leaked, thread_id
            );
            anomaly_count += leaked as u64;
            stack_builder.abandon_open_frames(*thread_id);
        }
        anomaly_count += thread.tracker.anomaly_count();
    }

    let stacks = stack_builder.finish();

    debug!(
        "Replayed {} events across {} thread(s): {} function(s), {} anomalies",
        events.len(),
        threads.len(),
        aggregator.len(),
        anomaly_count
    );

    ReplayOutcome {
        aggregator,
        stacks,
        anomaly_count,
        events_replayed: events.len(),
    }
}
