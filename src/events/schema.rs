//! Event log and report schema definitions.
//!
//! Input side: the `TraceEvent` records an instrumentation source writes
//! when capturing a run. Output side: the structure of report JSON files we
//! write to disk. The report schema is versioned to allow future evolution.

use serde::{Deserialize, Serialize};

/// One recorded instrumentation event.
///
/// Written by the external event source, read back by the replayer.
/// `thread` separates logical execution threads so nesting is matched
/// per thread; single-threaded sources can omit it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    /// A function body is about to execute
    Enter {
        /// Stable function identity (e.g., resolved symbol name)
        function: String,

        /// Timestamp in milliseconds from the recording clock's origin
        ts_ms: f64,

        /// Logical thread the call ran on
        #[serde(default)]
        thread: u64,
    },

    /// The most recent unmatched enter on this thread has returned
    Exit {
        /// Function identity, used to cross-check nesting
        function: String,

        /// Timestamp in milliseconds from the recording clock's origin
        ts_ms: f64,

        /// Logical thread the call ran on
        #[serde(default)]
        thread: u64,
    },
}

impl TraceEvent {
    /// Timestamp of the event in milliseconds
    pub fn ts_ms(&self) -> f64 {
        match self {
            Self::Enter { ts_ms, .. } | Self::Exit { ts_ms, .. } => *ts_ms,
        }
    }

    /// Logical thread of the event
    pub fn thread(&self) -> u64 {
        match self {
            Self::Enter { thread, .. } | Self::Exit { thread, .. } => *thread,
        }
    }

    /// Function identity the event refers to
    pub fn function(&self) -> &str {
        match self {
            Self::Enter { function, .. } | Self::Exit { function, .. } => function,
        }
    }
}

/// Top-level report structure written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Schema version for compatibility checking
    pub version: String,

    /// Where the events came from (e.g., event log path)
    pub source: String,

    /// Total completed invocations across all tracked functions
    pub total_calls: u64,

    /// Sum of cumulative durations across functions (milliseconds).
    /// Inclusive time; nested tracked calls count in every enclosing frame.
    pub total_tracked_ms: f64,

    /// Anomalies absorbed during the run (unbalanced exits, clock clamps)
    pub anomaly_count: u64,

    /// Per-function rows, ranked by cumulative duration (descending)
    pub functions: Vec<FunctionEntry>,

    /// Timestamp when the report was generated (RFC 3339)
    pub generated_at: String,
}

/// One function's row in the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionEntry {
    /// Function identity
    pub name: String,

    /// Number of completed invocations
    pub invocation_count: u64,

    /// Duration of the most recent invocation (milliseconds)
    pub last_duration_ms: f64,

    /// Sum of all invocation durations (milliseconds)
    pub cumulative_duration_ms: f64,

    /// Mean duration per invocation (milliseconds)
    pub mean_duration_ms: f64,

    /// Percentage of total tracked time
    pub percentage: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_round_trips_through_json() {
        let event = TraceEvent::Enter {
            function: "fib".to_string(),
            ts_ms: 1.5,
            thread: 2,
        };

        let json = serde_json::to_string(&event).unwrap();
        let back: TraceEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_thread_defaults_to_zero() {
        let event: TraceEvent =
            serde_json::from_str(r#"{"event":"exit","function":"fib","ts_ms":5.0}"#).unwrap();
        assert_eq!(event.thread(), 0);
        assert_eq!(event.function(), "fib");
        assert!((event.ts_ms() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_event_kind_rejected() {
        let result: Result<TraceEvent, _> =
            serde_json::from_str(r#"{"event":"suspend","function":"fib","ts_ms":5.0}"#);
        assert!(result.is_err());
    }
}
