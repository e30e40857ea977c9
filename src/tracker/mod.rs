//! Per-thread call stack tracking.
//!
//! The tracker turns raw enter/exit events into correctly nested duration
//! measurements. Each in-flight invocation gets its own frame keyed by a
//! generated [`CallId`], so recursive calls to the same function are measured
//! independently instead of sharing one global start timestamp (the classic
//! foot-gun when begin/end are matched by name alone).
//!
//! A tracker owns exactly one logical thread's stack. Multi-threaded hosts
//! create one tracker per thread; see [`crate::profiler`].

pub mod filter;

pub use filter::FilterPolicy;

use crate::clock::Clock;
use log::{debug, warn};
use std::time::Duration;

/// Unique identifier for one invocation.
///
/// **Public** - returned from `on_enter`, consumed by `on_exit`
///
/// Distinguishes concurrently open invocations of the same function.
/// `CallId::UNTRACKED` is the no-op token handed out for filtered-out
/// functions; passing it to `on_exit` is a cheap silent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallId(u64);

impl CallId {
    /// Token returned when the function is not in the tracked set
    pub const UNTRACKED: CallId = CallId(0);

    /// Whether this id refers to a tracked invocation
    pub fn is_tracked(&self) -> bool {
        self.0 != 0
    }
}

/// One in-flight invocation.
///
/// Owned exclusively by the tracker from enter to matching exit.
#[derive(Debug, Clone)]
struct CallFrame {
    identity: String,
    start: Duration,
    call_id: CallId,
}

/// A finished, matched invocation measurement.
///
/// **Public** - emitted to the stats aggregator
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedCall {
    /// Function identity the invocation belongs to
    pub identity: String,

    /// Elapsed wall time in milliseconds
    pub duration_ms: f64,
}

/// LIFO stack of open call frames for one logical thread.
///
/// **Public** - core of the profiling engine
#[derive(Debug)]
pub struct CallStackTracker<C: Clock> {
    clock: C,
    filter: FilterPolicy,
    frames: Vec<CallFrame>,
    next_call_id: u64,
    anomaly_count: u64,
}

impl<C: Clock> CallStackTracker<C> {
    /// Create a tracker over a clock and filter policy
    ///
    /// **Public** - constructor
    pub fn new(clock: C, filter: FilterPolicy) -> Self {
        Self {
            clock,
            filter,
            frames: Vec::new(),
            next_call_id: 1,
            anomaly_count: 0,
        }
    }

    /// Record a function-entered event.
    ///
    /// **Public** - instrumentation hot path
    ///
    /// # Arguments
    /// * `identity` - stable function identity (e.g. resolved symbol name)
    ///
    /// # Returns
    /// A fresh `CallId` if the function is tracked, `CallId::UNTRACKED`
    /// otherwise. The untracked path does not allocate.
    pub fn on_enter(&mut self, identity: &str) -> CallId {
        if !self.filter.is_tracked(identity) {
            return CallId::UNTRACKED;
        }

        let call_id = CallId(self.next_call_id);
        self.next_call_id += 1;

        self.frames.push(CallFrame {
            identity: identity.to_string(),
            start: self.clock.now(),
            call_id,
        });

        call_id
    }

    /// Record a function-exited event.
    ///
    /// **Public** - instrumentation hot path
    ///
    /// Pops frames until the frame with `call_id` is found and removed.
    /// Frames above it were unwound past without their own exit event
    /// (abrupt termination, exception); their measurements are discarded
    /// and counted as anomalies.
    ///
    /// # Returns
    /// The completed measurement, or `None` for the untracked token, an
    /// unmatched id, or a discarded frame. Never panics: a profiler must
    /// not be able to crash the host it measures.
    pub fn on_exit(&mut self, call_id: CallId) -> Option<CompletedCall> {
        if !call_id.is_tracked() {
            return None;
        }

        let position = self
            .frames
            .iter()
            .rposition(|frame| frame.call_id == call_id);

        let Some(position) = position else {
            // Unbalanced exit: no open frame carries this id. Discard the
            // orphaned measurement and leave the stack untouched.
            warn!(
                "Unbalanced exit: no open frame for {:?} ({} frames open)",
                call_id,
                self.frames.len()
            );
            self.anomaly_count += 1;
            return None;
        };

        // Abandon frames unwound past without an exit of their own
        while self.frames.len() > position + 1 {
            if let Some(abandoned) = self.frames.pop() {
                debug!(
                    "Discarding frame for {}() unwound past by exit of {:?}",
                    abandoned.identity, call_id
                );
                self.anomaly_count += 1;
            }
        }

        let frame = self.frames.pop()?;
        let now = self.clock.now();

        let duration = match now.checked_sub(frame.start) {
            Some(duration) => duration,
            None => {
                // Should not happen with a correct clock source; clamp
                // rather than propagate a negative duration.
                warn!(
                    "Clock ran backward during {}(); clamping duration to zero",
                    frame.identity
                );
                self.anomaly_count += 1;
                Duration::ZERO
            }
        };

        Some(CompletedCall {
            identity: frame.identity,
            duration_ms: duration.as_secs_f64() * 1_000.0,
        })
    }

    /// Replace the filter policy.
    ///
    /// **Public** - explicit reconfigure operation
    ///
    /// Frames already open under the previous policy stay tracked and close
    /// normally; only future enters see the new policy.
    pub fn set_filter(&mut self, filter: FilterPolicy) {
        self.filter = filter;
    }

    /// The tracker's clock source
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Number of currently open frames
    pub fn open_frames(&self) -> usize {
        self.frames.len()
    }

    /// Number of anomalies absorbed so far (unbalanced exits, abandoned
    /// frames, clock clamps)
    pub fn anomaly_count(&self) -> u64 {
        self.anomaly_count
    }
}
