//! Build collapsed stack format from completed call measurements.
//!
//! Collapsed stacks are the input format for flamegraph generation.
//! Format: "parent;child;grandchild weight"
//!
//! Example: "main;fib;fib 1000"
//! This means: main called fib which called fib recursively, and the inner
//! frame spent 1000 microseconds of its own (self) time.

use log::debug;
use std::collections::HashMap;
use std::time::Duration;

/// A single collapsed stack entry
///
/// **Public** - used by flamegraph generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapsedStack {
    /// Stack trace as semicolon-separated string
    pub stack: String,

    /// Weight (self time of this path, microseconds)
    pub weight_us: u64,
}

impl CollapsedStack {
    /// Create a new collapsed stack
    pub fn new(stack: String, weight_us: u64) -> Self {
        Self { stack, weight_us }
    }
}

/// Open frame on one thread's path, with child time accumulated so far
#[derive(Debug)]
struct PathFrame {
    name: String,
    child_time: Duration,
}

/// Accumulates self-time per unique call path as frames open and close.
///
/// **Public** - fed by the replayer alongside the stats aggregator
///
/// Self time is the frame's duration minus the time spent in its (tracked)
/// children, so stacked weights sum correctly in a flamegraph instead of
/// double-counting nested calls.
#[derive(Debug, Default)]
pub struct StackProfileBuilder {
    /// Open path per logical thread
    threads: HashMap<u64, Vec<PathFrame>>,

    /// Aggregated weights: stack string -> self time
    weights: HashMap<String, Duration>,
}

impl StackProfileBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a tracked frame opening on `thread`
    pub fn on_enter(&mut self, thread: u64, name: &str) {
        self.threads.entry(thread).or_default().push(PathFrame {
            name: name.to_string(),
            child_time: Duration::ZERO,
        });
    }

    /// Record the innermost frame on `thread` closing with `duration`.
    ///
    /// Unbalanced exits (no open frame) are ignored; the tracker already
    /// diagnosed them.
    pub fn on_exit(&mut self, thread: u64, duration: Duration) {
        let Some(path) = self.threads.get_mut(&thread) else {
            return;
        };
        let Some(frame) = path.pop() else {
            return;
        };

        let self_time = duration.saturating_sub(frame.child_time);

        let stack = if path.is_empty() {
            frame.name
        } else {
            let mut stack = path
                .iter()
                .map(|f| f.name.as_str())
                .collect::<Vec<_>>()
                .join(";");
            stack.push(';');
            stack.push_str(&frame.name);
            stack
        };

        *self.weights.entry(stack).or_default() += self_time;

        // Attribute this frame's full duration to the parent as child time
        if let Some(parent) = path.last_mut() {
            parent.child_time += duration;
        }
    }

    /// Discard any frames left open on `thread` (unwound past, never exited)
    pub fn abandon_open_frames(&mut self, thread: u64) {
        if let Some(path) = self.threads.get_mut(&thread) {
            path.clear();
        }
    }

    /// Convert accumulated weights to a vector sorted by weight (descending)
    ///
    /// **Public** - terminal operation, consumes the builder
    pub fn finish(self) -> Vec<CollapsedStack> {
        let mut stacks: Vec<CollapsedStack> = self
            .weights
            .into_iter()
            .map(|(stack, weight)| CollapsedStack::new(stack, weight.as_micros() as u64))
            .collect();

        stacks.sort_by(|a, b| b.weight_us.cmp(&a.weight_us).then(a.stack.cmp(&b.stack)));

        debug!("Built {} unique collapsed stacks", stacks.len());

        stacks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_single_frame() {
        let mut builder = StackProfileBuilder::new();
        builder.on_enter(0, "fib");
        builder.on_exit(0, ms(5));

        let stacks = builder.finish();
        assert_eq!(stacks, vec![CollapsedStack::new("fib".to_string(), 5_000)]);
    }

    #[test]
    fn test_nested_frames_get_self_time() {
        let mut builder = StackProfileBuilder::new();
        builder.on_enter(0, "main");
        builder.on_enter(0, "fib");
        builder.on_exit(0, ms(3)); // fib: 3ms self
        builder.on_exit(0, ms(10)); // main: 10ms total, 7ms self

        let stacks = builder.finish();
        assert_eq!(stacks.len(), 2);
        assert_eq!(stacks[0].stack, "main");
        assert_eq!(stacks[0].weight_us, 7_000);
        assert_eq!(stacks[1].stack, "main;fib");
        assert_eq!(stacks[1].weight_us, 3_000);
    }

    #[test]
    fn test_recursive_paths_aggregate() {
        let mut builder = StackProfileBuilder::new();
        // Two separate fib;fib invocations
        for _ in 0..2 {
            builder.on_enter(0, "fib");
            builder.on_enter(0, "fib");
            builder.on_exit(0, ms(1));
            builder.on_exit(0, ms(2));
        }

        let stacks = builder.finish();
        let inner = stacks.iter().find(|s| s.stack == "fib;fib").unwrap();
        let outer = stacks.iter().find(|s| s.stack == "fib").unwrap();
        assert_eq!(inner.weight_us, 2_000);
        assert_eq!(outer.weight_us, 2_000);
    }

    #[test]
    fn test_threads_have_independent_paths() {
        let mut builder = StackProfileBuilder::new();
        builder.on_enter(0, "a");
        builder.on_enter(1, "b");
        builder.on_exit(1, ms(1));
        builder.on_exit(0, ms(2));

        let stacks = builder.finish();
        assert!(stacks.iter().any(|s| s.stack == "a"));
        assert!(stacks.iter().any(|s| s.stack == "b"));
    }

    #[test]
    fn test_unbalanced_exit_ignored() {
        let mut builder = StackProfileBuilder::new();
        builder.on_exit(0, ms(5));
        assert!(builder.finish().is_empty());
    }

    #[test]
    fn test_abandon_open_frames() {
        let mut builder = StackProfileBuilder::new();
        builder.on_enter(0, "leaked");
        builder.abandon_open_frames(0);
        builder.on_enter(0, "fresh");
        builder.on_exit(0, ms(1));

        let stacks = builder.finish();
        assert_eq!(stacks, vec![CollapsedStack::new("fresh".to_string(), 1_000)]);
    }
}
