//! Callprof
//!
//! Call-interval profiling core: receives function enter/exit events from
//! any instrumented source and produces per-function timing statistics,
//! correct even under recursion and exception unwinding.
//!
//! The crate splits into the event-driven core (`clock`, `tracker`,
//! `aggregator`, `profiler`) and a replay pipeline (`events`, `flamegraph`,
//! `output`) that plays recorded event logs through the core from the
//! `callprof` CLI.
//!
//! ## Getting Started
//!
//! Live instrumentation drives a [`profiler::CallProfiler`]:
//!
//! ```
//! use callprof::clock::MonotonicClock;
//! use callprof::profiler::{CallObserver, CallProfiler};
//! use callprof::tracker::FilterPolicy;
//!
//! let mut profiler = CallProfiler::new(MonotonicClock::new(), FilterPolicy::names(["fib"]));
//!
//! let call = profiler.on_enter("fib");
//! // ... instrumented function body runs ...
//! profiler.on_exit(call);
//!
//! let stats = profiler.stats().snapshot("fib").unwrap();
//! assert_eq!(stats.invocation_count, 1);
//! ```

pub mod aggregator;
pub mod clock;
pub mod commands;
pub mod events;
pub mod flamegraph;
pub mod output;
pub mod profiler;
pub mod tracker;
pub mod utils;
