//! Event log handling and replay.
//!
//! This module handles:
//! - The recorded enter/exit event schema
//! - Reading event logs (JSON Lines or JSON array)
//! - Validating structural properties before replay
//! - Replaying events through the profiling core
//! - Defining the report output schema

pub mod event_log;
pub mod replay;
pub mod schema;

// Re-export main types
pub use event_log::{parse_events, read_event_log, validate_events};
pub use replay::{replay_events, ReplayOutcome};
pub use schema::{FunctionEntry, Report, TraceEvent};
