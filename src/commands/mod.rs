//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod replay;

// Re-export main command functions
pub use replay::{execute_replay, validate_args, ReplayArgs};
