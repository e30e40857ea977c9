//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and
//! commands. The profiling core itself never returns errors through the
//! instrumentation boundary; these types cover the surrounding pipeline
//! (event-log parsing, flamegraph generation, file output).

use thiserror::Error;

/// Errors that can occur while reading or validating an event log
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read event log: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid event log: {0}")]
    InvalidFormat(String),

    #[error("Event log is empty")]
    EmptyLog,
}

/// Errors that can occur during flamegraph generation
#[derive(Error, Debug)]
pub enum FlamegraphError {
    #[error("Empty stack data")]
    EmptyStacks,

    #[error("Failed to generate flamegraph: {0}")]
    GenerationFailed(String),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
