//! Configuration and constants for the CLI.

/// Current report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Default number of top functions included in a report
pub const DEFAULT_TOP_FUNCTIONS: usize = 20;

/// Upper bound on --top to keep reports readable
pub const MAX_TOP_FUNCTIONS: usize = 1000;
