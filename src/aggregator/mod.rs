//! Aggregation of completed call measurements into statistics.
//!
//! This module transforms matched enter/exit measurements into:
//! - Per-function running statistics (count, last, cumulative)
//! - Collapsed stack format (for flamegraph generation)
//! - Ranked report rows and time distribution statistics

pub mod report;
pub mod stacks;
pub mod stats;

// Re-export main types and functions
pub use report::{build_function_entries, calculate_time_distribution, to_report, TimeDistribution};
pub use stacks::{CollapsedStack, StackProfileBuilder};
pub use stats::{FunctionStats, StatsAggregator, StatsSink};
