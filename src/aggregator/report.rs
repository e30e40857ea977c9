//! Build ranked report rows and distribution statistics from aggregated
//! function stats.
//!
//! The hottest functions by cumulative time are the primary targets for
//! optimization, so rows are ranked by cumulative duration (descending).

use super::stats::StatsAggregator;
use crate::events::schema::{FunctionEntry, Report};
use crate::utils::config::SCHEMA_VERSION;
use log::debug;

/// Build ranked function entries from an aggregator
///
/// **Public** - main entry point for report generation
///
/// # Arguments
/// * `aggregator` - Accumulated per-function statistics
/// * `top_n` - Number of top functions to include (e.g., 20)
///
/// # Returns
/// Vector of entries, sorted by cumulative duration (descending)
pub fn build_function_entries(aggregator: &StatsAggregator, top_n: usize) -> Vec<FunctionEntry> {
    debug!(
        "Ranking top {} of {} observed functions",
        top_n,
        aggregator.len()
    );

    let total_ms = aggregator.total_tracked_ms();

    let mut entries: Vec<FunctionEntry> = aggregator
        .iter()
        .map(|(name, stats)| FunctionEntry {
            name: name.to_string(),
            invocation_count: stats.invocation_count,
            last_duration_ms: stats.last_duration_ms,
            cumulative_duration_ms: stats.cumulative_duration_ms,
            mean_duration_ms: stats.mean_duration_ms(),
            percentage: if total_ms > 0.0 {
                (stats.cumulative_duration_ms / total_ms) * 100.0
            } else {
                0.0
            },
        })
        .collect();

    entries.sort_by(|a, b| {
        b.cumulative_duration_ms
            .total_cmp(&a.cumulative_duration_ms)
            .then_with(|| a.name.cmp(&b.name))
    });
    entries.truncate(top_n);

    entries
}

/// Assemble a full report from an aggregator
///
/// **Public** - used by the replay command and tests
///
/// # Arguments
/// * `aggregator` - Accumulated per-function statistics
/// * `source` - Label for where the events came from (e.g., log path)
/// * `anomaly_count` - Anomalies absorbed during the run
/// * `top_n` - Number of top functions to include
pub fn to_report(
    aggregator: &StatsAggregator,
    source: &str,
    anomaly_count: u64,
    top_n: usize,
) -> Report {
    Report {
        version: SCHEMA_VERSION.to_string(),
        source: source.to_string(),
        total_calls: aggregator.total_invocations(),
        total_tracked_ms: aggregator.total_tracked_ms(),
        anomaly_count,
        functions: build_function_entries(aggregator, top_n),
        generated_at: chrono::Utc::now().to_rfc3339(),
    }
}

/// Calculate time distribution statistics
///
/// **Public** - provides summary statistics
///
/// # Arguments
/// * `entries` - Ranked function entries
///
/// # Returns
/// Statistics about how tracked time spreads across functions
pub fn calculate_time_distribution(entries: &[FunctionEntry]) -> TimeDistribution {
    if entries.is_empty() {
        return TimeDistribution::default();
    }

    let total: f64 = entries.iter().map(|e| e.cumulative_duration_ms).sum();
    let count = entries.len();
    let mean = total / count as f64;

    // Get median
    let mut durations: Vec<f64> = entries.iter().map(|e| e.cumulative_duration_ms).collect();
    durations.sort_by(f64::total_cmp);
    let median = durations[durations.len() / 2];

    // Entries arrive ranked, so the hottest function is first
    let top_ms = entries[0].cumulative_duration_ms;

    TimeDistribution {
        total_ms: total,
        function_count: count,
        mean_ms_per_function: mean,
        median_ms_per_function: median,
        top_function_ms: top_ms,
        top_function_percentage: if total > 0.0 {
            (top_ms / total) * 100.0
        } else {
            0.0
        },
    }
}

/// Time distribution statistics
///
/// **Public** - returned from calculate_time_distribution
#[derive(Debug, Clone, Default)]
pub struct TimeDistribution {
    /// Total tracked time across all functions (milliseconds)
    pub total_ms: f64,

    /// Number of distinct functions
    pub function_count: usize,

    /// Mean cumulative time per function
    pub mean_ms_per_function: f64,

    /// Median cumulative time per function
    pub median_ms_per_function: f64,

    /// Cumulative time of the hottest function
    pub top_function_ms: f64,

    /// Percentage of total time in the hottest function
    pub top_function_percentage: f64,
}

impl TimeDistribution {
    /// Check if tracked time is highly concentrated
    ///
    /// Returns true if the hottest function holds >80% of tracked time
    pub fn is_highly_concentrated(&self) -> bool {
        self.top_function_percentage > 80.0
    }

    /// Get human-readable summary
    ///
    /// **Public** - for logging and debugging
    pub fn summary(&self) -> String {
        format!(
            "Total: {:.2} ms | Functions: {} | Mean: {:.2} ms | Median: {:.2} ms | Hottest: {:.1}%",
            self.total_ms,
            self.function_count,
            self.mean_ms_per_function,
            self.median_ms_per_function,
            self.top_function_percentage
        )
    }
}
