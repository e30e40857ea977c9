//! Text output: per-function summary table and the live per-call echo.

use crate::aggregator::stats::{FunctionStats, StatsSink};
use crate::events::schema::FunctionEntry;

/// Render a ranked per-function table for terminal output
///
/// **Public** - used by the replay command's --summary flag
///
/// # Arguments
/// * `entries` - Ranked function entries (hottest first)
/// * `max_lines` - Maximum number of rows to show
pub fn generate_text_summary(entries: &[FunctionEntry], max_lines: usize) -> String {
    if entries.is_empty() {
        return "No tracked calls completed.".to_string();
    }

    let mut lines = Vec::new();

    lines.push(format!(
        "{:<32} {:>8} {:>12} {:>12} {:>12} {:>7}",
        "Function", "Calls", "Total (ms)", "Mean (ms)", "Last (ms)", "%"
    ));
    lines.push("─".repeat(88));

    for entry in entries.iter().take(max_lines) {
        let display_name = truncate_name(&entry.name, 32);
        lines.push(format!(
            "{:<32} {:>8} {:>12.3} {:>12.3} {:>12.3} {:>6.1}%",
            display_name,
            entry.invocation_count,
            entry.cumulative_duration_ms,
            entry.mean_duration_ms,
            entry.last_duration_ms,
            entry.percentage
        ));
    }

    lines.push("─".repeat(88));

    if entries.len() > max_lines {
        lines.push(format!(
            "(Showing top {} of {} functions)",
            max_lines,
            entries.len()
        ));
    }

    lines.join("\n")
}

/// Format one completed invocation the way the live echo prints it
///
/// **Public** - shared by the sink and its tests
pub fn format_call_line(identity: &str, duration_ms: f64, cumulative_ms: f64) -> String {
    format!(
        "Function {}() took {:.2} ms, cumulative time: {:.2} ms",
        identity, duration_ms, cumulative_ms
    )
}

/// Sink that echoes every completed invocation to stdout.
///
/// **Public** - enabled by the replay command's --trace-calls flag
#[derive(Debug, Default)]
pub struct PrintSink;

impl StatsSink for PrintSink {
    fn on_record(&mut self, identity: &str, duration_ms: f64, stats: &FunctionStats) {
        println!(
            "{}",
            format_call_line(identity, duration_ms, stats.cumulative_duration_ms)
        );
    }
}

/// Truncate long function names from the front, keeping the suffix
///
/// **Private** - display helper
fn truncate_name(name: &str, max_len: usize) -> String {
    if name.len() <= max_len {
        name.to_string()
    } else {
        let tail: String = name
            .chars()
            .rev()
            .take(max_len - 3)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("...{}", tail)
    }
}
