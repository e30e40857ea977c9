//! Replay command implementation.
//!
//! The replay command:
//! 1. Reads a recorded event log
//! 2. Validates its structure
//! 3. Replays it through the profiling core
//! 4. Builds the ranked report
//! 5. Generates a flamegraph (optional)
//! 6. Writes output files

use crate::aggregator::{calculate_time_distribution, to_report, StatsSink};
use crate::events::{read_event_log, replay_events, validate_events};
use crate::flamegraph::{generate_flamegraph, FlamegraphConfig};
use crate::output::{generate_text_summary, write_report, write_svg, PrintSink};
use crate::tracker::FilterPolicy;
use anyhow::{Context, Result};
use log::{debug, info};
use std::path::PathBuf;
use std::time::Instant;

/// Arguments for the replay command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ReplayArgs {
    /// Path to the recorded event log (.jsonl or .json)
    pub input: PathBuf,

    /// Output path for JSON report
    pub output_json: PathBuf,

    /// Output path for SVG flamegraph (optional)
    pub output_svg: Option<PathBuf>,

    /// Function names to track (None = track everything)
    pub track: Option<Vec<String>>,

    /// Number of top functions to include in the report
    pub top: usize,

    /// Flamegraph configuration
    pub flamegraph_config: Option<FlamegraphConfig>,

    /// Print text summary to stdout
    pub print_summary: bool,

    /// Echo every completed call to stdout as it replays
    pub trace_calls: bool,
}

impl Default for ReplayArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::from("events.jsonl"),
            output_json: PathBuf::from("report.json"),
            output_svg: None,
            track: None,
            top: crate::utils::config::DEFAULT_TOP_FUNCTIONS,
            flamegraph_config: None,
            print_summary: false,
            trace_calls: false,
        }
    }
}

/// Execute the replay command
///
/// **Public** - main entry point called from main.rs
///
/// # Arguments
/// * `args` - Replay command arguments
///
/// # Returns
/// Ok if replay succeeds, Err with context if any step fails
///
/// # Errors
/// * Event log read/parse errors
/// * File write errors
pub fn execute_replay(args: ReplayArgs) -> Result<()> {
    let start_time = Instant::now();

    info!("Starting replay of: {}", args.input.display());

    // Step 1: Read event log
    info!("Step 1/6: Reading event log...");
    let events = read_event_log(&args.input).context("Failed to read event log")?;

    debug!("Read {} events", events.len());

    // Step 2: Validate structure
    info!("Step 2/6: Validating event log...");
    validate_events(&events).context("Event log failed validation")?;

    // Step 3: Replay through the core
    info!("Step 3/6: Replaying events through the profiler...");
    let filter = match &args.track {
        Some(names) => FilterPolicy::names(names.iter().cloned()),
        None => FilterPolicy::All,
    };
    let sink: Option<Box<dyn StatsSink>> = if args.trace_calls {
        Some(Box::new(PrintSink))
    } else {
        None
    };
    let outcome = replay_events(&events, &filter, sink);

    if outcome.anomaly_count > 0 {
        info!(
            "Absorbed {} anomalies (unbalanced or missing exits)",
            outcome.anomaly_count
        );
    }

    // Step 4: Build report
    info!("Step 4/6: Building report (top {} functions)...", args.top);
    let source = args.input.display().to_string();
    let report = to_report(&outcome.aggregator, &source, outcome.anomaly_count, args.top);

    let dist = calculate_time_distribution(&report.functions);
    info!("Time distribution: {}", dist.summary());

    // Step 5: Generate flamegraph (if requested)
    let svg_content = if args.output_svg.is_some() {
        info!("Step 5/6: Generating flamegraph...");
        let config = args.flamegraph_config.as_ref();
        let svg = generate_flamegraph(&outcome.stacks, config)
            .context("Failed to generate flamegraph")?;
        Some(svg)
    } else {
        info!("Step 5/6: Skipping flamegraph generation (not requested)");
        None
    };

    // Step 6: Write outputs
    info!("Step 6/6: Writing output files...");

    write_report(&report, &args.output_json).context("Failed to write report JSON")?;

    info!("✓ Report written to: {}", args.output_json.display());

    if let (Some(svg), Some(svg_path)) = (svg_content, &args.output_svg) {
        write_svg(&svg, svg_path).context("Failed to write flamegraph SVG")?;

        info!("✓ Flamegraph written to: {}", svg_path.display());
    }

    // Print text summary (if requested)
    if args.print_summary {
        println!("\n{}", "=".repeat(88));
        println!("REPLAY SUMMARY");
        println!("{}", "=".repeat(88));
        println!("Source:        {}", source);
        println!("Events:        {}", outcome.events_replayed);
        println!("Completed:     {} calls", report.total_calls);
        println!("Tracked time:  {:.2} ms", report.total_tracked_ms);
        println!("Anomalies:     {}", report.anomaly_count);
        println!("\n{}", generate_text_summary(&report.functions, args.top));
        println!("{}", "=".repeat(88));
    }

    let elapsed = start_time.elapsed();
    info!("Replay completed in {:.2}s", elapsed.as_secs_f64());

    Ok(())
}

/// Validate replay arguments
///
/// **Public** - can be called before execute_replay for early validation
///
/// # Arguments
/// * `args` - Arguments to validate
///
/// # Returns
/// Ok if arguments are valid, Err with message if not
pub fn validate_args(args: &ReplayArgs) -> Result<()> {
    if args.input.as_os_str().is_empty() {
        anyhow::bail!("Input path cannot be empty");
    }

    if !args.input.exists() {
        anyhow::bail!("Input file does not exist: {}", args.input.display());
    }

    if args.top == 0 {
        anyhow::bail!("top must be greater than 0");
    }

    if args.top > crate::utils::config::MAX_TOP_FUNCTIONS {
        anyhow::bail!(
            "top is too large (max {})",
            crate::utils::config::MAX_TOP_FUNCTIONS
        );
    }

    if let Some(names) = &args.track {
        if names.iter().any(|n| n.is_empty()) {
            anyhow::bail!("Tracked function names cannot be empty");
        }
    }

    Ok(())
}
