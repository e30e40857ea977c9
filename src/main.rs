//! Callprof CLI
//!
//! Replays recorded function enter/exit event logs through the
//! call-interval profiling core and produces reports and flamegraphs.

use anyhow::Result;
use callprof::commands::{execute_replay, validate_args, ReplayArgs};
use callprof::flamegraph::FlamegraphConfig;
use callprof::utils::config::SCHEMA_VERSION;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

/// Callprof - per-function timing from enter/exit instrumentation events
#[derive(Parser, Debug)]
#[command(name = "callprof")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a recorded event log and build a timing report
    Replay {
        /// Path to the event log (.jsonl or .json)
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for JSON report
        #[arg(short, long, default_value = "report.json")]
        output: PathBuf,

        /// Output path for SVG flamegraph (optional)
        #[arg(short, long)]
        flamegraph: Option<PathBuf>,

        /// Comma-separated function names to track (default: track all)
        #[arg(long, value_delimiter = ',')]
        track: Option<Vec<String>>,

        /// Number of top functions to include
        #[arg(long, default_value = "20")]
        top: usize,

        /// Flamegraph title
        #[arg(long)]
        title: Option<String>,

        /// Flamegraph width in pixels
        #[arg(long, default_value = "1200")]
        width: usize,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,

        /// Echo every completed call to stdout during replay
        #[arg(long)]
        trace_calls: bool,
    },

    /// Validate a report JSON file
    Validate {
        /// Path to report JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Replay {
            input,
            output,
            flamegraph,
            track,
            top,
            title,
            width,
            summary,
            trace_calls,
        } => {
            // Create flamegraph config
            let fg_config = if flamegraph.is_some() {
                let mut config = FlamegraphConfig::new();

                if let Some(title_str) = title {
                    config = config.with_title(title_str);
                }

                config.width = width;

                Some(config)
            } else {
                None
            };

            // Create replay args
            let args = ReplayArgs {
                input,
                output_json: output,
                output_svg: flamegraph,
                track,
                top,
                flamegraph_config: fg_config,
                print_summary: summary,
                trace_calls,
            };

            // Validate args first
            validate_args(&args)?;

            // Execute replay
            execute_replay(args)?;
        }

        Commands::Validate { file } => {
            validate_report_file(file)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

/// Validate a report JSON file
///
/// **Private** - internal command implementation
fn validate_report_file(file_path: PathBuf) -> Result<()> {
    use callprof::output::read_report;

    println!("Validating report: {}", file_path.display());

    let report = read_report(&file_path)?;

    println!("✓ Valid report JSON");
    println!("  Version: {}", report.version);
    println!("  Source: {}", report.source);
    println!("  Completed Calls: {}", report.total_calls);
    println!("  Tracked Time: {:.2} ms", report.total_tracked_ms);
    println!("  Anomalies: {}", report.anomaly_count);
    println!("  Functions: {}", report.functions.len());

    Ok(())
}

/// Display schema information
///
/// **Private** - internal command implementation
fn display_schema(show_details: bool) {
    println!("Callprof Report Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string          - Schema version (e.g., '1.0.0')");
        println!("  source: string           - Event log the report came from");
        println!("  total_calls: number      - Completed tracked invocations");
        println!("  total_tracked_ms: number - Sum of cumulative durations");
        println!("  anomaly_count: number    - Unbalanced exits and clock clamps");
        println!("  functions: array         - Ranked per-function rows");
        println!("    name: string           - Function identity");
        println!("    invocation_count: number - Completed invocations");
        println!("    last_duration_ms: number - Most recent duration");
        println!("    cumulative_duration_ms: number - Running sum");
        println!("    mean_duration_ms: number - Cumulative / count");
        println!("    percentage: number     - Share of total tracked time");
        println!("  generated_at: string     - RFC 3339 timestamp");
        println!();
        println!("Event Log Structure (input, JSON Lines or array):");
        println!("  event: 'enter' | 'exit'  - Event kind");
        println!("  function: string         - Function identity");
        println!("  ts_ms: number            - Milliseconds from clock origin");
        println!("  thread: number?          - Logical thread (default 0)");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
///
/// **Private** - internal command implementation
fn display_version() {
    println!("Callprof v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Per-function timing from enter/exit instrumentation events.");
}
