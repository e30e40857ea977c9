//! Output writers for report data and flamegraphs.
//!
//! This module handles writing data to disk and terminal:
//! - JSON reports
//! - SVG flamegraphs
//! - Text summaries and the per-call echo

pub mod json;
pub mod text;

// Re-export main functions
pub use json::{read_report, write_report, write_svg};
pub use text::{format_call_line, generate_text_summary, PrintSink};
