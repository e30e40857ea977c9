//! SVG flamegraph generation using the inferno library.
//!
//! Converts collapsed self-time stacks into an interactive SVG where frame
//! width is proportional to time spent, making the hot call paths visible
//! at a glance.

use crate::aggregator::CollapsedStack;
use crate::utils::error::FlamegraphError;
use inferno::flamegraph::{self, Options};
use log::info;

/// Flamegraph configuration
#[derive(Debug, Clone)]
pub struct FlamegraphConfig {
    pub title: String,
    pub width: usize,
}

impl Default for FlamegraphConfig {
    fn default() -> Self {
        Self {
            title: "Call Interval Profile".to_string(),
            width: 1200,
        }
    }
}

impl FlamegraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }
}

/// Generate SVG flamegraph from collapsed stacks
///
/// **Public** - main entry point for flamegraph generation
///
/// # Arguments
/// * `stacks` - Collapsed stacks with self-time weights (microseconds)
/// * `config` - Optional title/width configuration
///
/// # Returns
/// SVG document as a string
///
/// # Errors
/// * `FlamegraphError::EmptyStacks` - nothing to draw
/// * `FlamegraphError::GenerationFailed` - inferno rejected the input
pub fn generate_flamegraph(
    stacks: &[CollapsedStack],
    config: Option<&FlamegraphConfig>,
) -> Result<String, FlamegraphError> {
    if stacks.is_empty() {
        return Err(FlamegraphError::EmptyStacks);
    }

    let config = config.cloned().unwrap_or_default();
    info!("Generating flamegraph from {} stacks", stacks.len());

    // inferno consumes the collapsed text format: "a;b;c weight"
    let lines: Vec<String> = stacks
        .iter()
        .map(|stack| format!("{} {}", stack.stack, stack.weight_us))
        .collect();

    let mut options = Options::default();
    options.title = config.title;
    options.image_width = Some(config.width);
    options.count_name = "us".to_string();

    let mut svg = Vec::new();
    flamegraph::from_lines(&mut options, lines.iter().map(String::as_str), &mut svg)
        .map_err(|e| FlamegraphError::GenerationFailed(e.to_string()))?;

    let svg = String::from_utf8(svg)
        .map_err(|e| FlamegraphError::GenerationFailed(e.to_string()))?;

    info!("Flamegraph generated successfully ({} bytes)", svg.len());
    Ok(svg)
}
