//! CLI logic for the Cartograph layout tool.
//!
//! This module reads a specification file, runs the deterministic layout
//! pipeline with the merged configuration and writes the resulting layout as
//! JSON.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::{info, warn};

use cartograph::{CartographError, LayoutBuilder, LayoutOptions, layout::LayoutResult};

/// Run the Cartograph CLI application
///
/// Lays out the input specification, writes the layout JSON to the output
/// file and returns the layout for reporting.
///
/// # Errors
///
/// Returns `CartographError` for:
/// - File I/O errors
/// - Configuration loading errors and out-of-range settings
/// - Malformed JSON
/// - Invalid specifications
pub fn run(args: &Args) -> Result<LayoutResult, CartographError> {
    info!(
        input_path = args.input.display().to_string(),
        output_path = args.output.display().to_string();
        "Processing specification"
    );

    let app_config = config::load_config(args.config.as_ref(), args)?;
    let source = fs::read_to_string(&args.input)?;

    let builder = LayoutBuilder::new(app_config);
    let spec = builder.parse_spec(&source)?;
    let layout = builder.layout(&spec, &LayoutOptions::default())?;

    let json = if args.compact {
        serde_json::to_string(&layout)?
    } else {
        serde_json::to_string_pretty(&layout)?
    };
    fs::write(&args.output, json)?;

    let metrics = &layout.performance_metrics;
    if metrics.residual_collisions > 0 {
        warn!(
            residual_collisions = metrics.residual_collisions;
            "Layout still has overlapping nodes"
        );
    }
    info!(
        output_file = args.output.display().to_string(),
        algorithm:% = layout.algorithm_used,
        nodes = metrics.node_count,
        connectors = metrics.connector_count,
        width = layout.dimensions.width,
        height = layout.dimensions.height;
        "Layout exported successfully"
    );

    Ok(layout)
}
