//! Command-line argument definitions for the Cartograph CLI.
//!
//! Layout flags (algorithm, canvas, connectors, seed, branch balancing) are
//! overrides: each one replaces the matching setting of the loaded
//! configuration before the configuration is validated.

use std::path::PathBuf;

use clap::Parser;

use cartograph::{config::OddBranchPolicy, layout::LayoutAlgorithm};

/// Lay out a concept diagram specification and write the positioned result as JSON
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Specification to lay out (JSON)
    pub input: PathBuf,

    /// Where to write the layout (JSON)
    #[arg(short, long, default_value = "layout.json")]
    pub output: PathBuf,

    /// Configuration file (TOML); searched for when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Layout algorithm instead of automatic selection
    /// (stacked, grouped, paired, force_directed, radial)
    #[arg(short, long, value_parser = parse_algorithm)]
    pub algorithm: Option<LayoutAlgorithm>,

    /// Canvas width hint
    #[arg(long)]
    pub width: Option<f32>,

    /// Canvas height hint
    #[arg(long)]
    pub height: Option<f32>,

    /// Margin kept free around the diagram
    #[arg(long)]
    pub padding: Option<f32>,

    /// Emit no connectors
    #[arg(long)]
    pub no_connectors: bool,

    /// Seed for the force-directed layout's initial jitter
    #[arg(long)]
    pub seed: Option<u64>,

    /// Leave an empty slot when a radial topic has an odd number of branches
    #[arg(long)]
    pub balance_branches: bool,

    /// Write the layout on a single line
    #[arg(long)]
    pub compact: bool,

    /// Print the performance metrics to stdout once the layout is written
    #[arg(long)]
    pub metrics: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    pub fn odd_branch_policy(&self) -> Option<OddBranchPolicy> {
        self.balance_branches.then_some(OddBranchPolicy::ReserveSlot)
    }
}

fn parse_algorithm(name: &str) -> Result<LayoutAlgorithm, String> {
    name.parse()
}
