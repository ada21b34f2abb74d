//! Cartograph CLI entry point.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error};

use cartograph_cli::{Args, error_adapter::ErrorAdapter};

fn main() {
    miette::set_panic_hook();

    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    debug!(args:?; "Parsed arguments");

    match cartograph_cli::run(&args) {
        Ok(layout) => {
            if args.metrics {
                match serde_json::to_string_pretty(&layout.performance_metrics) {
                    Ok(metrics) => println!("{metrics}"),
                    Err(err) => error!(err:%; "Could not encode performance metrics"),
                }
            }
        }
        Err(err) => {
            let adapter = ErrorAdapter(&err);
            let mut report = String::new();
            if miette::GraphicalReportHandler::new()
                .render_report(&mut report, &adapter)
                .is_err()
            {
                report = err.to_string();
            }
            error!("Layout failed\n{report}");
            process::exit(1);
        }
    }
}
