//! Error types for Cartograph operations.
//!
//! Only problems with the caller's input surface here. Model-assist failures
//! and residual overlap are absorbed by the pipeline and reported through
//! [`PerformanceMetrics`](crate::layout::PerformanceMetrics) instead.

use std::io;

use thiserror::Error;

use cartograph_core::spec::SpecError;

use crate::config::SettingError;

/// The main error type for Cartograph operations.
#[derive(Debug, Error)]
pub enum CartographError {
    #[error("Invalid specification: {0}")]
    Spec(#[from] SpecError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid setting: {0}")]
    Setting(#[from] SettingError),

    #[error("Configuration error: {0}")]
    Config(String),
}
