//! Error adapter for converting CartographError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use cartograph::CartographError;

/// Adapter giving a [`CartographError`] a diagnostic code and help text.
pub struct ErrorAdapter<'a>(pub &'a CartographError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            CartographError::Spec(_) => "cartograph::spec",
            CartographError::Io(_) => "cartograph::io",
            CartographError::Json(_) => "cartograph::json",
            CartographError::Setting(_) => "cartograph::setting",
            CartographError::Config(_) => "cartograph::config",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            CartographError::Spec(_) => {
                "a specification needs a non-empty topic, named nodes and relationships between existing nodes"
            }
            CartographError::Json(_) => {
                "expected an object like {\"topic\": \"...\", \"children\": [...]}"
            }
            CartographError::Setting(_) => {
                "canvas sizes and font sizes must be positive; paddings and gaps must not be negative"
            }
            CartographError::Io(_) | CartographError::Config(_) => return None,
        };
        Some(Box::new(help))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}
