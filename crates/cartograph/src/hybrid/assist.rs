//! The model-assist capability the coordinator talks to.

use std::{future::Future, time::Duration};

use serde::Serialize;
use thiserror::Error;

use cartograph_core::{spec::Specification, theme::Theme};

use crate::{layout::LayoutResult, selector::ProcessingStrategy};

/// What a request asks the assistant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    /// Position overrides for existing nodes
    Layout,
    /// Colors, weights and stroke changes; never geometry
    Style,
}

impl SuggestionKind {
    /// The kind a strategy asks for, `None` when it asks for nothing
    pub fn for_strategy(strategy: ProcessingStrategy) -> Option<Self> {
        match strategy {
            ProcessingStrategy::DeterministicOnly => None,
            ProcessingStrategy::StyleEnhancement => Some(Self::Style),
            ProcessingStrategy::ModelFirst => Some(Self::Layout),
        }
    }
}

/// Everything an assistant gets to see. All fields are owned copies.
#[derive(Debug, Clone, Serialize)]
pub struct SuggestionRequest {
    pub kind: SuggestionKind,
    pub spec: Specification,
    pub base_layout: LayoutResult,
    #[serde(skip)]
    pub theme: Theme,
    #[serde(skip)]
    pub timeout: Duration,
}

/// Why an assistant produced no response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssistError {
    #[error("model assist is not available")]
    Unavailable,

    #[error("transport failure: {0}")]
    Transport(String),
}

/// An asynchronous source of layout or style suggestions.
///
/// Implementations return the raw response text; the coordinator owns
/// parsing and validation. The future may be dropped at any await point when
/// the attempt times out or the caller cancels.
pub trait ModelAssist {
    fn suggest(
        &self,
        request: SuggestionRequest,
    ) -> impl Future<Output = Result<String, AssistError>> + Send;
}

/// Assistant used when no capability is configured. Always unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAssist;

impl ModelAssist for NoAssist {
    async fn suggest(&self, _request: SuggestionRequest) -> Result<String, AssistError> {
        Err(AssistError::Unavailable)
    }
}
