//! Model-assisted refinement of deterministic layouts.
//!
//! A [`ModelAssist`] implementation supplies raw suggestions; the
//! [`HybridCoordinator`] bounds each request in time, validates and merges
//! what comes back, and falls back to the deterministic layout whenever
//! anything goes wrong.

mod assist;
mod attempt;
mod coordinator;
mod suggestion;

pub use assist::{AssistError, ModelAssist, NoAssist, SuggestionKind, SuggestionRequest};
pub use attempt::AttemptState;
pub use coordinator::{HybridCoordinator, HybridDecision};
pub use suggestion::{
    GroupShift, LayoutSuggestions, NodeStyleOverride, PositionOverride, StyleSuggestions,
    SuggestionError, SuggestionPayload,
};
