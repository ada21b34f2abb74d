//! Time-bounded enhancement attempts with deterministic fallback.
//!
//! The coordinator never fails. Whatever the assistant does (answer, stall,
//! error out, return nonsense) the caller gets back a valid layout: either a
//! validated refinement or the deterministic base it passed in.

use std::{future::Future, pin::pin, time::{Duration, Instant}};

use futures::{
    future::{Either, select},
    stream::{FuturesUnordered, StreamExt},
};
use log::{debug, info, warn};
use serde::Serialize;

use cartograph_core::{spec::Specification, theme::Theme};

use crate::{
    config::{AppConfig, CanvasConfig, LayoutConfig},
    hybrid::{
        assist::{ModelAssist, SuggestionKind, SuggestionRequest},
        attempt::{Attempt, AttemptState},
        suggestion::{LayoutSuggestions, StyleSuggestions, SuggestionError, SuggestionPayload},
    },
    layout::{
        self, LayoutResult, max_overlap_area, resolve_collisions, result::serialize_secs,
        validate_and_adjust_boundaries,
    },
    selector::ProcessingStrategy,
};

/// Record of what an enhancement attempt did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HybridDecision {
    /// True when a refinement was accepted
    pub success: bool,
    pub strategy: ProcessingStrategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout_suggestions: Option<LayoutSuggestions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_suggestions: Option<StyleSuggestions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(serialize_with = "serialize_secs")]
    pub processing_time: Duration,
    /// State the attempt ended in before resolving
    pub outcome: AttemptState,
}

impl HybridDecision {
    fn new(strategy: ProcessingStrategy) -> Self {
        Self {
            success: false,
            strategy,
            reasoning: None,
            layout_suggestions: None,
            style_suggestions: None,
            error_message: None,
            processing_time: Duration::ZERO,
            outcome: AttemptState::Idle,
        }
    }

    fn failed(strategy: ProcessingStrategy, outcome: AttemptState, message: impl Into<String>) -> Self {
        Self {
            error_message: Some(message.into()),
            outcome,
            ..Self::new(strategy)
        }
    }
}

/// Runs model-assist attempts against a fully computed base layout.
#[derive(Debug, Clone)]
pub struct HybridCoordinator {
    timeout: Duration,
    layout: LayoutConfig,
    canvas: CanvasConfig,
}

impl HybridCoordinator {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            timeout: config.hybrid.timeout(),
            layout: config.layout.clone(),
            canvas: config.canvas.clone(),
        }
    }

    /// Set the upper bound for a single attempt
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Runs one attempt and returns the refined layout, if any, with its record.
    ///
    /// `base` is only read; a refinement is always a new value.
    pub async fn attempt<A: ModelAssist>(
        &self,
        assist: &A,
        strategy: ProcessingStrategy,
        spec: &Specification,
        theme: &Theme,
        base: &LayoutResult,
    ) -> (Option<LayoutResult>, HybridDecision) {
        let started = Instant::now();
        let Some(kind) = SuggestionKind::for_strategy(strategy) else {
            let decision =
                HybridDecision::failed(strategy, AttemptState::Idle, "strategy asks for no suggestions");
            return (None, decision);
        };

        let mut attempt = Attempt::new();
        let mut decision = HybridDecision::new(strategy);
        attempt.advance(AttemptState::Requested);
        debug!(kind:? = kind, timeout_ms = self.timeout.as_millis() as u64; "Requesting suggestions");

        let request = SuggestionRequest {
            kind,
            spec: spec.clone(),
            base_layout: base.clone(),
            theme: theme.clone(),
            timeout: self.timeout,
        };
        let candidate = match tokio::time::timeout(self.timeout, assist.suggest(request)).await {
            Err(_) => {
                attempt.advance(AttemptState::TimedOut);
                let message = format!("model assist timed out after {} ms", self.timeout.as_millis());
                warn!(timeout_ms = self.timeout.as_millis() as u64; "Model assist timed out, keeping deterministic layout");
                decision.error_message = Some(message);
                None
            }
            Ok(Err(err)) => {
                attempt.advance(AttemptState::Errored);
                warn!(err:% = err; "Model assist failed, keeping deterministic layout");
                decision.error_message = Some(err.to_string());
                None
            }
            Ok(Ok(raw)) => match self.accept(kind, &raw, base) {
                Ok((candidate, payload)) => {
                    attempt.advance(AttemptState::Succeeded);
                    decision.success = true;
                    decision.reasoning = payload.reasoning;
                    decision.layout_suggestions = payload.layout;
                    decision.style_suggestions = payload.style;
                    Some(candidate)
                }
                Err(err) => {
                    if matches!(err, SuggestionError::Rejected(_)) {
                        attempt.advance(AttemptState::Succeeded);
                    }
                    attempt.advance(AttemptState::Invalid);
                    warn!(err:% = err; "Discarding invalid suggestions");
                    decision.error_message = Some(err.to_string());
                    None
                }
            },
        };

        decision.outcome = attempt.outcome();
        attempt.advance(AttemptState::Resolved);
        decision.processing_time = started.elapsed();
        info!(
            outcome:% = decision.outcome,
            strategy:% = strategy,
            elapsed_ms = decision.processing_time.as_millis() as u64;
            "Enhancement attempt resolved"
        );

        let candidate = candidate.map(|mut candidate| {
            candidate.performance_metrics.hybrid_outcome = Some(decision.outcome);
            candidate
        });
        (candidate, decision)
    }

    /// Parses, validates and merges a response into a copy of `base`
    fn accept(
        &self,
        kind: SuggestionKind,
        raw: &str,
        base: &LayoutResult,
    ) -> Result<(LayoutResult, SuggestionPayload), SuggestionError> {
        let payload = SuggestionPayload::parse(raw)?;
        payload.validate(kind, base.nodes.len())?;

        let mut candidate = base.clone();
        match kind {
            SuggestionKind::Style => {
                if let Some(style) = &payload.style {
                    style.apply(&mut candidate);
                }
            }
            SuggestionKind::Layout => {
                if let Some(suggestions) = &payload.layout {
                    suggestions.apply(&mut candidate);
                }
                self.revalidate(&mut candidate)?;
                layout::finalize(&mut candidate, &self.layout, &self.canvas);
            }
        }
        Ok((candidate, payload))
    }

    /// Runs moved nodes back through boundary and collision handling
    fn revalidate(&self, candidate: &mut LayoutResult) -> Result<(), SuggestionError> {
        let dimensions = candidate.dimensions;
        validate_and_adjust_boundaries(&mut candidate.nodes, dimensions);
        resolve_collisions(
            &mut candidate.nodes,
            self.layout.collision_padding,
            self.layout.max_collision_iterations,
        );
        validate_and_adjust_boundaries(&mut candidate.nodes, dimensions);

        if !candidate.is_contained() {
            return Err(SuggestionError::Rejected(
                "nodes do not fit the canvas".to_string(),
            ));
        }
        let overlap = max_overlap_area(&candidate.nodes);
        if overlap > self.layout.collision_tolerance {
            return Err(SuggestionError::Rejected(format!(
                "overlap area {overlap:.1} exceeds tolerance {}",
                self.layout.collision_tolerance
            )));
        }
        Ok(())
    }

    /// One attempt; returns the refinement or `base` unchanged
    pub async fn enhance<A: ModelAssist>(
        &self,
        assist: &A,
        strategy: ProcessingStrategy,
        spec: &Specification,
        theme: &Theme,
        base: LayoutResult,
    ) -> (LayoutResult, HybridDecision) {
        let (candidate, decision) = self.attempt(assist, strategy, spec, theme, &base).await;
        (with_fallback(candidate, base, &decision), decision)
    }

    /// Like [`enhance`](Self::enhance), abandoning the attempt when `cancel` completes first
    pub async fn enhance_until<A, C>(
        &self,
        assist: &A,
        strategy: ProcessingStrategy,
        spec: &Specification,
        theme: &Theme,
        base: LayoutResult,
        cancel: C,
    ) -> (LayoutResult, HybridDecision)
    where
        A: ModelAssist,
        C: Future<Output = ()>,
    {
        let started = Instant::now();
        let finished = {
            let attempt = pin!(self.attempt(assist, strategy, spec, theme, &base));
            let cancel = pin!(cancel);
            match select(attempt, cancel).await {
                Either::Left((finished, _)) => Some(finished),
                // Dropping the pending attempt drops the in-flight request
                Either::Right(((), _)) => None,
            }
        };

        match finished {
            Some((candidate, decision)) => (with_fallback(candidate, base, &decision), decision),
            None => {
                info!("Enhancement cancelled by caller, keeping deterministic layout");
                let mut decision = HybridDecision::failed(
                    strategy,
                    AttemptState::Errored,
                    "attempt cancelled by caller",
                );
                decision.processing_time = started.elapsed();
                (with_fallback(None, base, &decision), decision)
            }
        }
    }

    /// Runs one attempt per assistant concurrently and keeps the first accepted refinement.
    ///
    /// Every participant works on its own copy of `base`. Remaining attempts
    /// are dropped as soon as one succeeds.
    pub async fn race_candidates<A: ModelAssist>(
        &self,
        assists: &[A],
        strategy: ProcessingStrategy,
        spec: &Specification,
        theme: &Theme,
        base: LayoutResult,
    ) -> (LayoutResult, HybridDecision) {
        if assists.is_empty() {
            let decision = HybridDecision::failed(
                strategy,
                AttemptState::Idle,
                "no model-assist candidates",
            );
            return (with_fallback(None, base, &decision), decision);
        }

        let mut pending: FuturesUnordered<_> = assists
            .iter()
            .enumerate()
            .map(|(participant, assist)| {
                let own = base.clone();
                async move {
                    let result = self.attempt(assist, strategy, spec, theme, &own).await;
                    (participant, result)
                }
            })
            .collect();

        let mut last = None;
        while let Some((participant, (candidate, decision))) = pending.next().await {
            if let Some(candidate) = candidate {
                info!(participant, remaining = pending.len(); "Candidate accepted");
                return (candidate, decision);
            }
            debug!(participant, outcome:% = decision.outcome; "Candidate discarded");
            last = Some(decision);
        }

        let decision = last.unwrap_or_else(|| {
            HybridDecision::failed(strategy, AttemptState::Idle, "no model-assist candidates")
        });
        (with_fallback(None, base, &decision), decision)
    }
}

/// The refinement when there is one, otherwise `base` tagged with the outcome
fn with_fallback(
    candidate: Option<LayoutResult>,
    mut base: LayoutResult,
    decision: &HybridDecision,
) -> LayoutResult {
    match candidate {
        Some(candidate) => candidate,
        None => {
            if decision.outcome != AttemptState::Idle {
                base.performance_metrics.hybrid_outcome = Some(decision.outcome);
            }
            base
        }
    }
}
