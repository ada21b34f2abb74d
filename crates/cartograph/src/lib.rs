//! Cartograph - layout engine for hierarchical concept diagrams
//!
//! This library turns a specification (a topic with nested children and
//! optional cross-links) into positioned node boxes and connector geometry
//! ready for rendering. It offers a family of deterministic layout
//! algorithms, automatic algorithm selection, collision resolution, canvas
//! fitting, an injectable result cache and an optional model-assisted
//! refinement pass that can only improve or keep the deterministic result.

pub mod cache;
pub mod config;
pub mod hybrid;
pub mod layout;
pub mod selector;

mod error;

pub use cartograph_core::{color, geometry, node, spec, text, theme};

pub use error::CartographError;

use std::{future::Future, time::Instant};

use log::{debug, info, trace};
use serde::Serialize;

use cartograph_core::{spec::Specification, theme::Theme};

use cache::{LayoutCache, cache_key};
use config::{AppConfig, SettingError, validate_dimensions, validate_theme};
use hybrid::{HybridCoordinator, HybridDecision, ModelAssist};
use layout::{Dimensions, EngineBuilder, LayoutResult};
use selector::{
    Preferences, ProcessingStrategy, classify_complexity, determine_strategy,
    select_layout_algorithm,
};

/// Per-request inputs besides the specification itself.
#[derive(Debug, Clone, Default)]
pub struct LayoutOptions {
    /// Canvas hint; the configured default canvas when `None`
    pub dimensions: Option<Dimensions>,
    /// Theme override; the configured theme when `None`
    pub theme: Option<Theme>,
    pub preferences: Preferences,
}

impl LayoutOptions {
    pub fn with_dimensions(mut self, dimensions: Dimensions) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = Some(theme);
        self
    }

    pub fn with_preferences(mut self, preferences: Preferences) -> Self {
        self.preferences = preferences;
        self
    }
}

/// A layout together with the record of its enhancement attempt.
#[derive(Debug, Clone, Serialize)]
pub struct HybridLayout {
    pub layout: LayoutResult,
    /// `None` when the request ran deterministically only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<HybridDecision>,
}

/// Builder for laying out specifications.
///
/// # Examples
///
/// ```rust
/// use cartograph::{LayoutBuilder, LayoutOptions, config::AppConfig};
///
/// let builder = LayoutBuilder::new(AppConfig::default());
/// let spec = builder
///     .parse_spec(r#"{"topic": "Cell", "children": [{"name": "Nucleus"}, "Membrane"]}"#)
///     .expect("valid specification");
///
/// let layout = builder
///     .layout(&spec, &LayoutOptions::default())
///     .expect("layout");
/// assert_eq!(layout.nodes.len(), 3);
/// assert!(layout.is_contained());
/// ```
#[derive(Debug, Clone, Default)]
pub struct LayoutBuilder {
    config: AppConfig,
}

impl LayoutBuilder {
    /// Create a new layout builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// An empty cache sized by `layout.cache_capacity`, for use with
    /// [`layout_cached`](Self::layout_cached).
    pub fn new_cache(&self) -> LayoutCache {
        LayoutCache::new(self.config.layout.cache_capacity)
    }

    /// Parse and validate a JSON specification.
    ///
    /// # Errors
    ///
    /// Returns `CartographError::Json` for malformed JSON and
    /// `CartographError::Spec` when the specification is structurally invalid.
    pub fn parse_spec(&self, json: &str) -> Result<Specification, CartographError> {
        let spec: Specification = serde_json::from_str(json)?;
        spec.validate()?;
        trace!(spec:?; "Parsed specification");
        Ok(spec)
    }

    /// Lay out `spec` deterministically.
    ///
    /// # Errors
    ///
    /// Returns `CartographError::Spec` when the specification is invalid and
    /// `CartographError::Setting` when the options carry an unusable canvas
    /// hint or theme. Once both are accepted, a layout is always produced.
    pub fn layout(
        &self,
        spec: &Specification,
        options: &LayoutOptions,
    ) -> Result<LayoutResult, CartographError> {
        self.check(spec, options)?;
        Ok(self.deterministic(spec, options))
    }

    /// Like [`layout`](Self::layout), reusing and filling `cache`.
    ///
    /// # Errors
    ///
    /// Returns `CartographError::Spec` or `CartographError::Setting` for an invalid request.
    pub fn layout_cached(
        &self,
        spec: &Specification,
        options: &LayoutOptions,
        cache: &mut LayoutCache,
    ) -> Result<LayoutResult, CartographError> {
        self.check(spec, options)?;
        Ok(self.cached_base(spec, options, cache))
    }

    /// Lay out `spec` and, depending on its complexity, refine the result with `assist`.
    ///
    /// Model-assist failures never surface here: the deterministic layout is
    /// returned instead and the decision records why.
    ///
    /// # Errors
    ///
    /// Returns `CartographError::Spec` or `CartographError::Setting` for an invalid request.
    pub async fn layout_with_hybrid<A: ModelAssist>(
        &self,
        spec: &Specification,
        options: &LayoutOptions,
        assist: &A,
    ) -> Result<HybridLayout, CartographError> {
        self.layout_with_hybrid_until(spec, options, assist, std::future::pending())
            .await
    }

    /// Like [`layout_with_hybrid`](Self::layout_with_hybrid), abandoning the
    /// model-assist attempt when `cancel` completes first.
    ///
    /// # Errors
    ///
    /// Returns `CartographError::Spec` or `CartographError::Setting` for an invalid request.
    pub async fn layout_with_hybrid_until<A, C>(
        &self,
        spec: &Specification,
        options: &LayoutOptions,
        assist: &A,
        cancel: C,
    ) -> Result<HybridLayout, CartographError>
    where
        A: ModelAssist,
        C: Future<Output = ()>,
    {
        self.check(spec, options)?;
        let started = Instant::now();
        let base = self.deterministic(spec, options);
        let Some(strategy) = self.assisted_strategy(&base) else {
            return Ok(HybridLayout {
                layout: base,
                decision: None,
            });
        };

        let theme = self.theme(options);
        let (mut layout, decision) = HybridCoordinator::new(&self.config)
            .enhance_until(assist, strategy, spec, theme, base, cancel)
            .await;
        layout.performance_metrics.processing_time = started.elapsed();
        Ok(HybridLayout {
            layout,
            decision: Some(decision),
        })
    }

    /// Races one attempt per assistant and keeps the first accepted refinement.
    ///
    /// # Errors
    ///
    /// Returns `CartographError::Spec` or `CartographError::Setting` for an invalid request.
    pub async fn layout_with_candidates<A: ModelAssist>(
        &self,
        spec: &Specification,
        options: &LayoutOptions,
        assists: &[A],
    ) -> Result<HybridLayout, CartographError> {
        self.check(spec, options)?;
        let started = Instant::now();
        let base = self.deterministic(spec, options);
        let Some(strategy) = self.assisted_strategy(&base) else {
            return Ok(HybridLayout {
                layout: base,
                decision: None,
            });
        };

        let theme = self.theme(options);
        let (mut layout, decision) = HybridCoordinator::new(&self.config)
            .race_candidates(assists, strategy, spec, theme, base)
            .await;
        layout.performance_metrics.processing_time = started.elapsed();
        Ok(HybridLayout {
            layout,
            decision: Some(decision),
        })
    }

    /// Validates the request before any layout work starts
    fn check(&self, spec: &Specification, options: &LayoutOptions) -> Result<(), CartographError> {
        spec.validate()?;
        self.check_options(options)?;
        Ok(())
    }

    fn check_options(&self, options: &LayoutOptions) -> Result<(), SettingError> {
        if let Some(dimensions) = &options.dimensions {
            validate_dimensions(dimensions)?;
        }
        if let Some(theme) = &options.theme {
            validate_theme(theme)?;
        }
        Ok(())
    }

    /// Strategy recorded on `base` when it asks for assistance at all
    fn assisted_strategy(&self, base: &LayoutResult) -> Option<ProcessingStrategy> {
        if !self.config.hybrid.enabled {
            debug!("Model assist disabled by configuration");
            return None;
        }
        base.performance_metrics
            .strategy
            .filter(|strategy| *strategy != ProcessingStrategy::DeterministicOnly)
    }

    fn theme<'a>(&'a self, options: &'a LayoutOptions) -> &'a Theme {
        options.theme.as_ref().unwrap_or(&self.config.theme)
    }

    /// Caller preferences with configured defaults filled in
    fn preferences(&self, options: &LayoutOptions) -> Preferences {
        let mut preferences = options.preferences.clone();
        if preferences.preferred_algorithm.is_none() {
            preferences.preferred_algorithm = self.config.layout.preferred_algorithm;
        }
        preferences.no_connectors |= self.config.layout.no_connectors;
        preferences
    }

    fn cached_base(
        &self,
        spec: &Specification,
        options: &LayoutOptions,
        cache: &mut LayoutCache,
    ) -> LayoutResult {
        let key = cache_key(
            spec,
            self.dimensions(options),
            self.theme(options),
            &self.preferences(options),
        );
        if let Some(mut cached) = cache.get(key) {
            debug!(key = key; "Layout cache hit");
            cached.performance_metrics.cache_hit = true;
            return cached;
        }
        let result = self.deterministic(spec, options);
        cache.insert(key, result.clone());
        result
    }

    fn dimensions(&self, options: &LayoutOptions) -> Dimensions {
        options
            .dimensions
            .unwrap_or_else(|| self.config.canvas.default_dimensions())
    }

    /// The deterministic pipeline for an already validated specification
    fn deterministic(&self, spec: &Specification, options: &LayoutOptions) -> LayoutResult {
        let started = Instant::now();
        let preferences = self.preferences(options);
        let theme = self.theme(options);

        let tier = classify_complexity(spec);
        let strategy = determine_strategy(tier, &preferences);
        let algorithm = select_layout_algorithm(spec, &preferences);
        info!(
            algorithm:% = algorithm,
            complexity:% = tier,
            strategy:% = strategy,
            nodes = spec.node_count();
            "Laying out specification"
        );

        let layout_config = &self.config.layout;
        let engines = EngineBuilder::new()
            .with_min_spacing(layout_config.min_spacing.max(layout_config.collision_padding))
            .with_connectors(!preferences.no_connectors)
            .with_force(self.config.force.clone())
            .with_radial(self.config.radial.clone());

        let mut result = engines.calculate(algorithm, spec, self.dimensions(options), theme);
        layout::finalize(&mut result, layout_config, &self.config.canvas);

        let metrics = &mut result.performance_metrics;
        metrics.complexity = Some(tier);
        metrics.strategy = Some(strategy);
        metrics.processing_time = started.elapsed();
        result
    }
}
