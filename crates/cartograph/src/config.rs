//! Application configuration.
//!
//! Every section and every field has a default, so an empty TOML document
//! (or no document at all) yields a working configuration.
//!
//! ```toml
//! [layout]
//! preferred_algorithm = "radial"
//! collision_padding = 16.0
//!
//! [radial]
//! odd_branch_policy = "reserve_slot"
//!
//! [hybrid]
//! timeout_ms = 2500
//!
//! [theme]
//! font_topic = 28.0
//! stroke_color = "#1f2933"
//! ```

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use cartograph_core::theme::Theme;

use crate::layout::{Dimensions, LayoutAlgorithm};

/// Application configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Canvas defaults and floor
    #[serde(default)]
    pub canvas: CanvasConfig,

    /// Force-directed simulation parameters
    #[serde(default)]
    pub force: ForceConfig,

    /// Radial layout parameters
    #[serde(default)]
    pub radial: RadialConfig,

    /// Model-assist policy
    #[serde(default)]
    pub hybrid: HybridConfig,

    /// Default theme metrics
    #[serde(default)]
    pub theme: Theme,
}

/// A numeric setting outside the range the pipeline can work with.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingError {
    #[error("`{field}` must be a positive number, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    #[error("`{field}` must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },

    #[error("`force.damping` must be in (0, 1], got {0}")]
    Damping(f32),

    #[error("`hybrid.timeout_ms` must be at least 1")]
    ZeroTimeout,
}

fn positive(field: &'static str, value: f32) -> Result<(), SettingError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SettingError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), SettingError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SettingError::Negative { field, value })
    }
}

/// Checks the theme metrics used for text measurement and connector strokes.
///
/// # Errors
///
/// Returns the first font size that is not positive or a negative stroke width.
pub fn validate_theme(theme: &Theme) -> Result<(), SettingError> {
    positive("theme.font_topic", theme.font_topic)?;
    positive("theme.font_part", theme.font_part)?;
    positive("theme.font_subpart", theme.font_subpart)?;
    positive("theme.font_relationship", theme.font_relationship)?;
    non_negative("theme.stroke_width", theme.stroke_width)
}

/// Checks a canvas hint: a positive size and a non-negative padding.
///
/// # Errors
///
/// Returns the first offending field.
pub fn validate_dimensions(dimensions: &Dimensions) -> Result<(), SettingError> {
    positive("dimensions.width", dimensions.width)?;
    positive("dimensions.height", dimensions.height)?;
    non_negative("dimensions.padding", dimensions.padding)
}

impl AppConfig {
    /// Checks that numeric settings are usable.
    ///
    /// # Errors
    ///
    /// Returns the first offending setting.
    pub fn validate(&self) -> Result<(), SettingError> {
        positive("canvas.default_width", self.canvas.default_width)?;
        positive("canvas.default_height", self.canvas.default_height)?;
        positive("canvas.min_width", self.canvas.min_width)?;
        positive("canvas.min_height", self.canvas.min_height)?;
        non_negative("canvas.default_padding", self.canvas.default_padding)?;
        non_negative("layout.min_spacing", self.layout.min_spacing)?;
        non_negative("layout.collision_padding", self.layout.collision_padding)?;
        non_negative("layout.collision_tolerance", self.layout.collision_tolerance)?;
        non_negative("radial.ring_gap", self.radial.ring_gap)?;
        validate_theme(&self.theme)?;

        if !(self.force.damping > 0.0 && self.force.damping <= 1.0) {
            return Err(SettingError::Damping(self.force.damping));
        }
        if self.hybrid.timeout_ms == 0 {
            return Err(SettingError::ZeroTimeout);
        }
        Ok(())
    }
}

/// Layout configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Algorithm to use instead of content-driven selection
    pub preferred_algorithm: Option<LayoutAlgorithm>,

    /// Skip connector generation and prefer the grouped layout
    pub no_connectors: bool,

    /// Lower bound for every gap the layouts leave between nodes
    pub min_spacing: f32,

    /// Clearance the collision engine keeps between node boxes
    pub collision_padding: f32,

    /// Overlap area accepted between two nodes after resolution
    pub collision_tolerance: f32,

    /// Separation passes before residual overlap is accepted
    pub max_collision_iterations: usize,

    /// Entries kept by a cache built from this configuration
    pub cache_capacity: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            preferred_algorithm: None,
            no_connectors: false,
            min_spacing: 10.0,
            collision_padding: 20.0,
            collision_tolerance: 0.0,
            max_collision_iterations: 10,
            cache_capacity: 64,
        }
    }
}

/// Canvas defaults used when the caller gives no dimensions, and the size floor
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub default_width: f32,
    pub default_height: f32,
    pub default_padding: f32,
    pub min_width: f32,
    pub min_height: f32,
}

impl CanvasConfig {
    /// Dimensions used when the caller supplies none
    pub fn default_dimensions(&self) -> Dimensions {
        Dimensions::new(
            self.default_width,
            self.default_height,
            self.default_padding,
        )
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            default_width: 700.0,
            default_height: 500.0,
            default_padding: 40.0,
            min_width: 400.0,
            min_height: 300.0,
        }
    }
}

/// Force-directed simulation parameters
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
    pub iterations: usize,
    pub spring_constant: f32,
    pub repulsion_constant: f32,
    pub damping: f32,
    /// Extra clearance on top of the node sizes before repulsion strengthens
    pub min_distance: f32,
    /// The simulation stops early once no node moves further than this
    pub epsilon: f32,
    /// Seed for the initial jitter; equal seeds give equal layouts
    pub seed: u64,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            iterations: 100,
            spring_constant: 0.1,
            repulsion_constant: 1000.0,
            damping: 0.85,
            min_distance: 80.0,
            epsilon: 0.5,
            seed: 42,
        }
    }
}

/// What the radial layout does when the topic has an odd number of branches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OddBranchPolicy {
    /// Spread the branches evenly as they are
    #[default]
    Ignore,
    /// Leave one empty angular slot so branches balance left and right
    ReserveSlot,
}

/// Radial layout parameters
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RadialConfig {
    pub odd_branch_policy: OddBranchPolicy,
    /// Radial clearance between consecutive rings
    pub ring_gap: f32,
}

impl Default for RadialConfig {
    fn default() -> Self {
        Self {
            odd_branch_policy: OddBranchPolicy::Ignore,
            ring_gap: 40.0,
        }
    }
}

/// Model-assist policy
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HybridConfig {
    /// When false, every request runs deterministically
    pub enabled: bool,
    /// Upper bound on a single model-assist attempt
    pub timeout_ms: u64,
}

impl HybridConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for HybridConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_ms: 5000,
        }
    }
}
