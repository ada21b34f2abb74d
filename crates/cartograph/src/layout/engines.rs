//! Layout engine factory module
//!
//! Every algorithm of the family implements [`HierarchyEngine`]: it takes a
//! validated specification, canvas dimensions and a theme, and returns a
//! [`LayoutResult`] whose node boxes all fit the (possibly grown) canvas.
//! Engines are pure: equal inputs give equal outputs.
//!
//! [`EngineBuilder`] carries the shared configuration and dispatches to the
//! engine for a requested [`LayoutAlgorithm`].

mod force;
mod grouped;
mod paired;
mod radial;
mod stacked;
mod tree;

use log::debug;

use cartograph_core::{spec::Specification, theme::Theme};

use crate::{
    config::{ForceConfig, RadialConfig},
    layout::{
        canvas::fit_to_canvas,
        connector::ConnectorDescriptor,
        result::{Dimensions, LayoutAlgorithm, LayoutResult, NodePosition},
    },
};

/// Trait defining the interface for the layout algorithm family
pub trait HierarchyEngine {
    /// Calculate a layout for `spec` on a canvas of at least `dimensions`.
    ///
    /// The returned dimensions may be larger than requested when the content
    /// needs more room; they are never smaller.
    fn calculate(&self, spec: &Specification, dimensions: Dimensions, theme: &Theme) -> LayoutResult;
}

/// Builder for configuring and running layout engines.
#[derive(Debug, Clone)]
pub struct EngineBuilder {
    min_spacing: f32,
    draw_connectors: bool,
    force: ForceConfig,
    radial: RadialConfig,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            min_spacing: 0.0,
            draw_connectors: true,
            force: ForceConfig::default(),
            radial: RadialConfig::default(),
        }
    }
}

impl EngineBuilder {
    /// Create a new engine builder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the smallest gap any engine leaves between two nodes
    pub fn with_min_spacing(mut self, spacing: f32) -> Self {
        self.min_spacing = spacing;
        self
    }

    /// Enable or disable connector generation
    pub fn with_connectors(mut self, draw_connectors: bool) -> Self {
        self.draw_connectors = draw_connectors;
        self
    }

    /// Set the force-directed simulation parameters
    pub fn with_force(mut self, force: ForceConfig) -> Self {
        self.force = force;
        self
    }

    /// Set the radial layout parameters
    pub fn with_radial(mut self, radial: RadialConfig) -> Self {
        self.radial = radial;
        self
    }

    /// Run the engine for `algorithm`.
    ///
    /// Dispatch is a plain match over the closed algorithm set; each arm
    /// configures and runs one concrete engine.
    pub fn calculate(
        &self,
        algorithm: LayoutAlgorithm,
        spec: &Specification,
        dimensions: Dimensions,
        theme: &Theme,
    ) -> LayoutResult {
        let result = match algorithm {
            LayoutAlgorithm::Stacked => {
                let mut e = stacked::Engine::new();
                e.set_min_spacing(self.min_spacing)
                    .set_draw_connectors(self.draw_connectors);
                e.calculate(spec, dimensions, theme)
            }
            LayoutAlgorithm::Grouped => {
                let mut e = grouped::Engine::new();
                e.set_min_spacing(self.min_spacing)
                    .set_draw_connectors(self.draw_connectors);
                e.calculate(spec, dimensions, theme)
            }
            LayoutAlgorithm::Paired => {
                let mut e = paired::Engine::new();
                e.set_min_spacing(self.min_spacing)
                    .set_draw_connectors(self.draw_connectors);
                e.calculate(spec, dimensions, theme)
            }
            LayoutAlgorithm::ForceDirected => {
                let mut e = force::Engine::new(self.force.clone());
                e.set_draw_connectors(self.draw_connectors);
                e.calculate(spec, dimensions, theme)
            }
            LayoutAlgorithm::Radial => {
                let mut e = radial::Engine::new(self.radial.clone());
                e.set_min_spacing(self.min_spacing)
                    .set_draw_connectors(self.draw_connectors);
                e.calculate(spec, dimensions, theme)
            }
        };

        debug_assert!(
            result
                .nodes
                .iter()
                .all(|node| node.width > 0.0 && node.height > 0.0),
            "engines must emit positive node sizes"
        );
        debug!(
            algorithm:% = algorithm,
            nodes = result.nodes.len(),
            connectors = result.connectors.len();
            "Engine produced layout"
        );
        result
    }
}

/// Moves engine output onto the canvas and derives connector geometry
fn assemble(
    mut nodes: Vec<NodePosition>,
    connectors: Vec<ConnectorDescriptor>,
    dimensions: Dimensions,
    algorithm: LayoutAlgorithm,
) -> LayoutResult {
    let dimensions = fit_to_canvas(&mut nodes, dimensions);
    let mut result = LayoutResult::new(nodes, connectors, dimensions, algorithm);
    result.route_connectors();
    result
}
