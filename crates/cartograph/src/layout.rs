//! Layout pipeline: engines, collision handling and canvas fitting.
//!
//! [`finalize`] is the last stage every layout passes through, whichever
//! engine produced it and whether or not it was refined by a model-assist
//! suggestion.

pub mod canvas;
pub mod collision;
pub mod connector;
pub mod engines;
pub mod result;
pub mod spacing;

use log::debug;

pub use canvas::{center_in_canvas, fit_to_canvas, optimize_canvas_dimensions};
pub use collision::{
    CollisionReport, detect_collisions, max_overlap_area, resolve_collisions,
    validate_and_adjust_boundaries,
};
pub use connector::{ConnectorDescriptor, ConnectorKind, PathSegment};
pub use engines::{EngineBuilder, HierarchyEngine};
pub use result::{
    Dimensions, FontWeight, LayoutAlgorithm, LayoutResult, NodePosition, NodeStyle,
    PerformanceMetrics,
};
pub use spacing::{Spacing, centering_anchor};

use crate::config::{CanvasConfig, LayoutConfig};

/// Brings a layout into its final, renderable state.
///
/// Nodes are clamped into the canvas, separated, placed on a tight canvas
/// and centered there; connector geometry is then rebuilt and the metrics
/// filled in. Running it again on its own output changes nothing.
pub fn finalize(result: &mut LayoutResult, layout: &LayoutConfig, canvas: &CanvasConfig) {
    result.dimensions = fit_to_canvas(&mut result.nodes, result.dimensions);
    let mut adjustments = validate_and_adjust_boundaries(&mut result.nodes, result.dimensions);

    let report = resolve_collisions(
        &mut result.nodes,
        layout.collision_padding,
        layout.max_collision_iterations,
    );

    // Separation can push nodes past the edge, so size the canvas afterwards
    result.dimensions = optimize_canvas_dimensions(&result.nodes, result.dimensions, canvas);
    center_in_canvas(&mut result.nodes, result.dimensions);
    adjustments += validate_and_adjust_boundaries(&mut result.nodes, result.dimensions);

    result.route_connectors();

    let metrics = &mut result.performance_metrics;
    metrics.node_count = result.nodes.len();
    metrics.connector_count = result.connectors.len();
    metrics.collision_iterations = report.iterations;
    metrics.residual_collisions = report.residual;
    metrics.boundary_adjustments = adjustments;

    debug!(
        width = result.dimensions.width,
        height = result.dimensions.height,
        collision_iterations = report.iterations,
        residual = report.residual,
        adjustments;
        "Layout finalized"
    );
}

#[cfg(test)]
mod tests {
    use cartograph_core::{
        geometry::{Point, Size},
        node::NodeType,
    };

    use super::*;

    fn crowded() -> LayoutResult {
        let nodes = (0..5)
            .map(|i| {
                NodePosition::new(format!("n{i}"), NodeType::Part, Size::new(60.0, 30.0))
                    .at(Point::new(i as f32 * 10.0, 0.0))
            })
            .collect();
        LayoutResult::new(nodes, vec![], Dimensions::default(), LayoutAlgorithm::Grouped)
    }

    #[test]
    fn test_finalize_separates_and_contains() {
        let mut result = crowded();
        finalize(&mut result, &LayoutConfig::default(), &CanvasConfig::default());

        assert!(result.is_contained());
        assert!(detect_collisions(&result.nodes, 20.0).is_empty());
        assert!(result.performance_metrics.collision_iterations > 0);
        assert_eq!(result.performance_metrics.residual_collisions, 0);
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let mut once = crowded();
        finalize(&mut once, &LayoutConfig::default(), &CanvasConfig::default());
        let mut twice = once.clone();
        finalize(&mut twice, &LayoutConfig::default(), &CanvasConfig::default());

        assert_eq!(once.dimensions, twice.dimensions);
        for (a, b) in once.nodes.iter().zip(&twice.nodes) {
            assert!((a.x - b.x).abs() < 0.01 && (a.y - b.y).abs() < 0.01);
        }
    }
}
