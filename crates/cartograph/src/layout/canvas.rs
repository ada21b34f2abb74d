//! Canvas sizing: fitting, tightening and centering content.

use log::debug;

use cartograph_core::geometry::Point;

use crate::{
    config::CanvasConfig,
    layout::result::{Dimensions, NodePosition, content_bounds},
};

/// Tight canvas around the placed nodes.
///
/// The result is the content's bounding box plus `dimensions.padding` on every
/// side, rounded up to whole units and never smaller than the configured
/// floor. Only the padding of `dimensions` is read, so applying the result and
/// optimizing again yields the same dimensions.
pub fn optimize_canvas_dimensions(
    nodes: &[NodePosition],
    dimensions: Dimensions,
    config: &CanvasConfig,
) -> Dimensions {
    let padding = dimensions.padding;
    let (content_width, content_height) = content_bounds(nodes)
        .map(|bounds| (bounds.width(), bounds.height()))
        .unwrap_or((0.0, 0.0));

    let optimized = Dimensions::new(
        (content_width + 2.0 * padding).ceil().max(config.min_width),
        (content_height + 2.0 * padding).ceil().max(config.min_height),
        padding,
    );
    debug!(
        width = optimized.width,
        height = optimized.height,
        content_width,
        content_height;
        "Optimized canvas dimensions"
    );
    optimized
}

/// Grows `dimensions` until the content fits, keeping the hint as a lower bound,
/// and moves the content to the top-left of the usable area.
pub fn fit_to_canvas(nodes: &mut [NodePosition], dimensions: Dimensions) -> Dimensions {
    let Some(bounds) = content_bounds(nodes) else {
        return dimensions;
    };
    let padding = dimensions.padding;
    let offset = Point::new(padding - bounds.min_x(), padding - bounds.min_y());
    for node in nodes.iter_mut() {
        node.translate(offset);
    }
    Dimensions::new(
        dimensions.width.max(bounds.width() + 2.0 * padding),
        dimensions.height.max(bounds.height() + 2.0 * padding),
        padding,
    )
}

/// Moves the content so its bounding box is centered on the canvas
pub fn center_in_canvas(nodes: &mut [NodePosition], dimensions: Dimensions) {
    let Some(bounds) = content_bounds(nodes) else {
        return;
    };
    let target = Point::new(dimensions.width / 2.0, dimensions.height / 2.0);
    let offset = target.sub_point(bounds.center());
    for node in nodes.iter_mut() {
        node.translate(offset);
    }
}


#[cfg(test)]
mod proptest_tests {
    use cartograph_core::{geometry::Size, node::NodeType};
    use proptest::prelude::*;

    use super::*;

    fn nodes_strategy() -> impl Strategy<Value = Vec<NodePosition>> {
        prop::collection::vec(
            (-500.0f32..1500.0, -500.0f32..1500.0, 1.0f32..200.0, 1.0f32..80.0),
            0..20,
        )
        .prop_map(|specs| {
            specs
                .into_iter()
                .map(|(x, y, w, h)| {
                    NodePosition::new("n", NodeType::Part, Size::new(w, h)).at(Point::new(x, y))
                })
                .collect()
        })
    }

    /// Optimizing twice yields the same dimensions as optimizing once.
    fn check_idempotent(nodes: Vec<NodePosition>, padding: f32) -> Result<(), TestCaseError> {
        let config = CanvasConfig::default();
        let hint = Dimensions::new(700.0, 500.0, padding);
        let once = optimize_canvas_dimensions(&nodes, hint, &config);
        let twice = optimize_canvas_dimensions(&nodes, once, &config);
        prop_assert_eq!(once, twice);
        Ok(())
    }

    /// Centered content always fits the optimized canvas.
    fn check_centered_content_is_contained(
        mut nodes: Vec<NodePosition>,
    ) -> Result<(), TestCaseError> {
        let config = CanvasConfig::default();
        let dims = optimize_canvas_dimensions(&nodes, Dimensions::default(), &config);
        center_in_canvas(&mut nodes, dims);
        let usable = dims.usable_bounds().grow(0.01);
        for node in &nodes {
            prop_assert!(usable.contains(&node.bounds()));
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn optimize_is_idempotent(nodes in nodes_strategy(), padding in 0.0f32..80.0) {
            check_idempotent(nodes, padding)?;
        }

        #[test]
        fn centered_content_is_contained(nodes in nodes_strategy()) {
            check_centered_content_is_contained(nodes)?;
        }
    }
}
