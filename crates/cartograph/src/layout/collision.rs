//! Overlap detection, iterative separation and boundary clamping.
//!
//! None of these functions fail. They always leave the nodes in a best-effort
//! state, preferring "slightly overlapping but on the canvas" over giving up.

use log::{debug, trace, warn};

use cartograph_core::geometry::Point;

use crate::layout::result::{Dimensions, NodePosition};

/// Penetration below this is treated as touching, not colliding
const PENETRATION_EPSILON: f32 = 1e-3;

/// Outcome of [`resolve_collisions`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionReport {
    /// Separation passes that found at least one collision
    pub iterations: usize,
    /// Colliding pairs left after the last pass
    pub residual: usize,
}

impl CollisionReport {
    pub fn is_resolved(&self) -> bool {
        self.residual == 0
    }
}

/// How far two nodes must still move apart on each axis to clear `padding`.
fn penetration(a: &NodePosition, b: &NodePosition, padding: f32) -> (f32, f32) {
    let dx = (b.x - a.x).abs();
    let dy = (b.y - a.y).abs();
    (
        (a.width + b.width) / 2.0 + padding - dx,
        (a.height + b.height) / 2.0 + padding - dy,
    )
}

fn collides(a: &NodePosition, b: &NodePosition, padding: f32) -> bool {
    let (px, py) = penetration(a, b, padding);
    px > PENETRATION_EPSILON && py > PENETRATION_EPSILON
}

/// Finds all pairs `(i, j)` with `i < j` whose boxes come closer than `padding`.
///
/// ```
/// # use cartograph::layout::{detect_collisions, NodePosition};
/// # use cartograph_core::{geometry::{Point, Size}, node::NodeType};
/// let nodes = vec![
///     NodePosition::new("a", NodeType::Part, Size::new(40.0, 20.0)).at(Point::new(0.0, 0.0)),
///     NodePosition::new("b", NodeType::Part, Size::new(40.0, 20.0)).at(Point::new(50.0, 0.0)),
/// ];
/// // A 10px gap is fine without padding, but too tight for 20px of padding
/// assert!(detect_collisions(&nodes, 0.0).is_empty());
/// assert_eq!(detect_collisions(&nodes, 20.0), vec![(0, 1)]);
/// ```
pub fn detect_collisions(nodes: &[NodePosition], padding: f32) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for i in 0..nodes.len() {
        for j in (i + 1)..nodes.len() {
            if collides(&nodes[i], &nodes[j], padding) {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

/// Separates colliding nodes, moving the later node of each pair.
///
/// Each pass pushes node `j` away from node `i` along the axis with the
/// smaller penetration, by exactly the distance needed to clear `padding`.
/// Passes repeat until nothing collides or `max_iterations` is reached; the
/// first node (the topic in every built-in layout) is never moved.
pub fn resolve_collisions(
    nodes: &mut [NodePosition],
    padding: f32,
    max_iterations: usize,
) -> CollisionReport {
    let mut report = CollisionReport::default();

    for iteration in 0..max_iterations {
        let pairs = detect_collisions(nodes, padding);
        if pairs.is_empty() {
            return report;
        }
        trace!(iteration, pairs = pairs.len(); "Resolving collisions");
        report.iterations += 1;

        for (i, j) in pairs {
            let (px, py) = penetration(&nodes[i], &nodes[j], padding);
            if px <= PENETRATION_EPSILON || py <= PENETRATION_EPSILON {
                // An earlier push in this pass already separated them
                continue;
            }
            let offset = if px <= py {
                Point::new(direction(nodes[j].x - nodes[i].x) * px, 0.0)
            } else {
                Point::new(0.0, direction(nodes[j].y - nodes[i].y) * py)
            };
            nodes[j].translate(offset);
        }
    }

    report.residual = detect_collisions(nodes, padding).len();
    if report.residual > 0 {
        warn!(
            residual = report.residual,
            max_iterations;
            "Collision budget exhausted with overlaps remaining"
        );
    } else {
        debug!(iterations = report.iterations; "Collisions resolved");
    }
    report
}

fn direction(delta: f32) -> f32 {
    if delta < 0.0 { -1.0 } else { 1.0 }
}

/// Clamps every node so its box lies within `[padding, dimension - padding]`.
///
/// A node wider or taller than the usable area is centered on that axis.
/// Returns the number of nodes that had to move.
pub fn validate_and_adjust_boundaries(nodes: &mut [NodePosition], dimensions: Dimensions) -> usize {
    let mut adjusted = 0;
    for node in nodes.iter_mut() {
        let x = clamp_axis(node.x, node.width, dimensions.width, dimensions.padding);
        let y = clamp_axis(node.y, node.height, dimensions.height, dimensions.padding);
        if x != node.x || y != node.y {
            trace!(text = node.text, from_x = node.x, from_y = node.y, x, y; "Clamped node into canvas");
            node.x = x;
            node.y = y;
            adjusted += 1;
        }
    }
    adjusted
}

fn clamp_axis(center: f32, extent: f32, canvas: f32, padding: f32) -> f32 {
    let min = padding + extent / 2.0;
    let max = canvas - padding - extent / 2.0;
    if min > max {
        canvas / 2.0
    } else {
        center.clamp(min, max)
    }
}

/// Largest pairwise overlap area, ignoring padding
pub fn max_overlap_area(nodes: &[NodePosition]) -> f32 {
    let mut max = 0.0_f32;
    for i in 0..nodes.len() {
        for j in (i + 1)..nodes.len() {
            if let Some(overlap) = nodes[i].bounds().intersection(&nodes[j].bounds()) {
                max = max.max(overlap.area());
            }
        }
    }
    max
}


#[cfg(test)]
mod proptest_tests {
    use cartograph_core::{geometry::Size, node::NodeType};
    use proptest::prelude::*;

    use super::*;

    fn nodes_strategy() -> impl Strategy<Value = Vec<NodePosition>> {
        prop::collection::vec(
            (0.0f32..400.0, 0.0f32..300.0, 20.0f32..80.0, 20.0f32..40.0),
            1..12,
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

    /// Either every overlap is gone or the report admits residual pairs.
    fn check_collision_bound(mut nodes: Vec<NodePosition>) -> Result<(), TestCaseError> {
        let report = resolve_collisions(&mut nodes, 10.0, 10);
        if report.is_resolved() {
            prop_assert!(max_overlap_area(&nodes) <= 0.0);
        } else {
            prop_assert_eq!(report.iterations, 10);
        }
        Ok(())
    }

    /// Clamped nodes lie in the padded canvas whenever they fit.
    fn check_boundaries_contain(mut nodes: Vec<NodePosition>) -> Result<(), TestCaseError> {
        let dims = Dimensions::new(400.0, 300.0, 20.0);
        validate_and_adjust_boundaries(&mut nodes, dims);
        let usable = dims.usable_bounds().grow(0.001);
        for node in &nodes {
            prop_assert!(usable.contains(&node.bounds()));
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn collision_bound(nodes in nodes_strategy()) {
            check_collision_bound(nodes)?;
        }

        #[test]
        fn boundaries_contain(nodes in nodes_strategy()) {
            check_boundaries_contain(nodes)?;
        }
    }
}
