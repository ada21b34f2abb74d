//! Radial layout engine
//!
//! The topic sits at the center; every deeper level occupies a concentric
//! ring. The topic's branches split the full circle, the first one pointing
//! straight up, and each node's descendants split that node's angular sector.
//! Ring radii grow until neighbouring nodes on a ring no longer touch.

use std::f32::consts::{PI, SQRT_2, TAU};

use log::debug;

use cartograph_core::{geometry::Point, node::NodeType, spec::Specification, theme::Theme};

use crate::{
    config::{OddBranchPolicy, RadialConfig},
    layout::{
        connector::ConnectorDescriptor,
        engines::{HierarchyEngine, assemble, tree::Tree},
        result::{Dimensions, LayoutAlgorithm, LayoutResult},
    },
};

/// Radial layout engine
pub struct Engine {
    config: RadialConfig,
    min_spacing: f32,
    draw_connectors: bool,
}

impl Engine {
    pub fn new(config: RadialConfig) -> Self {
        Self {
            config,
            min_spacing: 0.0,
            draw_connectors: true,
        }
    }

    /// Set the smallest gap between nodes
    pub fn set_min_spacing(&mut self, spacing: f32) -> &mut Self {
        self.min_spacing = spacing;
        self
    }

    pub fn set_draw_connectors(&mut self, draw_connectors: bool) -> &mut Self {
        self.draw_connectors = draw_connectors;
        self
    }

    /// Empty slots added next to the topic's branches
    fn reserved_slots(&self, branches: usize) -> usize {
        match self.config.odd_branch_policy {
            OddBranchPolicy::ReserveSlot if branches % 2 == 1 => 1,
            _ => 0,
        }
    }

    /// Angle and sector width of every node
    fn sectors(&self, tree: &Tree, reserved: usize) -> (Vec<f32>, Vec<f32>) {
        let mut angles = vec![0.0; tree.len()];
        let mut sectors = vec![TAU; tree.len()];

        let branches = &tree.node(0).children;
        let slots = branches.len() + reserved;
        if slots > 0 {
            let step = TAU / slots as f32;
            let start = -PI / 2.0 - step / 2.0;
            for (slot, &branch) in branches.iter().enumerate() {
                angles[branch] = start + (slot as f32 + 0.5) * step;
                sectors[branch] = step;
            }
        }

        // Pre-order guarantees a parent's sector is known before its children's
        for idx in 1..tree.len() {
            let children = &tree.node(idx).children;
            if children.is_empty() {
                continue;
            }
            let share = sectors[idx] / children.len() as f32;
            let first = angles[idx] - sectors[idx] / 2.0;
            for (position, &child) in children.iter().enumerate() {
                angles[child] = first + (position as f32 + 0.5) * share;
                sectors[child] = share;
            }
        }
        (angles, sectors)
    }

    /// Radius of every ring, index 0 being the topic at the center
    fn ring_radii(&self, tree: &Tree, sectors: &[f32]) -> Vec<f32> {
        let levels = tree.max_depth() + 1;
        let mut diagonals = vec![0.0_f32; levels];
        let mut narrowest = vec![TAU; levels];
        for (idx, node) in tree.iter().enumerate() {
            diagonals[node.depth] = diagonals[node.depth].max(node.size.diagonal());
            narrowest[node.depth] = narrowest[node.depth].min(sectors[idx]);
        }

        // Padded boxes stay apart once their circumscribed circles are this far apart
        let clearance = self.min_spacing * SQRT_2;
        let ring_gap = self.config.ring_gap.max(clearance);

        let mut radii = vec![0.0_f32; levels];
        for depth in 1..levels {
            let outward = radii[depth - 1] + diagonals[depth - 1] / 2.0 + ring_gap + diagonals[depth] / 2.0;
            let chord = diagonals[depth] + clearance;
            let around = chord / (2.0 * (narrowest[depth].min(PI) / 2.0).sin());
            radii[depth] = outward.max(around);
        }
        radii
    }
}

impl HierarchyEngine for Engine {
    fn calculate(&self, spec: &Specification, dimensions: Dimensions, theme: &Theme) -> LayoutResult {
        let tree = Tree::build(spec, theme, NodeType::for_radial_depth);
        let reserved = self.reserved_slots(spec.children().len());

        let (angles, sectors) = self.sectors(&tree, reserved);
        let radii = self.ring_radii(&tree, &sectors);

        let (xs, ys): (Vec<f32>, Vec<f32>) = tree
            .iter()
            .zip(&angles)
            .map(|(node, &angle)| {
                let center = Point::default().polar_offset(radii[node.depth], angle);
                (center.x(), center.y())
            })
            .unzip();

        let connectors = if self.draw_connectors {
            tree.families()
                .flat_map(|(parent, children)| {
                    children
                        .iter()
                        .map(move |&child| ConnectorDescriptor::edge(parent, child, theme))
                })
                .collect()
        } else {
            Vec::new()
        };

        debug!(nodes = tree.len(), rings = radii.len() - 1, reserved; "Radial layout calculated");
        let mut result = assemble(tree.into_nodes(&xs, &ys), connectors, dimensions, LayoutAlgorithm::Radial);
        result.performance_metrics.reserved_slots = reserved;
        result
    }
}
