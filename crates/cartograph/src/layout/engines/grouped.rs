//! Grouped layout engine
//!
//! Each top-level child and its descendants form a compact block; blocks are
//! stacked vertically and children start just right of their own parent
//! rather than in a shared column. Parents are centered on their children
//! with the odd/even rule.

use log::debug;

use cartograph_core::{node::NodeType, spec::Specification, theme::Theme};

use crate::layout::{
    connector::ConnectorDescriptor,
    engines::{HierarchyEngine, assemble, tree::Tree},
    result::{Dimensions, LayoutAlgorithm, LayoutResult},
    spacing::Spacing,
};

/// Grouped layout engine
pub struct Engine {
    min_spacing: f32,
    draw_connectors: bool,
}

impl Engine {
    pub fn new() -> Self {
        Self {
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
}

impl HierarchyEngine for Engine {
    fn calculate(&self, spec: &Specification, dimensions: Dimensions, theme: &Theme) -> LayoutResult {
        let tree = Tree::build(spec, theme, NodeType::for_hierarchy_depth);
        let spacing = Spacing::for_stats(&spec.stats(), self.min_spacing);

        let ys = tree.stack_vertically(&spacing);
        let xs = tree.compact_columns(spacing.column_gap);

        let connectors: Vec<ConnectorDescriptor> = if self.draw_connectors {
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

        debug!(
            nodes = tree.len(),
            groups = spec.children().len(),
            group_gap = spacing.group_gap;
            "Grouped layout calculated"
        );
        assemble(tree.into_nodes(&xs, &ys), connectors, dimensions, LayoutAlgorithm::Grouped)
    }
}
