//! Stacked layout engine
//!
//! One left-aligned column per depth. Every parent is joined to its children
//! by a vertical brace, so the column gap is widened to leave room for it.

use log::debug;

use cartograph_core::{node::NodeType, spec::Specification, theme::Theme};

use crate::layout::{
    connector::{BRACE_ALLOWANCE, ConnectorDescriptor, ConnectorKind},
    engines::{HierarchyEngine, assemble, tree::Tree},
    result::{Dimensions, LayoutAlgorithm, LayoutResult},
    spacing::Spacing,
};

/// Stacked layout engine
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
        let xs = tree.aligned_columns(spacing.column_gap + BRACE_ALLOWANCE);

        let connectors = if self.draw_connectors {
            tree.families()
                .map(|(parent, children)| {
                    ConnectorDescriptor::brace(
                        ConnectorKind::VerticalBrace,
                        parent,
                        children.to_vec(),
                        theme,
                    )
                })
                .collect()
        } else {
            Vec::new()
        };

        debug!(nodes = tree.len(), braces = connectors.len(); "Stacked layout calculated");
        assemble(tree.into_nodes(&xs, &ys), connectors, dimensions, LayoutAlgorithm::Stacked)
    }
}
