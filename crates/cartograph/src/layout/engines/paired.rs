//! Paired layout engine
//!
//! Draws an explicit connector for every parent/child pair. The common three
//! children by three sub-children shape gets a dedicated arrangement: the
//! topic on top, the children in a row below it joined by a horizontal brace,
//! and each child's sub-children stacked underneath it.

use log::debug;

use cartograph_core::{node::NodeType, spec::Specification, theme::Theme};

use crate::layout::{
    connector::{BRACE_ALLOWANCE, ConnectorDescriptor, ConnectorKind},
    engines::{HierarchyEngine, assemble, tree::Tree},
    result::{Dimensions, LayoutAlgorithm, LayoutResult},
    spacing::{Spacing, centering_anchor},
};

/// Paired layout engine
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

    fn pair_edges(&self, tree: &Tree, theme: &Theme) -> Vec<ConnectorDescriptor> {
        tree.families()
            .flat_map(|(parent, children)| {
                children
                    .iter()
                    .map(move |&child| ConnectorDescriptor::edge(parent, child, theme))
            })
            .collect()
    }

    /// Columns of parent/child pairs for arbitrary trees
    fn columns(&self, tree: &Tree, spacing: &Spacing) -> (Vec<f32>, Vec<f32>) {
        let ys = tree.stack_vertically(spacing);
        let xs = tree.aligned_columns(spacing.column_gap);
        (xs, ys)
    }

    /// Topic above a row of children, each child above its own sub-children
    fn three_by_three(&self, tree: &Tree, spacing: &Spacing) -> (Vec<f32>, Vec<f32>) {
        let mut xs = vec![0.0; tree.len()];
        let mut ys = vec![0.0; tree.len()];

        let topic = tree.node(0);
        ys[0] = topic.size.height() / 2.0;

        let children = &topic.children;
        let tallest_child = children
            .iter()
            .map(|&c| tree.node(c).size.height())
            .fold(0.0, f32::max);
        let row_y = topic.size.height()
            + spacing.column_gap
            + BRACE_ALLOWANCE
            + tallest_child / 2.0;

        let mut cursor = 0.0;
        for &child in children {
            let node = tree.node(child);
            let column_width = node
                .children
                .iter()
                .map(|&s| tree.node(s).size.width())
                .fold(node.size.width(), f32::max);
            let center = cursor + column_width / 2.0;
            cursor += column_width + spacing.column_gap;

            xs[child] = center;
            ys[child] = row_y;

            let mut bottom = row_y + node.size.height() / 2.0;
            for &sub in &node.children {
                let height = tree.node(sub).size.height();
                xs[sub] = center;
                ys[sub] = bottom + spacing.sibling_gap + height / 2.0;
                bottom = ys[sub] + height / 2.0;
            }
        }

        let child_xs: Vec<f32> = children.iter().map(|&c| xs[c]).collect();
        xs[0] = centering_anchor(&child_xs).unwrap_or(topic.size.width() / 2.0);
        (xs, ys)
    }
}

impl HierarchyEngine for Engine {
    fn calculate(&self, spec: &Specification, dimensions: Dimensions, theme: &Theme) -> LayoutResult {
        let tree = Tree::build(spec, theme, NodeType::for_hierarchy_depth);
        let stats = spec.stats();
        let spacing = Spacing::for_stats(&stats, self.min_spacing);
        let grid = stats.is_three_by_three(spec);

        let (xs, ys) = if grid {
            self.three_by_three(&tree, &spacing)
        } else {
            self.columns(&tree, &spacing)
        };

        let connectors = match (self.draw_connectors, grid) {
            (false, _) => Vec::new(),
            (true, true) => {
                let root_children = tree.node(0).children.clone();
                let mut connectors = vec![ConnectorDescriptor::brace(
                    ConnectorKind::HorizontalBrace,
                    0,
                    root_children,
                    theme,
                )];
                connectors.extend(
                    self.pair_edges(&tree, theme)
                        .into_iter()
                        .filter(|edge| edge.source != 0),
                );
                connectors
            }
            (true, false) => self.pair_edges(&tree, theme),
        };

        debug!(nodes = tree.len(), three_by_three = grid; "Paired layout calculated");
        assemble(tree.into_nodes(&xs, &ys), connectors, dimensions, LayoutAlgorithm::Paired)
    }
}
