//! Flattened specification tree shared by the tree-shaped engines.
//!
//! Nodes are stored in depth-first pre-order, so the topic is index 0, every
//! parent precedes its children and the order matches the emitted
//! [`NodePosition`] list.

use cartograph_core::{
    geometry::{Point, Size},
    node::NodeType,
    spec::{SpecNode, Specification},
    text,
    theme::Theme,
};

use crate::layout::{result::NodePosition, spacing::{Spacing, centering_anchor}};

#[derive(Debug, Clone)]
pub(super) struct TreeNode {
    pub text: String,
    pub node_type: NodeType,
    pub depth: usize,
    pub children: Vec<usize>,
    pub part_index: Option<usize>,
    pub subpart_index: Option<usize>,
    pub size: Size,
}

#[derive(Debug, Clone)]
pub(super) struct Tree {
    nodes: Vec<TreeNode>,
}

impl Tree {
    /// Flattens `spec`, typing each node with `node_type` by depth and sizing it from its text
    pub fn build(spec: &Specification, theme: &Theme, node_type: fn(usize) -> NodeType) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.push(spec.topic().trim(), 0, node_type, theme, None, None);
        for (part, child) in spec.children().iter().enumerate() {
            tree.add_subtree(child, 0, 1, node_type, theme, Some(part), None);
        }
        tree
    }

    #[allow(clippy::too_many_arguments)]
    fn add_subtree(
        &mut self,
        node: &SpecNode,
        parent: usize,
        depth: usize,
        node_type: fn(usize) -> NodeType,
        theme: &Theme,
        part_index: Option<usize>,
        subpart_index: Option<usize>,
    ) {
        let idx = self.push(node.name().trim(), depth, node_type, theme, part_index, subpart_index);
        self.nodes[parent].children.push(idx);
        for (position, child) in node.children().iter().enumerate() {
            // Deeper descendants keep the sub-part index of their depth-2 ancestor
            let subpart = if depth == 1 { Some(position) } else { subpart_index };
            self.add_subtree(child, idx, depth + 1, node_type, theme, part_index, subpart);
        }
    }

    fn push(
        &mut self,
        label: &str,
        depth: usize,
        node_type: fn(usize) -> NodeType,
        theme: &Theme,
        part_index: Option<usize>,
        subpart_index: Option<usize>,
    ) -> usize {
        let node_type = node_type(depth);
        self.nodes.push(TreeNode {
            text: label.to_string(),
            node_type,
            depth,
            children: Vec::new(),
            part_index,
            subpart_index,
            size: text::node_size(label, theme.font_size(node_type)),
        });
        self.nodes.len() - 1
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, idx: usize) -> &TreeNode {
        &self.nodes[idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.iter()
    }

    /// Parents with their children, in pre-order
    pub fn families(&self) -> impl Iterator<Item = (usize, &[usize])> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| !node.children.is_empty())
            .map(|(idx, node)| (idx, node.children.as_slice()))
    }

    /// Deepest level present, 0 for a topic-only tree
    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    fn gap_below(&self, idx: usize, spacing: &Spacing) -> f32 {
        if idx == 0 {
            spacing.group_gap
        } else {
            spacing.sibling_gap
        }
    }

    /// Center y of every node with subtrees stacked top to bottom.
    ///
    /// Siblings are separated by `group_gap` under the topic and `sibling_gap`
    /// deeper down. A parent always sits exactly on the [`centering_anchor`]
    /// of its children; when it is taller than the room above that anchor,
    /// its children move down instead.
    pub fn stack_vertically(&self, spacing: &Spacing) -> Vec<f32> {
        let mut ys = vec![0.0; self.nodes.len()];
        if !self.nodes.is_empty() {
            self.place_subtree(0, spacing, &mut ys);
        }
        ys
    }

    /// Places the subtree at `idx` with its top edge at 0 and returns its height
    fn place_subtree(&self, idx: usize, spacing: &Spacing, ys: &mut [f32]) -> f32 {
        let node = &self.nodes[idx];
        let half = node.size.height() / 2.0;
        if node.children.is_empty() {
            ys[idx] = half;
            return node.size.height();
        }

        let gap = self.gap_below(idx, spacing);
        let mut cursor = 0.0;
        for &child in &node.children {
            let height = self.place_subtree(child, spacing, ys);
            self.shift_subtree(child, cursor, ys);
            cursor += height + gap;
        }
        let stacked = cursor - gap;

        let child_ys: Vec<f32> = node.children.iter().map(|&c| ys[c]).collect();
        let anchor = centering_anchor(&child_ys).unwrap_or(stacked / 2.0);

        let lift = (half - anchor).max(0.0);
        if lift > 0.0 {
            for &child in &node.children {
                self.shift_subtree(child, lift, ys);
            }
        }
        ys[idx] = anchor + lift;
        (stacked + lift).max(ys[idx] + half)
    }

    fn shift_subtree(&self, idx: usize, dy: f32, ys: &mut [f32]) {
        ys[idx] += dy;
        for &child in &self.nodes[idx].children {
            self.shift_subtree(child, dy, ys);
        }
    }

    /// Center x of every node with one left-aligned column per depth
    pub fn aligned_columns(&self, column_gap: f32) -> Vec<f32> {
        let levels = self.max_depth() + 1;
        let mut widths = vec![0.0_f32; levels];
        for node in &self.nodes {
            widths[node.depth] = widths[node.depth].max(node.size.width());
        }
        let mut lefts = vec![0.0_f32; levels];
        for depth in 1..levels {
            lefts[depth] = lefts[depth - 1] + widths[depth - 1] + column_gap;
        }
        self.nodes
            .iter()
            .map(|node| lefts[node.depth] + node.size.width() / 2.0)
            .collect()
    }

    /// Center x of every node with children starting `column_gap` right of their own parent
    pub fn compact_columns(&self, column_gap: f32) -> Vec<f32> {
        let mut xs = vec![0.0_f32; self.nodes.len()];
        let Some(topic) = self.nodes.first() else {
            return xs;
        };
        xs[0] = topic.size.width() / 2.0;
        for idx in 0..self.nodes.len() {
            let right = xs[idx] + self.nodes[idx].size.width() / 2.0;
            for &child in &self.nodes[idx].children {
                xs[child] = right + column_gap + self.nodes[child].size.width() / 2.0;
            }
        }
        xs
    }

    /// Emits positioned nodes in tree order
    pub fn into_nodes(self, xs: &[f32], ys: &[f32]) -> Vec<NodePosition> {
        self.nodes
            .into_iter()
            .enumerate()
            .map(|(idx, node)| {
                let mut position = NodePosition::new(node.text, node.node_type, node.size)
                    .at(Point::new(xs[idx], ys[idx]));
                position.part_index = node.part_index;
                position.subpart_index = node.subpart_index;
                position
            })
            .collect()
    }
}
