//! Connector descriptors: braces and edges between placed nodes.
//!
//! A connector records which nodes it links (by index into
//! [`LayoutResult::nodes`](super::LayoutResult)) together with fully derived
//! geometry, so a renderer can draw it without looking at node positions.
//! Geometry is rebuilt with [`ConnectorDescriptor::route`] whenever nodes move.

use std::fmt::Write;

use serde::Serialize;

use cartograph_core::{color::Color, geometry::Point, theme::Theme};

use crate::layout::result::NodePosition;

/// Share of the brace span used for the tip depth
const BRACE_TIP_RATIO: f32 = 0.05;

/// Tip depth is never shallower than this
const MIN_BRACE_TIP: f32 = 6.0;

/// Space layouts leave between a parent and its children for a brace
pub const BRACE_ALLOWANCE: f32 = 24.0;

/// What kind of link a connector draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorKind {
    /// Curly brace spanning vertically stacked targets, tip toward a parent on the left
    VerticalBrace,
    /// Curly brace spanning a row of targets, tip toward a parent above
    HorizontalBrace,
    /// Straight segment between two node boxes
    Edge,
}

/// One drawing instruction of a connector path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PathSegment {
    MoveTo { to: Point },
    LineTo { to: Point },
    CubicTo { ctrl1: Point, ctrl2: Point, to: Point },
}

/// A visual link between a source node and one or more targets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectorDescriptor {
    pub kind: ConnectorKind,
    pub source: usize,
    pub targets: Vec<usize>,
    /// Relationship label node sitting on this edge, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_node: Option<usize>,
    pub anchors: Vec<Point>,
    pub path: Vec<PathSegment>,
    pub stroke_color: Color,
    pub stroke_width: f32,
}

impl ConnectorDescriptor {
    /// Creates a brace from `source` to `targets`. Geometry is empty until routed.
    pub fn brace(kind: ConnectorKind, source: usize, targets: Vec<usize>, theme: &Theme) -> Self {
        Self::unrouted(kind, source, targets, theme)
    }

    /// Creates a straight edge between two nodes
    pub fn edge(source: usize, target: usize, theme: &Theme) -> Self {
        Self::unrouted(ConnectorKind::Edge, source, vec![target], theme)
    }

    /// Attaches a relationship label node
    pub fn with_label_node(mut self, label_node: usize) -> Self {
        self.label_node = Some(label_node);
        self
    }

    fn unrouted(kind: ConnectorKind, source: usize, targets: Vec<usize>, theme: &Theme) -> Self {
        Self {
            kind,
            source,
            targets,
            label_node: None,
            anchors: Vec::new(),
            path: Vec::new(),
            stroke_color: theme.stroke_color,
            stroke_width: theme.stroke_width,
        }
    }

    /// Rebuilds anchors and path from node positions.
    ///
    /// Indices outside `nodes` leave the connector without geometry.
    pub fn route(&mut self, nodes: &[NodePosition]) {
        self.anchors.clear();
        self.path.clear();

        let Some(source) = nodes.get(self.source) else {
            return;
        };
        let targets: Vec<&NodePosition> =
            self.targets.iter().filter_map(|&i| nodes.get(i)).collect();
        if targets.len() != self.targets.len() || targets.is_empty() {
            return;
        }

        match self.kind {
            ConnectorKind::VerticalBrace => self.route_vertical_brace(source, &targets),
            ConnectorKind::HorizontalBrace => self.route_horizontal_brace(source, &targets),
            ConnectorKind::Edge => self.route_edge(source, targets[0]),
        }
    }

    fn route_vertical_brace(&mut self, source: &NodePosition, targets: &[&NodePosition]) {
        let top = targets.iter().map(|t| t.top()).fold(f32::MAX, f32::min);
        let bottom = targets.iter().map(|t| t.bottom()).fold(f32::MIN, f32::max);
        let targets_left = targets.iter().map(|t| t.left()).fold(f32::MAX, f32::min);

        let gap = (targets_left - source.right()).max(0.0);
        let span = bottom - top;
        let depth = tip_depth(span, gap);

        let back_x = targets_left - (gap - depth) / 2.0;
        let tip_x = back_x - depth;
        let tip_y = source.y.clamp(top, bottom);

        let attach = Point::new(source.right(), source.y);
        let tip = Point::new(tip_x, tip_y);
        let upper = Point::new(back_x, top);
        let lower = Point::new(back_x, bottom);

        self.anchors = vec![attach, tip, upper, lower];
        self.path = vec![
            PathSegment::MoveTo { to: attach },
            PathSegment::LineTo { to: tip },
            PathSegment::MoveTo { to: upper },
            PathSegment::CubicTo {
                ctrl1: Point::new(tip_x, top),
                ctrl2: Point::new(back_x, tip_y),
                to: tip,
            },
            PathSegment::CubicTo {
                ctrl1: Point::new(back_x, tip_y),
                ctrl2: Point::new(tip_x, bottom),
                to: lower,
            },
        ];
        self.stroke_width = brace_stroke_width(span);
    }

    fn route_horizontal_brace(&mut self, source: &NodePosition, targets: &[&NodePosition]) {
        let left = targets.iter().map(|t| t.left()).fold(f32::MAX, f32::min);
        let right = targets.iter().map(|t| t.right()).fold(f32::MIN, f32::max);
        let targets_top = targets.iter().map(|t| t.top()).fold(f32::MAX, f32::min);

        let gap = (targets_top - source.bottom()).max(0.0);
        let span = right - left;
        let depth = tip_depth(span, gap);

        let back_y = targets_top - (gap - depth) / 2.0;
        let tip_y = back_y - depth;
        let tip_x = source.x.clamp(left, right);

        let attach = Point::new(source.x, source.bottom());
        let tip = Point::new(tip_x, tip_y);
        let start = Point::new(left, back_y);
        let end = Point::new(right, back_y);

        self.anchors = vec![attach, tip, start, end];
        self.path = vec![
            PathSegment::MoveTo { to: attach },
            PathSegment::LineTo { to: tip },
            PathSegment::MoveTo { to: start },
            PathSegment::CubicTo {
                ctrl1: Point::new(left, tip_y),
                ctrl2: Point::new(tip_x, back_y),
                to: tip,
            },
            PathSegment::CubicTo {
                ctrl1: Point::new(tip_x, back_y),
                ctrl2: Point::new(right, tip_y),
                to: end,
            },
        ];
        self.stroke_width = brace_stroke_width(span);
    }

    fn route_edge(&mut self, source: &NodePosition, target: &NodePosition) {
        let start = clip_to_box(source, target.center());
        let end = clip_to_box(target, source.center());
        self.anchors = vec![start, end];
        self.path = vec![
            PathSegment::MoveTo { to: start },
            PathSegment::LineTo { to: end },
        ];
    }

    /// Renders the path as SVG path data
    ///
    /// ```
    /// # use cartograph::layout::{ConnectorDescriptor, NodePosition};
    /// # use cartograph_core::{geometry::{Point, Size}, node::NodeType, theme::Theme};
    /// let nodes = vec![
    ///     NodePosition::new("a", NodeType::Topic, Size::new(20.0, 20.0)).at(Point::new(0.0, 0.0)),
    ///     NodePosition::new("b", NodeType::Part, Size::new(20.0, 20.0)).at(Point::new(100.0, 0.0)),
    /// ];
    /// let mut edge = ConnectorDescriptor::edge(0, 1, &Theme::default());
    /// edge.route(&nodes);
    /// assert_eq!(edge.svg_path(), "M 10 0 L 90 0");
    /// ```
    pub fn svg_path(&self) -> String {
        let mut out = String::new();
        for segment in &self.path {
            if !out.is_empty() {
                out.push(' ');
            }
            // Writing to a String cannot fail
            let _ = match segment {
                PathSegment::MoveTo { to } => write!(out, "M {} {}", to.x(), to.y()),
                PathSegment::LineTo { to } => write!(out, "L {} {}", to.x(), to.y()),
                PathSegment::CubicTo { ctrl1, ctrl2, to } => write!(
                    out,
                    "C {} {} {} {} {} {}",
                    ctrl1.x(),
                    ctrl1.y(),
                    ctrl2.x(),
                    ctrl2.y(),
                    to.x(),
                    to.y()
                ),
            };
        }
        out
    }
}

fn tip_depth(span: f32, gap: f32) -> f32 {
    (span * BRACE_TIP_RATIO).max(MIN_BRACE_TIP).min(gap / 2.0)
}

/// Brace stroke width scaled by the spanned extent
pub fn brace_stroke_width(span: f32) -> f32 {
    let scale = (span / 600.0).clamp(0.5, 2.0);
    (3.2 * scale).clamp(1.5, 5.5)
}

/// Point where the ray from `node`'s center toward `toward` leaves its box
fn clip_to_box(node: &NodePosition, toward: Point) -> Point {
    let center = node.center();
    let direction = toward.sub_point(center);
    let dx = direction.x().abs();
    let dy = direction.y().abs();
    if dx < f32::EPSILON && dy < f32::EPSILON {
        return center;
    }

    let tx = if dx > f32::EPSILON {
        (node.width / 2.0) / dx
    } else {
        f32::MAX
    };
    let ty = if dy > f32::EPSILON {
        (node.height / 2.0) / dy
    } else {
        f32::MAX
    };
    center.add_point(direction.scale(tx.min(ty).min(1.0)))
}

#[cfg(test)]
mod tests {
    use cartograph_core::{geometry::Size, node::NodeType};
    use float_cmp::approx_eq;

    use super::*;

    fn node(x: f32, y: f32, w: f32, h: f32) -> NodePosition {
        NodePosition::new("n", NodeType::Part, Size::new(w, h)).at(Point::new(x, y))
    }

    #[test]
    fn test_vertical_brace_sits_between_parent_and_children() {
        let nodes = vec![
            node(50.0, 100.0, 60.0, 30.0),
            node(200.0, 40.0, 60.0, 30.0),
            node(200.0, 100.0, 60.0, 30.0),
            node(200.0, 160.0, 60.0, 30.0),
        ];
        let mut brace = ConnectorDescriptor::brace(
            ConnectorKind::VerticalBrace,
            0,
            vec![1, 2, 3],
            &Theme::default(),
        );
        brace.route(&nodes);

        let tip = brace.anchors[1];
        assert!(tip.x() > nodes[0].right());
        assert!(tip.x() < nodes[1].left());
        assert!(approx_eq!(f32, tip.y(), 100.0));
        assert_eq!(brace.anchors[2].y(), nodes[1].top());
        assert_eq!(brace.anchors[3].y(), nodes[3].bottom());
        assert!(brace.svg_path().starts_with("M "));
        assert!(brace.svg_path().contains(" C "));
    }

    #[test]
    fn test_horizontal_brace_spans_row() {
        let nodes = vec![
            node(150.0, 20.0, 80.0, 30.0),
            node(50.0, 120.0, 60.0, 30.0),
            node(150.0, 120.0, 60.0, 30.0),
            node(250.0, 120.0, 60.0, 30.0),
        ];
        let mut brace = ConnectorDescriptor::brace(
            ConnectorKind::HorizontalBrace,
            0,
            vec![1, 2, 3],
            &Theme::default(),
        );
        brace.route(&nodes);

        assert_eq!(brace.anchors[2].x(), nodes[1].left());
        assert_eq!(brace.anchors[3].x(), nodes[3].right());
        let tip = brace.anchors[1];
        assert!(tip.y() > nodes[0].bottom() && tip.y() < nodes[1].top());
    }

    #[test]
    fn test_edge_is_clipped_to_boxes() {
        let nodes = vec![node(0.0, 0.0, 20.0, 10.0), node(100.0, 100.0, 20.0, 10.0)];
        let mut edge = ConnectorDescriptor::edge(0, 1, &Theme::default());
        edge.route(&nodes);

        let start = edge.anchors[0];
        assert!(approx_eq!(f32, start.y(), 5.0, epsilon = 0.001));
        assert!(approx_eq!(f32, start.x(), 5.0, epsilon = 0.001));
    }

    #[test]
    fn test_out_of_range_index_leaves_no_geometry() {
        let nodes = vec![node(0.0, 0.0, 20.0, 10.0)];
        let mut edge = ConnectorDescriptor::edge(0, 3, &Theme::default());
        edge.route(&nodes);
        assert!(edge.anchors.is_empty());
        assert!(edge.path.is_empty());
    }

    #[test]
    fn test_brace_stroke_width_is_clamped() {
        assert!(approx_eq!(f32, brace_stroke_width(10.0), 1.6, epsilon = 0.001));
        assert!(approx_eq!(f32, brace_stroke_width(600.0), 3.2, epsilon = 0.001));
        assert!(approx_eq!(f32, brace_stroke_width(5000.0), 5.5, epsilon = 0.001));
    }
}
