//! The layout result contract shared by every pipeline stage.

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize, Serializer};

use cartograph_core::{
    color::Color,
    geometry::{Bounds, Point, Size},
    node::NodeType,
};

use crate::{
    hybrid::AttemptState,
    layout::connector::ConnectorDescriptor,
    selector::{ComplexityTier, ProcessingStrategy},
};

/// Canvas extents the nodes are placed within.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f32,
    pub height: f32,
    pub padding: f32,
}

impl Dimensions {
    pub fn new(width: f32, height: f32, padding: f32) -> Self {
        Self {
            width,
            height,
            padding,
        }
    }

    /// Region node boxes must stay inside: the canvas shrunk by `padding`
    pub fn usable_bounds(&self) -> Bounds {
        Bounds::new_from_top_left(
            Point::new(self.padding, self.padding),
            Size::new(
                self.width - 2.0 * self.padding,
                self.height - 2.0 * self.padding,
            ),
        )
    }

    pub(crate) fn hash_bits(&self) -> [u32; 3] {
        [
            self.width.to_bits(),
            self.height.to_bits(),
            self.padding.to_bits(),
        ]
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self::new(700.0, 500.0, 40.0)
    }
}

/// Font weight a style suggestion may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    Normal,
    Bold,
}

/// Visual overrides attached to a node. Never affects geometry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
}

/// One placed visual element. `x` and `y` are the center of its box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodePosition {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub text: String,
    pub node_type: NodeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subpart_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship_id: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<NodeStyle>,
}

impl NodePosition {
    /// Creates a node of the given size centered on the origin
    pub fn new(text: impl Into<String>, node_type: NodeType, size: Size) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: size.width(),
            height: size.height(),
            text: text.into(),
            node_type,
            part_index: None,
            subpart_index: None,
            relationship_id: None,
            style: None,
        }
    }

    /// Sets the center point
    pub fn at(mut self, center: Point) -> Self {
        self.set_center(center);
        self
    }

    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_center(&mut self, center: Point) {
        self.x = center.x();
        self.y = center.y();
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new_from_center(self.center(), self.size())
    }

    /// Left edge of the box
    pub fn left(&self) -> f32 {
        self.x - self.width / 2.0
    }

    /// Right edge of the box
    pub fn right(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Top edge of the box
    pub fn top(&self) -> f32 {
        self.y - self.height / 2.0
    }

    /// Bottom edge of the box
    pub fn bottom(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn translate(&mut self, offset: Point) {
        self.x += offset.x();
        self.y += offset.y();
    }
}

/// Identifies the layout strategy that produced a result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutAlgorithm {
    /// Aligned depth columns joined by braces
    Stacked,
    /// Compact per-child blocks stacked vertically
    #[default]
    Grouped,
    /// Explicit parent/child connectors, with a special 3×3 arrangement
    Paired,
    /// Physics simulation over hierarchy and relationship edges
    ForceDirected,
    /// Concentric rings keyed by depth
    Radial,
}

impl From<LayoutAlgorithm> for &'static str {
    fn from(val: LayoutAlgorithm) -> Self {
        match val {
            LayoutAlgorithm::Stacked => "stacked",
            LayoutAlgorithm::Grouped => "grouped",
            LayoutAlgorithm::Paired => "paired",
            LayoutAlgorithm::ForceDirected => "force_directed",
            LayoutAlgorithm::Radial => "radial",
        }
    }
}

impl FromStr for LayoutAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stacked" => Ok(Self::Stacked),
            "grouped" => Ok(Self::Grouped),
            "paired" => Ok(Self::Paired),
            "force_directed" | "force" => Ok(Self::ForceDirected),
            "radial" => Ok(Self::Radial),
            _ => Err(format!("unknown layout algorithm `{s}`")),
        }
    }
}

impl fmt::Display for LayoutAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", <&'static str>::from(*self))
    }
}

/// Diagnostics about how a result was produced. Advisory only.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    #[serde(serialize_with = "serialize_secs")]
    pub processing_time: Duration,
    pub node_count: usize,
    pub connector_count: usize,
    /// Collision passes run by the final resolution
    pub collision_iterations: usize,
    /// Colliding pairs left when the iteration budget ran out
    pub residual_collisions: usize,
    /// Nodes moved back inside the canvas by boundary validation
    pub boundary_adjustments: usize,
    /// Empty angular slots reserved by radial balancing
    pub reserved_slots: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complexity: Option<ComplexityTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<ProcessingStrategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hybrid_outcome: Option<AttemptState>,
    pub cache_hit: bool,
}

pub(crate) fn serialize_secs<S: Serializer>(
    duration: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

/// Positioned nodes and connectors ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutResult {
    pub nodes: Vec<NodePosition>,
    pub connectors: Vec<ConnectorDescriptor>,
    pub dimensions: Dimensions,
    pub algorithm_used: LayoutAlgorithm,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Color>,
    pub performance_metrics: PerformanceMetrics,
}

impl LayoutResult {
    /// Bundles engine output; metrics counts are filled in here.
    pub fn new(
        nodes: Vec<NodePosition>,
        connectors: Vec<ConnectorDescriptor>,
        dimensions: Dimensions,
        algorithm_used: LayoutAlgorithm,
    ) -> Self {
        let performance_metrics = PerformanceMetrics {
            node_count: nodes.len(),
            connector_count: connectors.len(),
            ..PerformanceMetrics::default()
        };
        Self {
            nodes,
            connectors,
            dimensions,
            algorithm_used,
            background: None,
            performance_metrics,
        }
    }

    /// Recomputes anchors and paths from the current node positions
    pub fn route_connectors(&mut self) {
        for connector in &mut self.connectors {
            connector.route(&self.nodes);
        }
    }

    /// True when every node box lies within the padded canvas
    pub fn is_contained(&self) -> bool {
        let usable = self.dimensions.usable_bounds().grow(CONTAINMENT_EPSILON);
        self.nodes.iter().all(|node| usable.contains(&node.bounds()))
    }
}

/// Float slack for containment checks after translations.
pub(crate) const CONTAINMENT_EPSILON: f32 = 0.01;

/// Bounding box over node boxes
pub fn content_bounds(nodes: &[NodePosition]) -> Option<Bounds> {
    Bounds::union_all(nodes.iter().map(NodePosition::bounds))
}
