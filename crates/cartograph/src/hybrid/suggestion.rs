//! Suggestion payloads: parsing, structural validation and merging.
//!
//! An assistant answers with JSON of this shape, possibly wrapped in prose or
//! a code fence:
//!
//! ```json
//! {
//!   "reasoning": "pull the sources together",
//!   "layout": {
//!     "nodes": [{"index": 2, "x": 140.0, "y": 80.0}],
//!     "groups": [{"members": [4, 5], "dx": 0.0, "dy": -20.0}]
//!   },
//!   "style": {
//!     "nodes": [{"index": 0, "fill": "#ffe08a", "font_weight": "bold"}],
//!     "connector_color": "#4a5568",
//!     "connector_width": 1.5,
//!     "background": "#fafafa"
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use cartograph_core::{color::Color, geometry::Point};

use crate::{
    hybrid::assist::SuggestionKind,
    layout::{FontWeight, LayoutResult, NodeStyle},
};

/// Why a response was rejected before merging.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SuggestionError {
    #[error("response is not a valid suggestion payload: {0}")]
    Malformed(String),

    #[error("response has no {0:?} suggestions")]
    Empty(SuggestionKind),

    #[error("node index {index} is out of range for {len} nodes")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("suggested coordinates for node {index} are not finite")]
    NonFinite { index: usize },

    #[error("connector width {0} is not a positive number")]
    InvalidWidth(f32),

    #[error("merged layout rejected: {0}")]
    Rejected(String),
}

/// Moves one node so its center lands on `(x, y)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionOverride {
    pub index: usize,
    pub x: f32,
    pub y: f32,
}

/// Moves several nodes by the same offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupShift {
    pub members: Vec<usize>,
    #[serde(default)]
    pub dx: f32,
    #[serde(default)]
    pub dy: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutSuggestions {
    #[serde(default)]
    pub nodes: Vec<PositionOverride>,
    #[serde(default)]
    pub groups: Vec<GroupShift>,
}

impl LayoutSuggestions {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.groups.is_empty()
    }

    /// Applies overrides first, then group shifts
    pub fn apply(&self, result: &mut LayoutResult) {
        for position in &self.nodes {
            if let Some(node) = result.nodes.get_mut(position.index) {
                node.set_center(Point::new(position.x, position.y));
            }
        }
        for group in &self.groups {
            for &member in &group.members {
                if let Some(node) = result.nodes.get_mut(member) {
                    node.translate(Point::new(group.dx, group.dy));
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeStyleOverride {
    pub index: usize,
    #[serde(default)]
    pub fill: Option<Color>,
    #[serde(default)]
    pub stroke: Option<Color>,
    #[serde(default)]
    pub text_color: Option<Color>,
    #[serde(default)]
    pub font_weight: Option<FontWeight>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleSuggestions {
    #[serde(default)]
    pub nodes: Vec<NodeStyleOverride>,
    #[serde(default)]
    pub connector_color: Option<Color>,
    #[serde(default)]
    pub connector_width: Option<f32>,
    #[serde(default)]
    pub background: Option<Color>,
}

impl StyleSuggestions {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
            && self.connector_color.is_none()
            && self.connector_width.is_none()
            && self.background.is_none()
    }

    /// Merges style overrides; fields a suggestion leaves out keep their value
    pub fn apply(&self, result: &mut LayoutResult) {
        for suggestion in &self.nodes {
            let Some(node) = result.nodes.get_mut(suggestion.index) else {
                continue;
            };
            let style = node.style.get_or_insert_with(NodeStyle::default);
            if suggestion.fill.is_some() {
                style.fill = suggestion.fill;
            }
            if suggestion.stroke.is_some() {
                style.stroke = suggestion.stroke;
            }
            if suggestion.text_color.is_some() {
                style.text_color = suggestion.text_color;
            }
            if suggestion.font_weight.is_some() {
                style.font_weight = suggestion.font_weight;
            }
        }
        for connector in &mut result.connectors {
            if let Some(color) = self.connector_color {
                connector.stroke_color = color;
            }
            if let Some(width) = self.connector_width {
                connector.stroke_width = width;
            }
        }
        if self.background.is_some() {
            result.background = self.background;
        }
    }
}

/// A parsed assistant response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestionPayload {
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub layout: Option<LayoutSuggestions>,
    #[serde(default)]
    pub style: Option<StyleSuggestions>,
}

impl SuggestionPayload {
    /// Parses the JSON object embedded in `raw`.
    ///
    /// Text before the first `{` and after the last `}` is ignored, so code
    /// fences and short preambles are tolerated. Colors are checked while
    /// parsing.
    pub fn parse(raw: &str) -> Result<Self, SuggestionError> {
        let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) else {
            return Err(SuggestionError::Malformed("no JSON object found".to_string()));
        };
        if end < start {
            return Err(SuggestionError::Malformed("no JSON object found".to_string()));
        }
        serde_json::from_str(&raw[start..=end])
            .map_err(|err| SuggestionError::Malformed(err.to_string()))
    }

    /// Checks the part of the payload relevant to `kind` against a layout of `node_count` nodes
    pub fn validate(&self, kind: SuggestionKind, node_count: usize) -> Result<(), SuggestionError> {
        let check_index = |index: usize| {
            if index < node_count {
                Ok(())
            } else {
                Err(SuggestionError::IndexOutOfRange {
                    index,
                    len: node_count,
                })
            }
        };

        match kind {
            SuggestionKind::Layout => {
                let layout = self
                    .layout
                    .as_ref()
                    .filter(|layout| !layout.is_empty())
                    .ok_or(SuggestionError::Empty(kind))?;
                for position in &layout.nodes {
                    check_index(position.index)?;
                    if !Point::new(position.x, position.y).is_finite() {
                        return Err(SuggestionError::NonFinite {
                            index: position.index,
                        });
                    }
                }
                for group in &layout.groups {
                    for &member in &group.members {
                        check_index(member)?;
                        if !Point::new(group.dx, group.dy).is_finite() {
                            return Err(SuggestionError::NonFinite { index: member });
                        }
                    }
                }
            }
            SuggestionKind::Style => {
                let style = self
                    .style
                    .as_ref()
                    .filter(|style| !style.is_empty())
                    .ok_or(SuggestionError::Empty(kind))?;
                for node in &style.nodes {
                    check_index(node.index)?;
                }
                match style.connector_width {
                    Some(width) if !(width.is_finite() && width > 0.0) => {
                        return Err(SuggestionError::InvalidWidth(width));
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }
}
