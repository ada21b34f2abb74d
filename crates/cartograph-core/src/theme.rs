//! Theme metrics: font sizes per node type and color tokens.
//!
//! Layout only reads the font sizes (for text measurement). The stroke color
//! and width are copied onto connectors; the remaining colors are carried for
//! renderers and take part in cache keys.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::{color::Color, node::NodeType};

/// Visual metrics consumed by the layout engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub font_topic: f32,
    pub font_part: f32,
    pub font_subpart: f32,
    pub font_relationship: f32,
    pub topic_color: Color,
    pub part_color: Color,
    pub subpart_color: Color,
    pub text_color: Color,
    pub stroke_color: Color,
    pub stroke_width: f32,
    pub background: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            font_topic: 24.0,
            font_part: 18.0,
            font_subpart: 14.0,
            font_relationship: 12.0,
            topic_color: Color::from_rgb8(0xff, 0xd7, 0x00),
            part_color: Color::from_rgb8(0x87, 0xce, 0xfa),
            subpart_color: Color::from_rgb8(0x98, 0xfb, 0x98),
            text_color: Color::from_rgb8(0x33, 0x33, 0x33),
            stroke_color: Color::from_rgb8(0x33, 0x33, 0x33),
            stroke_width: 2.0,
            background: Color::from_rgb8(0xff, 0xff, 0xff),
        }
    }
}

impl Theme {
    /// Font size used to measure a node of the given type
    pub fn font_size(&self, node_type: NodeType) -> f32 {
        match node_type {
            NodeType::Topic => self.font_topic,
            NodeType::Part | NodeType::Concept | NodeType::Branch => self.font_part,
            NodeType::Subpart | NodeType::Child => self.font_subpart,
            NodeType::Relationship => self.font_relationship,
        }
    }
}

impl Hash for Theme {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for size in [
            self.font_topic,
            self.font_part,
            self.font_subpart,
            self.font_relationship,
            self.stroke_width,
        ] {
            size.to_bits().hash(state);
        }
        self.topic_color.hash(state);
        self.part_color.hash(state);
        self.subpart_color.hash(state);
        self.text_color.hash(state);
        self.stroke_color.hash(state);
        self.background.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_size_per_type() {
        let theme = Theme::default();
        assert_eq!(theme.font_size(NodeType::Topic), 24.0);
        assert_eq!(theme.font_size(NodeType::Branch), 18.0);
        assert_eq!(theme.font_size(NodeType::Subpart), 14.0);
        assert_eq!(theme.font_size(NodeType::Relationship), 12.0);
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let theme: Theme = serde_json::from_str(r#"{"font_topic": 30.0, "stroke_color": "navy"}"#)
            .unwrap();
        assert_eq!(theme.font_topic, 30.0);
        assert_eq!(theme.font_part, 18.0);
        assert_eq!(theme.stroke_color, Color::new("navy").unwrap());
    }

    #[test]
    fn test_invalid_color_rejected() {
        let result: Result<Theme, _> = serde_json::from_str(r#"{"topic_color": "sparkly"}"#);
        assert!(result.is_err());
    }
}
