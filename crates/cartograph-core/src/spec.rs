//! Abstract diagram specifications.
//!
//! A [`Specification`] is the caller-provided tree a layout is computed from:
//! a topic, a list of possibly nested children and, for concept-map style
//! diagrams, explicit [`Relationship`] edges between named nodes.
//!
//! Specifications arrive from several diagram families that disagree on field
//! names. Deserialization accepts all of them:
//!
//! | Concept        | Accepted keys                                      |
//! |----------------|----------------------------------------------------|
//! | root label     | `topic`, `whole`                                   |
//! | children       | `children`, `parts`, `subparts`, `branches`        |
//! | node name      | `name`, `label`, `text`                            |
//!
//! A child may also be written as a bare string.
//!
//! ```
//! # use cartograph_core::spec::Specification;
//! let json = r#"{"whole": "Car", "parts": [{"name": "Engine", "subparts": ["Piston"]}, "Wheel"]}"#;
//! let spec: Specification = serde_json::from_str(json).unwrap();
//! assert_eq!(spec.topic(), "Car");
//! assert_eq!(spec.children().len(), 2);
//! assert_eq!(spec.children()[0].children()[0].name(), "Piston");
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Deepest nesting accepted below the topic.
pub const MAX_DEPTH: usize = 8;

/// Largest node count accepted, topic included.
pub const MAX_NODES: usize = 1000;

/// Reasons a specification is rejected before layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("specification topic is empty")]
    EmptyTopic,

    #[error("node at `{path}` has an empty name")]
    EmptyName { path: String },

    #[error("nesting at `{path}` exceeds the maximum depth of {max}")]
    TooDeep { path: String, max: usize },

    #[error("specification has {count} nodes, more than the supported {max}")]
    TooLarge { count: usize, max: usize },

    #[error("relationship {index} references unknown node `{name}`")]
    UnknownEndpoint { index: usize, name: String },
}

/// A labeled root with a list of labeled, possibly nested children.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Specification {
    #[serde(alias = "whole")]
    topic: String,

    #[serde(default, alias = "parts", alias = "subparts", alias = "branches")]
    children: Vec<SpecNode>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    relationships: Vec<Relationship>,
}

impl Specification {
    /// Creates a specification without relationship edges
    pub fn new(topic: impl Into<String>, children: Vec<SpecNode>) -> Self {
        Self {
            topic: topic.into(),
            children,
            relationships: Vec::new(),
        }
    }

    /// Adds relationship edges
    pub fn with_relationships(mut self, relationships: Vec<Relationship>) -> Self {
        self.relationships = relationships;
        self
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn children(&self) -> &[SpecNode] {
        &self.children
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// Checks the specification can be laid out.
    ///
    /// An empty children list is valid and yields a topic-only layout.
    ///
    /// # Errors
    ///
    /// Returns a [`SpecError`] for an empty topic, an empty node name,
    /// nesting deeper than [`MAX_DEPTH`], more than [`MAX_NODES`] nodes, or a
    /// relationship naming a node that does not exist.
    pub fn validate(&self) -> Result<(), SpecError> {
        if self.topic.trim().is_empty() {
            return Err(SpecError::EmptyTopic);
        }

        for (index, child) in self.children.iter().enumerate() {
            child.validate(&format!("children[{index}]"), 1)?;
        }

        let count = self.node_count();
        if count > MAX_NODES {
            return Err(SpecError::TooLarge {
                count,
                max: MAX_NODES,
            });
        }

        if !self.relationships.is_empty() {
            let mut names: HashSet<&str> = HashSet::new();
            names.insert(self.topic.trim());
            for child in &self.children {
                child.collect_names(&mut names);
            }

            for (index, relationship) in self.relationships.iter().enumerate() {
                for endpoint in [&relationship.from, &relationship.to] {
                    if !names.contains(endpoint.trim()) {
                        return Err(SpecError::UnknownEndpoint {
                            index,
                            name: endpoint.clone(),
                        });
                    }
                }
            }
        }

        Ok(())
    }

    /// Total number of tree nodes, topic included
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SpecNode::subtree_size).sum::<usize>()
    }

    /// Structural statistics driving algorithm and strategy selection
    pub fn stats(&self) -> SpecStats {
        let grandchildren = self.children.iter().map(|c| c.children.len());
        SpecStats {
            child_count: self.children.len(),
            max_grandchildren: grandchildren.clone().max().unwrap_or(0),
            total_grandchildren: grandchildren.sum(),
            depth: self
                .children
                .iter()
                .map(|c| 1 + c.height())
                .max()
                .unwrap_or(0),
            node_count: self.node_count(),
            relationship_count: self.relationships.len(),
        }
    }
}

/// One labeled node of a specification tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawNode")]
pub struct SpecNode {
    name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<SpecNode>,
}

impl SpecNode {
    /// Creates a leaf node
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Creates a node with leaf children, one per name
    pub fn with_leaves<S: Into<String>>(
        name: impl Into<String>,
        leaves: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::new(name).with_children(leaves.into_iter().map(SpecNode::new).collect())
    }

    /// Replaces the children of this node
    pub fn with_children(mut self, children: Vec<SpecNode>) -> Self {
        self.children = children;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[SpecNode] {
        &self.children
    }

    /// Number of nodes in this subtree, self included
    pub fn subtree_size(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(SpecNode::subtree_size)
            .sum::<usize>()
    }

    /// Longest path to a leaf, zero for a leaf
    pub fn height(&self) -> usize {
        self.children
            .iter()
            .map(|c| 1 + c.height())
            .max()
            .unwrap_or(0)
    }

    fn validate(&self, path: &str, depth: usize) -> Result<(), SpecError> {
        if self.name.trim().is_empty() {
            return Err(SpecError::EmptyName {
                path: path.to_string(),
            });
        }
        if depth > MAX_DEPTH {
            return Err(SpecError::TooDeep {
                path: path.to_string(),
                max: MAX_DEPTH,
            });
        }
        for (index, child) in self.children.iter().enumerate() {
            child.validate(&format!("{path}.children[{index}]"), depth + 1)?;
        }
        Ok(())
    }

    fn collect_names<'a>(&'a self, names: &mut HashSet<&'a str>) {
        names.insert(self.name.trim());
        for child in &self.children {
            child.collect_names(names);
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNode {
    Label(String),
    Full {
        #[serde(alias = "label", alias = "text")]
        name: String,
        #[serde(default, alias = "parts", alias = "subparts", alias = "branches")]
        children: Vec<SpecNode>,
    },
}

impl From<RawNode> for SpecNode {
    fn from(raw: RawNode) -> Self {
        match raw {
            RawNode::Label(name) => SpecNode::new(name),
            RawNode::Full { name, children } => SpecNode { name, children },
        }
    }
}

/// An explicit edge between two named nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relationship {
    from: String,
    to: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    label: String,
}

impl Relationship {
    pub fn new(from: impl Into<String>, to: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            label: label.into(),
        }
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Structural measurements of a specification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpecStats {
    /// Number of top-level children
    pub child_count: usize,
    /// Largest number of sub-children under one child
    pub max_grandchildren: usize,
    /// Sub-children summed over all children
    pub total_grandchildren: usize,
    /// Levels below the topic; 2 means children with sub-children
    pub depth: usize,
    /// Tree nodes, topic included
    pub node_count: usize,
    pub relationship_count: usize,
}

impl SpecStats {
    /// True for the exact three children by three sub-children shape
    pub fn is_three_by_three(&self, spec: &Specification) -> bool {
        self.child_count == 3
            && self.depth == 2
            && spec.children().iter().all(|c| c.children().len() == 3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_by_three() -> Specification {
        Specification::new(
            "T",
            vec![
                SpecNode::with_leaves("A", ["A1", "A2", "A3"]),
                SpecNode::with_leaves("B", ["B1", "B2", "B3"]),
                SpecNode::with_leaves("C", ["C1", "C2", "C3"]),
            ],
        )
    }

    #[test]
    fn test_deserialize_subparts_as_strings() {
        let json = r#"{"topic":"T","children":[{"name":"A","subparts":["A1","A2","A3"]},{"name":"B","subparts":["B1","B2","B3"]},{"name":"C","subparts":["C1","C2","C3"]}]}"#;
        let spec: Specification = serde_json::from_str(json).unwrap();
        assert_eq!(spec, three_by_three());
    }

    #[test]
    fn test_deserialize_label_alias() {
        let json = r#"{"topic":"Trip","branches":[{"label":"Pack","children":[{"text":"Socks"}]}]}"#;
        let spec: Specification = serde_json::from_str(json).unwrap();
        assert_eq!(spec.children()[0].name(), "Pack");
        assert_eq!(spec.children()[0].children()[0].name(), "Socks");
    }

    #[test]
    fn test_deserialize_relationships() {
        let json = r#"{"topic":"Water","children":["Rain","Cloud"],"relationships":[{"from":"Cloud","to":"Rain","label":"produces"}]}"#;
        let spec: Specification = serde_json::from_str(json).unwrap();
        assert_eq!(spec.relationships().len(), 1);
        assert_eq!(spec.relationships()[0].label(), "produces");
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_children_is_ok() {
        let spec = Specification::new("T", vec![]);
        assert!(spec.validate().is_ok());
        assert_eq!(spec.node_count(), 1);
    }

    #[test]
    fn test_validate_empty_topic() {
        let spec = Specification::new("   ", vec![SpecNode::new("A")]);
        assert_eq!(spec.validate(), Err(SpecError::EmptyTopic));
    }

    #[test]
    fn test_validate_empty_name_reports_path() {
        let spec = Specification::new(
            "T",
            vec![SpecNode::new("A"), SpecNode::with_leaves("B", ["ok", ""])],
        );
        assert_eq!(
            spec.validate(),
            Err(SpecError::EmptyName {
                path: "children[1].children[1]".to_string()
            })
        );
    }

    #[test]
    fn test_validate_too_deep() {
        let mut node = SpecNode::new("leaf");
        for level in 0..MAX_DEPTH {
            node = SpecNode::new(format!("level {level}")).with_children(vec![node]);
        }
        let spec = Specification::new("T", vec![node]);
        assert!(matches!(spec.validate(), Err(SpecError::TooDeep { .. })));
    }

    #[test]
    fn test_validate_unknown_relationship_endpoint() {
        let spec = Specification::new("T", vec![SpecNode::new("A")])
            .with_relationships(vec![Relationship::new("A", "Missing", "")]);
        assert_eq!(
            spec.validate(),
            Err(SpecError::UnknownEndpoint {
                index: 0,
                name: "Missing".to_string()
            })
        );
    }

    #[test]
    fn test_stats() {
        let spec = three_by_three();
        let stats = spec.stats();
        assert_eq!(stats.child_count, 3);
        assert_eq!(stats.max_grandchildren, 3);
        assert_eq!(stats.total_grandchildren, 9);
        assert_eq!(stats.depth, 2);
        assert_eq!(stats.node_count, 13);
        assert!(stats.is_three_by_three(&spec));

        let flat = Specification::new("T", vec![SpecNode::new("Only")]);
        assert_eq!(flat.stats().depth, 1);
        assert!(!flat.stats().is_three_by_three(&flat));
    }
}
