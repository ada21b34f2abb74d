//! Node type tags shared by specifications, themes and layout results.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// The role a placed node plays in its diagram.
///
/// The meaning of each tag depends on the diagram family: a brace map uses
/// `Topic`/`Part`/`Subpart`, a mind map uses `Topic`/`Branch`/`Child`, a
/// concept map uses `Topic`/`Concept`/`Relationship`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Topic,
    Part,
    Subpart,
    Concept,
    Relationship,
    Branch,
    Child,
}

impl NodeType {
    /// Tag for a tree node at `depth` below the topic in a hierarchy diagram
    pub fn for_hierarchy_depth(depth: usize) -> Self {
        match depth {
            0 => Self::Topic,
            1 => Self::Part,
            _ => Self::Subpart,
        }
    }

    /// Tag for a tree node at `depth` below the topic in a radial diagram
    pub fn for_radial_depth(depth: usize) -> Self {
        match depth {
            0 => Self::Topic,
            1 => Self::Branch,
            _ => Self::Child,
        }
    }
}

impl From<NodeType> for &'static str {
    fn from(val: NodeType) -> Self {
        match val {
            NodeType::Topic => "topic",
            NodeType::Part => "part",
            NodeType::Subpart => "subpart",
            NodeType::Concept => "concept",
            NodeType::Relationship => "relationship",
            NodeType::Branch => "branch",
            NodeType::Child => "child",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", <&'static str>::from(*self))
    }
}

impl FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "topic" => Ok(Self::Topic),
            "part" => Ok(Self::Part),
            "subpart" => Ok(Self::Subpart),
            "concept" => Ok(Self::Concept),
            "relationship" => Ok(Self::Relationship),
            "branch" => Ok(Self::Branch),
            "child" => Ok(Self::Child),
            _ => Err(format!("unknown node type `{s}`")),
        }
    }
}
