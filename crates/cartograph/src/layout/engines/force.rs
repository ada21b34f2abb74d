//! Force-directed layout engine
//!
//! Nodes repel each other while hierarchy and relationship edges act as
//! springs. The initial grid is jittered by a seeded generator, so equal
//! configurations always produce equal layouts.

use std::collections::HashMap;

use log::{debug, trace};
use petgraph::{graph::UnGraph, visit::EdgeRef};
use rand::{Rng, SeedableRng, rngs::StdRng};

use cartograph_core::{
    geometry::{Point, Size},
    node::NodeType,
    spec::Specification,
    text,
    theme::Theme,
};

use crate::{
    config::ForceConfig,
    layout::{
        connector::ConnectorDescriptor,
        engines::{HierarchyEngine, assemble, tree::Tree},
        result::{Dimensions, LayoutAlgorithm, LayoutResult, NodePosition},
    },
};

/// A single step never moves a node further than this
const MAX_STEP: f32 = 50.0;

/// Largest initial offset from the grid position
const JITTER: f32 = 20.0;

/// Why two nodes are linked in the simulation graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Link {
    Hierarchy,
    /// Index into the specification's relationships
    Relationship(usize),
}

fn concept_type(depth: usize) -> NodeType {
    if depth == 0 {
        NodeType::Topic
    } else {
        NodeType::Concept
    }
}

/// Force layout engine
pub struct Engine {
    config: ForceConfig,
    draw_connectors: bool,
}

impl Engine {
    /// Create a new force layout engine
    pub fn new(config: ForceConfig) -> Self {
        Self {
            config,
            draw_connectors: true,
        }
    }

    pub fn set_draw_connectors(&mut self, draw_connectors: bool) -> &mut Self {
        self.draw_connectors = draw_connectors;
        self
    }

    /// Builds the simulation graph: node weights are sizes, node indices match the tree
    fn build_graph(&self, tree: &Tree, spec: &Specification) -> UnGraph<Size, Link> {
        let mut graph = UnGraph::with_capacity(tree.len(), tree.len() + spec.relationships().len());
        let indices: Vec<_> = tree.iter().map(|node| graph.add_node(node.size)).collect();

        for (parent, children) in tree.families() {
            for &child in children {
                graph.add_edge(indices[parent], indices[child], Link::Hierarchy);
            }
        }

        // Names resolve to their first occurrence in tree order
        let mut by_name: HashMap<&str, usize> = HashMap::new();
        for (idx, node) in tree.iter().enumerate() {
            by_name.entry(node.text.as_str()).or_insert(idx);
        }
        for (id, relationship) in spec.relationships().iter().enumerate() {
            let (Some(&from), Some(&to)) = (
                by_name.get(relationship.from().trim()),
                by_name.get(relationship.to().trim()),
            ) else {
                debug!(from = relationship.from(), to = relationship.to(); "Skipping unresolved relationship");
                continue;
            };
            if from == to {
                trace!(name = relationship.from(); "Skipping self relationship");
                continue;
            }
            graph.add_edge(indices[from], indices[to], Link::Relationship(id));
        }
        graph
    }

    /// Initialize jittered grid positions
    fn initialize_positions(&self, graph: &UnGraph<Size, Link>) -> Vec<Point> {
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        let node_count = graph.node_count();
        let grid_size = ((node_count as f32).sqrt().ceil() as usize).max(1);
        let largest = graph
            .node_weights()
            .map(|size| size.width().max(size.height()))
            .fold(0.0, f32::max);
        let cell_size = largest + self.config.min_distance;

        (0..node_count)
            .map(|i| {
                let row = i / grid_size;
                let col = i % grid_size;
                let base = Point::new(col as f32 * cell_size, row as f32 * cell_size);
                let jitter = Point::new(
                    rng.random_range(-JITTER..JITTER),
                    rng.random_range(-JITTER..JITTER),
                );
                base.add_point(jitter)
            })
            .collect()
    }

    /// Run the simulation and return final center positions
    fn run_force_simulation(&self, graph: &UnGraph<Size, Link>) -> Vec<Point> {
        let mut positions = self.initialize_positions(graph);
        let sizes: Vec<Size> = graph.node_weights().copied().collect();
        let mut velocities = vec![Point::default(); positions.len()];

        for iteration in 0..self.config.iterations {
            let mut forces = vec![Point::default(); positions.len()];

            // Repulsion between every pair of nodes
            for i in 0..positions.len() {
                for j in (i + 1)..positions.len() {
                    let trans = positions[i].sub_point(positions[j]);
                    let min_dist = (sizes[i].width()
                        + sizes[j].width()
                        + sizes[i].height()
                        + sizes[j].height())
                        / 4.0
                        + self.config.min_distance;
                    let distance = trans.hypot().max(1.0);

                    let force_factor = if distance < min_dist {
                        self.config.repulsion_constant * (min_dist / distance).powf(2.0)
                    } else {
                        self.config.repulsion_constant / distance
                    };
                    let force = trans.scale(force_factor / distance);
                    forces[i] = forces[i].add_point(force);
                    forces[j] = forces[j].sub_point(force);
                }
            }

            // Springs along every edge
            for edge in graph.edge_references() {
                let (source, target) = (edge.source().index(), edge.target().index());
                let dist = positions[source].sub_point(positions[target]);
                // Magnitude grows linearly with the distance
                let force = dist.scale(self.config.spring_constant);
                forces[source] = forces[source].sub_point(force);
                forces[target] = forces[target].add_point(force);
            }

            let mut max_displacement = 0.0_f32;
            for i in 0..positions.len() {
                let mut velocity = velocities[i].add_point(forces[i]).scale(self.config.damping);
                let speed = velocity.hypot();
                if speed > MAX_STEP {
                    velocity = velocity.scale(MAX_STEP / speed);
                }
                velocities[i] = velocity;
                positions[i] = positions[i].add_point(velocity);
                max_displacement = max_displacement.max(velocity.hypot());
            }

            if max_displacement < self.config.epsilon {
                debug!(iteration, max_displacement; "Force simulation converged");
                break;
            }
        }

        positions
    }
}

impl HierarchyEngine for Engine {
    fn calculate(&self, spec: &Specification, dimensions: Dimensions, theme: &Theme) -> LayoutResult {
        let tree = Tree::build(spec, theme, concept_type);
        let graph = self.build_graph(&tree, spec);
        let positions = self.run_force_simulation(&graph);

        let xs: Vec<f32> = positions.iter().map(|p| p.x()).collect();
        let ys: Vec<f32> = positions.iter().map(|p| p.y()).collect();
        let mut nodes = tree.into_nodes(&xs, &ys);

        let mut connectors = Vec::new();
        for edge in graph.edge_references() {
            let (source, target) = (edge.source().index(), edge.target().index());
            match *edge.weight() {
                Link::Hierarchy => {
                    if self.draw_connectors {
                        connectors.push(ConnectorDescriptor::edge(source, target, theme));
                    }
                }
                Link::Relationship(id) => {
                    let mut connector = ConnectorDescriptor::edge(source, target, theme);
                    let label = spec.relationships()[id].label().trim();
                    if !label.is_empty() {
                        let midpoint = nodes[source].center().midpoint(nodes[target].center());
                        let size = text::node_size(label, theme.font_size(NodeType::Relationship));
                        let mut label_node =
                            NodePosition::new(label, NodeType::Relationship, size).at(midpoint);
                        label_node.relationship_id = Some(id);
                        nodes.push(label_node);
                        connector = connector.with_label_node(nodes.len() - 1);
                    }
                    if self.draw_connectors {
                        connectors.push(connector);
                    }
                }
            }
        }

        debug!(
            nodes = nodes.len(),
            edges = graph.edge_count(),
            seed = self.config.seed;
            "Force-directed layout calculated"
        );
        assemble(nodes, connectors, dimensions, LayoutAlgorithm::ForceDirected)
    }
}

#[cfg(test)]
mod tests {
    use cartograph_core::spec::{Relationship, SpecNode};

    use super::*;

    fn spec() -> Specification {
        Specification::new(
            "Ecosystem",
            vec![
                SpecNode::with_leaves("Producers", ["Plants"]),
                SpecNode::with_leaves("Consumers", ["Herbivores", "Carnivores"]),
            ],
        )
        .with_relationships(vec![
            Relationship::new("Herbivores", "Plants", "eat"),
            Relationship::new("Carnivores", "Herbivores", ""),
        ])
    }

    #[test]
    fn test_relationship_labels_become_nodes() {
        let result = Engine::new(ForceConfig::default()).calculate(
            &spec(),
            Dimensions::default(),
            &Theme::default(),
        );

        assert_eq!(result.nodes.len(), 6 + 1);
        let label = &result.nodes[6];
        assert_eq!(label.node_type, NodeType::Relationship);
        assert_eq!(label.text, "eat");
        assert_eq!(label.relationship_id, Some(0));

        assert_eq!(result.connectors.len(), 5 + 2);
        let labeled: Vec<_> = result.connectors.iter().filter(|c| c.label_node.is_some()).collect();
        assert_eq!(labeled.len(), 1);
        assert_eq!(labeled[0].label_node, Some(6));
    }

    #[test]
    fn test_node_types() {
        let result = Engine::new(ForceConfig::default()).calculate(
            &spec(),
            Dimensions::default(),
            &Theme::default(),
        );
        assert_eq!(result.nodes[0].node_type, NodeType::Topic);
        assert!(result.nodes[1..6].iter().all(|n| n.node_type == NodeType::Concept));
    }

    #[test]
    fn test_seed_changes_layout() {
        let calculate = |seed| {
            let config = ForceConfig {
                seed,
                ..ForceConfig::default()
            };
            Engine::new(config).calculate(&spec(), Dimensions::default(), &Theme::default())
        };
        assert_eq!(calculate(7), calculate(7));
        assert_ne!(calculate(7).nodes, calculate(8).nodes);
    }

    #[test]
    fn test_positions_stay_finite() {
        let config = ForceConfig {
            iterations: 500,
            ..ForceConfig::default()
        };
        let result = Engine::new(config).calculate(&spec(), Dimensions::default(), &Theme::default());
        assert!(result.nodes.iter().all(|n| n.center().is_finite()));
    }
}
