//! Complexity classification, algorithm selection and processing strategy.

use std::fmt;

use serde::{Deserialize, Serialize};

use cartograph_core::spec::Specification;

use crate::layout::LayoutAlgorithm;

/// How demanding a specification is to lay out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityTier {
    Simple,
    Moderate,
    Complex,
}

impl fmt::Display for ComplexityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Simple => "simple",
            Self::Moderate => "moderate",
            Self::Complex => "complex",
        };
        write!(f, "{name}")
    }
}

/// How much model assistance a request receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStrategy {
    /// Deterministic layout, no assistance
    DeterministicOnly,
    /// Deterministic layout refined by style suggestions
    StyleEnhancement,
    /// Layout suggestions first, deterministic layout as the fallback
    ModelFirst,
}

impl fmt::Display for ProcessingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::DeterministicOnly => "deterministic_only",
            Self::StyleEnhancement => "style_enhancement",
            Self::ModelFirst => "model_first",
        };
        write!(f, "{name}")
    }
}

/// Caller control over model assistance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssistPreference {
    /// Follow the complexity tier
    #[default]
    Auto,
    /// Never ask for suggestions
    Disabled,
    /// Use this strategy regardless of the tier
    Force(ProcessingStrategy),
}

/// Caller preferences that steer selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Use this algorithm unless relationships or `no_connectors` rule it out
    pub preferred_algorithm: Option<LayoutAlgorithm>,
    /// Lay out without connectors
    pub no_connectors: bool,
    pub model_assist: AssistPreference,
}

impl Preferences {
    pub fn with_algorithm(mut self, algorithm: LayoutAlgorithm) -> Self {
        self.preferred_algorithm = Some(algorithm);
        self
    }

    pub fn with_no_connectors(mut self, no_connectors: bool) -> Self {
        self.no_connectors = no_connectors;
        self
    }

    pub fn with_model_assist(mut self, model_assist: AssistPreference) -> Self {
        self.model_assist = model_assist;
        self
    }
}

/// Sorts a specification into a complexity tier.
///
/// - simple: at most 3 children, 5 sub-children per child, 15 sub-children
///   in total and two levels below the topic
/// - moderate: at most 6 children, 30 sub-children in total and three levels
/// - complex: anything larger, deeper, or carrying relationships
pub fn classify_complexity(spec: &Specification) -> ComplexityTier {
    let stats = spec.stats();
    if stats.relationship_count > 0 {
        return ComplexityTier::Complex;
    }
    if stats.child_count <= 3
        && stats.max_grandchildren <= 5
        && stats.total_grandchildren <= 15
        && stats.depth <= 2
    {
        ComplexityTier::Simple
    } else if stats.child_count <= 6 && stats.total_grandchildren <= 30 && stats.depth <= 3 {
        ComplexityTier::Moderate
    } else {
        ComplexityTier::Complex
    }
}

/// Picks the layout algorithm for a specification.
///
/// Rules apply in order: relationships need the force-directed layout,
/// `no_connectors` forces the grouped layout, an explicit preference wins
/// next, the exact three by three shape is paired, small trees are stacked
/// and everything else is grouped.
pub fn select_layout_algorithm(spec: &Specification, preferences: &Preferences) -> LayoutAlgorithm {
    let stats = spec.stats();
    if stats.relationship_count > 0 {
        return LayoutAlgorithm::ForceDirected;
    }
    if preferences.no_connectors {
        return LayoutAlgorithm::Grouped;
    }
    if let Some(algorithm) = preferences.preferred_algorithm {
        return algorithm;
    }
    if stats.is_three_by_three(spec) {
        return LayoutAlgorithm::Paired;
    }
    if stats.child_count <= 3 && stats.max_grandchildren <= 5 {
        return LayoutAlgorithm::Stacked;
    }
    // Grouped is also the fallback above six children: it degrades best at scale
    LayoutAlgorithm::Grouped
}

/// Maps a tier to a processing strategy, honoring the caller's override
pub fn determine_strategy(tier: ComplexityTier, preferences: &Preferences) -> ProcessingStrategy {
    match preferences.model_assist {
        AssistPreference::Disabled => ProcessingStrategy::DeterministicOnly,
        AssistPreference::Force(strategy) => strategy,
        AssistPreference::Auto => match tier {
            ComplexityTier::Simple => ProcessingStrategy::DeterministicOnly,
            ComplexityTier::Moderate => ProcessingStrategy::StyleEnhancement,
            ComplexityTier::Complex => ProcessingStrategy::ModelFirst,
        },
    }
}

#[cfg(test)]
mod tests {
    use cartograph_core::spec::{Relationship, SpecNode};

    use super::*;

    fn fan(children: usize, leaves: usize) -> Specification {
        Specification::new(
            "T",
            (0..children)
                .map(|c| {
                    SpecNode::with_leaves(
                        format!("C{c}"),
                        (0..leaves).map(|l| format!("C{c}.{l}")),
                    )
                })
                .collect(),
        )
    }

    #[test]
    fn test_tiers() {
        assert_eq!(classify_complexity(&fan(3, 5)), ComplexityTier::Simple);
        assert_eq!(classify_complexity(&fan(0, 0)), ComplexityTier::Simple);
        assert_eq!(classify_complexity(&fan(5, 4)), ComplexityTier::Moderate);
        assert_eq!(classify_complexity(&fan(7, 1)), ComplexityTier::Complex);
        assert_eq!(classify_complexity(&fan(6, 6)), ComplexityTier::Complex);

        let deep = Specification::new(
            "T",
            vec![SpecNode::new("A").with_children(vec![
                SpecNode::new("B").with_children(vec![SpecNode::new("C")]),
            ])],
        );
        assert_eq!(classify_complexity(&deep), ComplexityTier::Moderate);

        let related = fan(2, 1).with_relationships(vec![Relationship::new("C0", "C1", "")]);
        assert_eq!(classify_complexity(&related), ComplexityTier::Complex);
    }

    #[test]
    fn test_selection_rules_in_order() {
        let prefs = Preferences::default();
        assert_eq!(select_layout_algorithm(&fan(3, 3), &prefs), LayoutAlgorithm::Paired);
        assert_eq!(select_layout_algorithm(&fan(3, 2), &prefs), LayoutAlgorithm::Stacked);
        assert_eq!(select_layout_algorithm(&fan(2, 6), &prefs), LayoutAlgorithm::Grouped);
        assert_eq!(select_layout_algorithm(&fan(5, 1), &prefs), LayoutAlgorithm::Grouped);
        assert_eq!(select_layout_algorithm(&fan(12, 1), &prefs), LayoutAlgorithm::Grouped);

        let radial = Preferences::default().with_algorithm(LayoutAlgorithm::Radial);
        assert_eq!(select_layout_algorithm(&fan(3, 3), &radial), LayoutAlgorithm::Radial);

        let bare = radial.clone().with_no_connectors(true);
        assert_eq!(select_layout_algorithm(&fan(3, 3), &bare), LayoutAlgorithm::Grouped);

        let related = fan(3, 3).with_relationships(vec![Relationship::new("C0", "C1", "")]);
        assert_eq!(select_layout_algorithm(&related, &bare), LayoutAlgorithm::ForceDirected);
    }

    #[test]
    fn test_strategy_mapping_and_overrides() {
        let auto = Preferences::default();
        assert_eq!(
            determine_strategy(ComplexityTier::Simple, &auto),
            ProcessingStrategy::DeterministicOnly
        );
        assert_eq!(
            determine_strategy(ComplexityTier::Moderate, &auto),
            ProcessingStrategy::StyleEnhancement
        );
        assert_eq!(
            determine_strategy(ComplexityTier::Complex, &auto),
            ProcessingStrategy::ModelFirst
        );

        let off = Preferences::default().with_model_assist(AssistPreference::Disabled);
        assert_eq!(
            determine_strategy(ComplexityTier::Complex, &off),
            ProcessingStrategy::DeterministicOnly
        );

        let forced = Preferences::default()
            .with_model_assist(AssistPreference::Force(ProcessingStrategy::ModelFirst));
        assert_eq!(
            determine_strategy(ComplexityTier::Simple, &forced),
            ProcessingStrategy::ModelFirst
        );
    }
}
