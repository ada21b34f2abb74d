//! Integration tests for the deterministic layout pipeline

use cartograph::{
    CartographError, LayoutBuilder, LayoutOptions,
    cache::LayoutCache,
    config::{AppConfig, OddBranchPolicy, SettingError},
    layout::{
        Dimensions, LayoutAlgorithm, LayoutResult, detect_collisions, max_overlap_area,
        optimize_canvas_dimensions,
    },
    node::NodeType,
    selector::{ComplexityTier, Preferences},
    spec::{SpecError, Specification},
    theme::Theme,
};

const ALL: [LayoutAlgorithm; 5] = [
    LayoutAlgorithm::Stacked,
    LayoutAlgorithm::Grouped,
    LayoutAlgorithm::Paired,
    LayoutAlgorithm::ForceDirected,
    LayoutAlgorithm::Radial,
];

fn builder() -> LayoutBuilder {
    LayoutBuilder::new(AppConfig::default())
}

fn parse(json: &str) -> Specification {
    builder().parse_spec(json).expect("valid specification")
}

fn layout_with(spec: &Specification, algorithm: LayoutAlgorithm) -> LayoutResult {
    let options = LayoutOptions::default()
        .with_preferences(Preferences::default().with_algorithm(algorithm));
    builder().layout(spec, &options).expect("layout")
}

fn assert_contained(result: &LayoutResult) {
    let dims = result.dimensions;
    for node in &result.nodes {
        assert!(
            node.left() >= dims.padding - 0.01
                && node.right() <= dims.width - dims.padding + 0.01
                && node.top() >= dims.padding - 0.01
                && node.bottom() <= dims.height - dims.padding + 0.01,
            "{} escapes the {}x{} canvas",
            node.text,
            dims.width,
            dims.height
        );
    }
}

const THREE_BY_THREE: &str = r#"{"topic": "T", "children": [
    {"name": "A", "subparts": ["A1", "A2", "A3"]},
    {"name": "B", "subparts": ["B1", "B2", "B3"]},
    {"name": "C", "subparts": ["C1", "C2", "C3"]}
]}"#;

const BROAD: &str = r#"{"topic": "Renewable energy", "children": [
    {"name": "Solar", "children": ["Photovoltaic", "Thermal", "Concentrated"]},
    {"name": "Wind", "children": ["Onshore", "Offshore"]},
    {"name": "Hydro", "children": ["Dams", "Run of river", "Tidal", "Wave"]},
    {"name": "Geothermal", "children": ["Heat pumps"]},
    {"name": "Biomass", "children": ["Wood", "Biogas", "Ethanol"]},
    {"name": "Storage", "children": [{"name": "Batteries", "children": ["Lithium", "Flow"]}, "Pumped hydro"]}
]}"#;

#[test]
fn test_three_by_three_scenario() {
    let spec = parse(THREE_BY_THREE);
    let result = builder().layout(&spec, &LayoutOptions::default()).unwrap();

    assert_eq!(result.algorithm_used, LayoutAlgorithm::Paired);
    assert_eq!(result.nodes.len(), 13);
    assert_eq!(max_overlap_area(&result.nodes), 0.0);
    assert!(detect_collisions(&result.nodes, 0.0).is_empty());
    assert_contained(&result);
}

#[test]
fn test_single_child_scenario() {
    let spec = parse(r#"{"topic": "T", "children": [{"name": "Only"}]}"#);
    let result = builder().layout(&spec, &LayoutOptions::default()).unwrap();

    assert_eq!(result.nodes.len(), 2);
    assert_eq!(result.nodes[0].node_type, NodeType::Topic);
    assert_eq!(result.nodes[1].text, "Only");
    assert!((result.nodes[0].y - result.nodes[1].y).abs() < 0.01);
    assert_contained(&result);
}

#[test]
fn test_empty_children_scenario() {
    let spec = parse(r#"{"topic": "T", "children": []}"#);
    for algorithm in ALL {
        let result = layout_with(&spec, algorithm);
        assert_eq!(result.nodes.len(), 1, "{algorithm}");
        assert_eq!(result.nodes[0].text, "T");
        assert_contained(&result);
        // The floor keeps a lone topic on a sane canvas
        assert!(result.dimensions.width >= 400.0 && result.dimensions.height >= 300.0);
    }
}

#[test]
fn test_every_algorithm_is_contained() {
    let spec = parse(BROAD);
    for algorithm in ALL {
        let result = layout_with(&spec, algorithm);
        assert_eq!(result.algorithm_used, algorithm);
        assert_eq!(result.nodes.len(), spec.node_count(), "{algorithm}");
        assert_contained(&result);
        assert!(
            result.performance_metrics.residual_collisions > 0
                || max_overlap_area(&result.nodes) == 0.0,
            "{algorithm} left unreported overlap"
        );
    }
}

#[test]
fn test_grouped_centering_rule() {
    for count in 1..=6 {
        let children: Vec<String> = (0..count).map(|i| format!("\"Child {i}\"")).collect();
        let json = format!(r#"{{"topic": "Root", "children": [{}]}}"#, children.join(", "));
        let result = layout_with(&parse(&json), LayoutAlgorithm::Grouped);

        let root = result.nodes[0].y;
        let ys: Vec<f32> = result.nodes[1..].iter().map(|n| n.y).collect();
        let expected = if count % 2 == 1 {
            ys[count / 2]
        } else {
            (ys[count / 2 - 1] + ys[count / 2]) / 2.0
        };
        assert!((root - expected).abs() < 0.01, "{count} children");
    }
}

const UNEVEN: &str = r#"{"topic": "Line 1\nLine 2\nLine 3\nLine 4\nLine 5\nLine 6\nLine 7\nLine 8", "children": [
    "A",
    {"name": "B", "children": [
        "B1 first\nB1 second\nB1 third\nB1 fourth\nB1 fifth",
        {"name": "B2", "children": ["B2 x", "B2 y"]}
    ]},
    {"name": "C", "subparts": ["C0", "C1", "C2", "C3", "C4", "C5", "C6", "C7", "C8", "C9"]},
    {"name": "D", "children": ["D1", "D2"]}
]}"#;

fn y_of(result: &LayoutResult, text: &str) -> f32 {
    result
        .nodes
        .iter()
        .find(|n| n.text == text)
        .unwrap_or_else(|| panic!("{text} missing"))
        .y
}

fn assert_centered_on(result: &LayoutResult, parent: &str, children: &[&str]) {
    let ys: Vec<f32> = children.iter().map(|c| y_of(result, c)).collect();
    let n = ys.len();
    let expected = if n % 2 == 1 {
        ys[n / 2]
    } else {
        (ys[n / 2 - 1] + ys[n / 2]) / 2.0
    };
    let actual = y_of(result, parent);
    assert!(
        (actual - expected).abs() < 0.01,
        "{} sits at {actual}, expected {expected} ({})",
        parent.lines().next().unwrap_or(parent),
        result.algorithm_used
    );
}

#[test]
fn test_centering_rule_holds_at_every_level() {
    let spec = parse(UNEVEN);
    let topic = spec.topic().to_string();
    let b1 = "B1 first\nB1 second\nB1 third\nB1 fourth\nB1 fifth";
    let subparts: Vec<String> = (0..10).map(|i| format!("C{i}")).collect();
    let subparts: Vec<&str> = subparts.iter().map(String::as_str).collect();

    for algorithm in [
        LayoutAlgorithm::Stacked,
        LayoutAlgorithm::Grouped,
        LayoutAlgorithm::Paired,
    ] {
        let result = layout_with(&spec, algorithm);
        assert_eq!(result.algorithm_used, algorithm);
        assert_centered_on(&result, &topic, &["A", "B", "C", "D"]);
        assert_centered_on(&result, "B", &[b1, "B2"]);
        assert_centered_on(&result, "B2", &["B2 x", "B2 y"]);
        assert_centered_on(&result, "C", &subparts);
        assert_centered_on(&result, "D", &["D1", "D2"]);
        assert_eq!(max_overlap_area(&result.nodes), 0.0, "{algorithm}");
        assert_contained(&result);
    }
}

#[test]
fn test_tall_topic_sits_on_its_middle_child() {
    let spec = parse(
        r#"{"topic": "L1\nL2\nL3\nL4\nL5\nL6\nL7\nL8", "children": [
            "A",
            "B",
            {"name": "C", "subparts": ["C0", "C1", "C2", "C3", "C4", "C5", "C6", "C7", "C8", "C9"]}
        ]}"#,
    );
    let result = layout_with(&spec, LayoutAlgorithm::Grouped);

    assert!((result.nodes[0].y - y_of(&result, "B")).abs() < 0.01);
    assert!(y_of(&result, "A") < y_of(&result, "B"));
    assert_contained(&result);
}

#[test]
fn test_canvas_optimization_is_idempotent() {
    let spec = parse(BROAD);
    let config = AppConfig::default();
    for algorithm in ALL {
        let result = layout_with(&spec, algorithm);
        let once = optimize_canvas_dimensions(&result.nodes, result.dimensions, &config.canvas);
        let twice = optimize_canvas_dimensions(&result.nodes, once, &config.canvas);
        assert_eq!(once, twice);
        // Recentering may move the content by a rounding error, never more
        assert!(
            (once.width - result.dimensions.width).abs() <= 1.0
                && (once.height - result.dimensions.height).abs() <= 1.0,
            "{algorithm} returned an untightened canvas"
        );
    }
}

#[test]
fn test_selection_and_metrics() {
    let result = builder().layout(&parse(BROAD), &LayoutOptions::default()).unwrap();
    assert_eq!(result.algorithm_used, LayoutAlgorithm::Grouped);
    assert_eq!(result.performance_metrics.complexity, Some(ComplexityTier::Moderate));
    assert_eq!(result.performance_metrics.node_count, result.nodes.len());
    assert_eq!(result.performance_metrics.connector_count, result.connectors.len());

    let related = parse(
        r#"{"topic": "Food web", "children": ["Grass", "Rabbit", "Fox"],
            "relationships": [{"from": "Rabbit", "to": "Grass", "label": "eats"}, {"from": "Fox", "to": "Rabbit", "label": "hunts"}]}"#,
    );
    let result = builder().layout(&related, &LayoutOptions::default()).unwrap();
    assert_eq!(result.algorithm_used, LayoutAlgorithm::ForceDirected);
    assert_eq!(result.nodes.len(), 4 + 2);
    assert_eq!(result.performance_metrics.complexity, Some(ComplexityTier::Complex));
    assert_contained(&result);
}

#[test]
fn test_no_connectors_preference() {
    let options = LayoutOptions::default()
        .with_preferences(Preferences::default().with_no_connectors(true));
    let result = builder().layout(&parse(THREE_BY_THREE), &options).unwrap();
    assert_eq!(result.algorithm_used, LayoutAlgorithm::Grouped);
    assert!(result.connectors.is_empty());
}

#[test]
fn test_configured_preferences_apply() {
    let mut config = AppConfig::default();
    config.layout.preferred_algorithm = Some(LayoutAlgorithm::Radial);
    config.radial.odd_branch_policy = OddBranchPolicy::ReserveSlot;

    let spec = parse(THREE_BY_THREE);
    let result = LayoutBuilder::new(config).layout(&spec, &LayoutOptions::default()).unwrap();
    assert_eq!(result.algorithm_used, LayoutAlgorithm::Radial);
    assert_eq!(result.performance_metrics.reserved_slots, 1);
    assert_eq!(result.nodes.len(), 13);
}

#[test]
fn test_dimension_hint_is_respected_as_padding() {
    let options = LayoutOptions::default().with_dimensions(Dimensions::new(1000.0, 800.0, 15.0));
    let result = builder().layout(&parse(BROAD), &options).unwrap();
    assert_eq!(result.dimensions.padding, 15.0);
    assert_contained(&result);
}

#[test]
fn test_connectors_follow_nodes() {
    let result = layout_with(&parse(BROAD), LayoutAlgorithm::Stacked);
    for connector in &result.connectors {
        assert!(!connector.path.is_empty());
        assert!(connector.anchors.iter().all(|p| p.is_finite()));
    }
}

#[test]
fn test_invalid_specifications_are_rejected() {
    let builder = builder();
    assert!(matches!(
        builder.parse_spec(r#"{"topic": "  ", "children": []}"#),
        Err(CartographError::Spec(SpecError::EmptyTopic))
    ));
    assert!(matches!(
        builder.parse_spec(r#"{"topic": "T", "children": [{"name": ""}]}"#),
        Err(CartographError::Spec(SpecError::EmptyName { .. }))
    ));
    assert!(matches!(
        builder.parse_spec(r#"{"topic": "T", "children": ["A"], "relationships": [{"from": "A", "to": "Z"}]}"#),
        Err(CartographError::Spec(SpecError::UnknownEndpoint { .. }))
    ));
    assert!(matches!(
        builder.parse_spec("{ not json"),
        Err(CartographError::Json(_))
    ));
}

#[test]
fn test_invalid_options_are_rejected() {
    let builder = builder();
    let spec = parse(BROAD);

    let flat = LayoutOptions::default().with_dimensions(Dimensions::new(800.0, 0.0, 20.0));
    assert!(matches!(
        builder.layout(&spec, &flat),
        Err(CartographError::Setting(SettingError::NotPositive {
            field: "dimensions.height",
            ..
        }))
    ));

    let unreadable = LayoutOptions::default().with_theme(Theme {
        font_subpart: 0.0,
        ..Theme::default()
    });
    let mut cache = builder.new_cache();
    assert!(matches!(
        builder.layout_cached(&spec, &unreadable, &mut cache),
        Err(CartographError::Setting(SettingError::NotPositive {
            field: "theme.font_subpart",
            ..
        }))
    ));
    assert!(cache.is_empty());

    let bleeding = LayoutOptions::default().with_dimensions(Dimensions::new(800.0, 600.0, f32::NAN));
    assert!(builder.layout(&spec, &bleeding).is_err());
}

#[test]
fn test_layouts_are_deterministic() {
    let spec = parse(BROAD);
    for algorithm in ALL {
        let first = layout_with(&spec, algorithm);
        let second = layout_with(&spec, algorithm);
        assert_eq!(first.nodes, second.nodes, "{algorithm}");
        assert_eq!(first.connectors, second.connectors, "{algorithm}");
    }
}

#[test]
fn test_cache_reuses_layouts() {
    let builder = builder();
    let spec = parse(BROAD);
    let options = LayoutOptions::default();
    let mut cache = LayoutCache::new(4);

    let first = builder.layout_cached(&spec, &options, &mut cache).unwrap();
    assert!(!first.performance_metrics.cache_hit);
    let second = builder.layout_cached(&spec, &options, &mut cache).unwrap();
    assert!(second.performance_metrics.cache_hit);
    assert_eq!(first.nodes, second.nodes);
    assert_eq!((cache.hits(), cache.misses()), (1, 1));

    let radial = LayoutOptions::default()
        .with_preferences(Preferences::default().with_algorithm(LayoutAlgorithm::Radial));
    let third = builder.layout_cached(&spec, &radial, &mut cache).unwrap();
    assert!(!third.performance_metrics.cache_hit);
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_cache_capacity_comes_from_config() {
    let mut config = AppConfig::default();
    config.layout.cache_capacity = 1;
    let builder = LayoutBuilder::new(config);
    let mut cache = builder.new_cache();
    assert_eq!(cache.capacity(), 1);

    let broad = parse(BROAD);
    let grid = parse(THREE_BY_THREE);
    let options = LayoutOptions::default();
    builder.layout_cached(&broad, &options, &mut cache).unwrap();
    builder.layout_cached(&grid, &options, &mut cache).unwrap();
    assert_eq!(cache.len(), 1);

    // The second specification pushed the first one out
    let again = builder.layout_cached(&broad, &options, &mut cache).unwrap();
    assert!(!again.performance_metrics.cache_hit);
    assert_eq!(cache.hits(), 0);

    assert_eq!(LayoutBuilder::default().new_cache().capacity(), 64);
}

#[test]
fn test_result_serializes_to_json() {
    let result = builder().layout(&parse(THREE_BY_THREE), &LayoutOptions::default()).unwrap();
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["algorithm_used"], "paired");
    assert_eq!(json["nodes"].as_array().map(Vec::len), Some(13));
    assert_eq!(json["connectors"][0]["kind"], "horizontal_brace");
    assert_eq!(json["performance_metrics"]["complexity"], "simple");
}
