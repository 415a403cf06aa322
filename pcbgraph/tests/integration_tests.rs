//! Integration tests for the pcbgraph library

use pcbgraph::graph::{Diagnostic, RELATIONS_PER_COMPONENT};
use pcbgraph::prelude::*;
use pcbgraph::{compute_layout, LayoutSettings, RunOptions, TaxonomyConfig};
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load(name: &str) -> BuildResult {
    let records = PcbGraphCore::load_records(&fixture_path(name)).expect("Should load fixture");
    PcbGraphCore::default().build(&records)
}

#[test]
fn test_build_vayo_fixture() {
    let result = load("vayo_small.json");
    let stats = &result.statistics;

    assert_eq!(stats.total_records, 8);
    assert_eq!(stats.total_components, 6);
    assert_eq!(stats.rejected_malformed, 1);
    assert_eq!(stats.rejected_duplicate, 1);
    assert_eq!(stats.unclassified, 1);

    assert_eq!(stats.node_count(NodeKind::Component), 6);
    assert_eq!(stats.node_count(NodeKind::Package), 5);
    assert_eq!(stats.node_count(NodeKind::FunctionClass), 5);
    assert_eq!(stats.node_count(NodeKind::PhysicalClass), 2);
    assert_eq!(stats.total_nodes, 18);
    assert_eq!(stats.total_edges, 18);

    assert_eq!(stats.label_count(NodeKind::Package, "0603"), 2);
    assert_eq!(stats.label_count(NodeKind::FunctionClass, "IC"), 1);
    assert_eq!(stats.label_count(NodeKind::FunctionClass, "Unclassified"), 1);
    assert_eq!(stats.label_count(NodeKind::PhysicalClass, "SurfaceMount"), 5);
    assert_eq!(stats.label_count(NodeKind::PhysicalClass, "Other"), 1);

    result.graph.verify().expect("Graph invariants should hold");
}

#[test]
fn test_physical_class_codes_override_package_form() {
    let result = load("vayo_physical.json");
    let stats = &result.statistics;
    let graph = &result.graph;

    assert_eq!(stats.total_components, 5);
    assert_eq!(stats.node_count(NodeKind::PhysicalClass), 5);
    for label in ["Passive", "Active", "Connector", "SurfaceMount", "Physical_7"] {
        assert_eq!(stats.label_count(NodeKind::PhysicalClass, label), 1, "{}", label);
    }
    assert_eq!(stats.label_count(NodeKind::PhysicalClass, "Other"), 0);

    let physical = |id: &str| {
        graph
            .target_of(id, RelationKind::HasPhysicalType)
            .map(|n| n.label().to_string())
    };
    assert_eq!(physical("COMP_1").as_deref(), Some("Passive"));
    assert_eq!(physical("COMP_3").as_deref(), Some("Connector"));
    // No PhysicalClass code: the form comes from the 0805 package
    assert_eq!(physical("COMP_4").as_deref(), Some("SurfaceMount"));

    let j1 = graph.node("COMP_3").and_then(|n| n.as_component()).unwrap();
    assert_eq!(j1.component.physical_descriptor, "Connector");
    result.graph.verify().expect("Graph invariants should hold");
}

#[test]
fn test_duplicate_keeps_first_occurrence() {
    let result = load("vayo_small.json");
    let c1 = result.graph.node("COMP_3").expect("Should have C1");
    assert_eq!(c1.name(), "C1");

    assert!(result
        .diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::DuplicateComponentId { id, .. } if id == "3")));
    assert!(result
        .diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::MalformedRecord { index: 7, .. })));
}

#[test]
fn test_build_flat_fixture() {
    let result = load("records_flat.json");
    let stats = &result.statistics;
    let graph = &result.graph;

    assert_eq!(stats.total_components, 5);
    assert_eq!(stats.invalid_dimensions, 1);
    assert_eq!(stats.node_count(NodeKind::PhysicalClass), 3);

    let target = |id: &str, relation| graph.target_of(id, relation).map(|n| n.label().to_string());
    assert_eq!(target("COMP_Q1", RelationKind::UsesPackage).as_deref(), Some("SOT-23"));
    assert_eq!(target("COMP_Q1", RelationKind::HasFunction).as_deref(), Some("Transistor"));
    assert_eq!(target("COMP_Y1", RelationKind::UsesPackage).as_deref(), Some("HC-49"));
    assert_eq!(target("COMP_Y1", RelationKind::HasPhysicalType).as_deref(), Some("ThroughHole"));
    assert_eq!(target("COMP_Y1", RelationKind::HasFunction).as_deref(), Some("Crystal"));

    // Empty package and descriptor land in the sentinels
    assert_eq!(target("COMP_X9", RelationKind::UsesPackage).as_deref(), Some("Unknown"));
    assert_eq!(target("COMP_X9", RelationKind::HasFunction).as_deref(), Some("Unclassified"));
    assert_eq!(target("COMP_X9", RelationKind::HasPhysicalType).as_deref(), Some("Other"));

    // Negative height is dropped, the rest of the outline is kept
    let c20 = graph.node("COMP_C20").and_then(|n| n.as_component()).unwrap();
    assert_eq!(c20.component.dimensions.length, Some(3.2));
    assert_eq!(c20.component.dimensions.height, None);
}

#[test]
fn test_every_classified_component_has_three_typed_edges() {
    let result = load("vayo_small.json");
    let graph = &result.graph;

    for node in graph.nodes_of_kind(NodeKind::Component) {
        assert_eq!(graph.out_degree(node.id()), 3, "{}", node.id());
        assert_eq!(graph.in_degree(node.id()), 0, "{}", node.id());
        for relation in RelationKind::ALL {
            let target = graph.target_of(node.id(), relation).expect("Should have target");
            assert_eq!(target.kind(), relation.target_kind());
        }
    }
    for kind in NodeKind::CATEGORIES {
        for node in graph.nodes_of_kind(kind) {
            assert_eq!(graph.out_degree(node.id()), 0);
        }
    }
}

#[test]
fn test_omit_policy_drops_function_edge_with_diagnostic() {
    let core = PcbGraphCore::from_config_file(Some(&fixture_path("omit_unmatched.json")))
        .expect("Config should load");
    let records = PcbGraphCore::load_records(&fixture_path("vayo_small.json")).unwrap();
    let result = core.build(&records);

    // J1 ("Class_99") matches nothing
    assert_eq!(result.graph.out_degree("COMP_6"), 2);
    assert!(result.graph.target_of("COMP_6", RelationKind::HasFunction).is_none());
    assert!(result
        .diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::Unclassified { id, .. } if id == "6")));
    assert_eq!(result.statistics.total_edges, 17);
    assert_eq!(result.statistics.unclassified, 1);
    result.graph.verify().unwrap();
}

#[test]
fn test_custom_taxonomy() {
    let mut taxonomy = TaxonomyConfig::default();
    taxonomy.function_rules.insert(
        0,
        pcbgraph::taxonomy::KeywordRule {
            label: "Header".into(),
            keywords: vec!["class_99".into()],
        },
    );
    let classifier = TaxonomyClassifier::new(taxonomy).unwrap();
    let records = PcbGraphCore::load_records(&fixture_path("vayo_small.json")).unwrap();
    let result = GraphBuilder::new(&classifier).build(&records);

    assert_eq!(result.statistics.unclassified, 0);
    assert_eq!(result.statistics.label_count(NodeKind::FunctionClass, "Header"), 1);
}

#[test]
fn test_empty_input_is_an_empty_graph() {
    let result = PcbGraphCore::default().build(&[]);
    assert!(result.graph.is_empty());
    assert_eq!(result.statistics.total_nodes, 0);
    assert_eq!(result.statistics.total_edges, 0);
    assert!(result.diagnostics.is_empty());

    for algorithm in LayoutAlgorithm::ALL {
        let layout = compute_layout(&result.graph, algorithm, &LayoutSettings::default()).unwrap();
        assert!(layout.is_empty());
    }
}

#[test]
fn test_all_layouts_place_every_node() {
    let result = load("vayo_small.json");
    for algorithm in LayoutAlgorithm::ALL {
        let layout = compute_layout(&result.graph, algorithm, &LayoutSettings::default()).unwrap();
        assert_eq!(layout.len(), result.graph.node_count(), "{}", algorithm);
        for node in result.graph.nodes() {
            let p = layout.position(node.id()).expect("Node should be placed");
            assert!(p.x.is_finite() && p.y.is_finite());
        }
    }
}

#[test]
fn test_run_pipeline_writes_all_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let result = PcbGraphCore::default()
        .run(
            &fixture_path("records_flat.json"),
            &RunOptions {
                layout: Some(LayoutAlgorithm::Hierarchical),
                seed: None,
                output_dir: Some(dir.path().to_path_buf()),
                graph_formats: None,
            },
        )
        .expect("Pipeline should succeed");

    for name in [
        "nodes.csv",
        "edges.csv",
        "knowledge_graph.graphml",
        "knowledge_graph.gml",
        "knowledge_graph.gexf",
        "knowledge_graph.json",
        "layout.json",
        "report.md",
        "report.json",
    ] {
        assert!(dir.path().join(name).exists(), "{} missing", name);
    }
    assert_eq!(result.exported.len(), 9);

    let report = std::fs::read_to_string(dir.path().join("report.md")).unwrap();
    assert!(report.contains("## 7. Layout"));
    assert!(report.contains("invalid height"));
}

#[test]
fn test_invalid_config_file_is_rejected() {
    let result = PcbGraphCore::from_config_file(Some(&fixture_path("invalid_config.json")));
    assert!(matches!(result, Err(PcbGraphError::Config(_))));
}

const PACKAGES: &[&str] = &["0603", "R0603", "C0805", "SOT23", "", "QFN-32", "TO-220", "custom"];
const FUNCTIONS: &[&str] = &["resistor", "Capacitor", "", "LDO regulator", "mystery", "LED red"];

fn records_strategy() -> impl Strategy<Value = Vec<ComponentRecord>> {
    prop::collection::vec((0..PACKAGES.len(), 0..FUNCTIONS.len()), 0..40).prop_map(|picks| {
        picks
            .into_iter()
            .enumerate()
            .map(|(i, (p, f))| {
                ComponentRecord::new(format!("U{}", i), format!("Part{}", i))
                    .with_package(PACKAGES[p])
                    .with_function(FUNCTIONS[f])
            })
            .collect()
    })
}

fn node_ids(graph: &KnowledgeGraph) -> BTreeSet<String> {
    graph.nodes().map(|n| n.id().to_string()).collect()
}

proptest! {
    #[test]
    fn prop_build_is_order_independent(
        (records, shuffled) in records_strategy()
            .prop_flat_map(|r| (Just(r.clone()), Just(r).prop_shuffle()))
    ) {
        let a = pcbgraph::graph::build(&records);
        let b = pcbgraph::graph::build(&shuffled);

        prop_assert_eq!(node_ids(&a.graph), node_ids(&b.graph));
        prop_assert_eq!(&a.statistics, &b.statistics);
    }

    #[test]
    fn prop_graph_invariants_hold(records in records_strategy()) {
        let result = pcbgraph::graph::build(&records);
        prop_assert!(result.graph.verify().is_ok());
        prop_assert_eq!(result.statistics.total_edges, RELATIONS_PER_COMPONENT * records.len());
        prop_assert!(
            result.statistics.node_count(NodeKind::Package)
                <= records.iter().map(|r| r.package.as_str()).collect::<BTreeSet<_>>().len()
        );
    }
}
