//! Tests for the layout engines

use pcbgraph::graph::build;
use pcbgraph::layout::{
    HierarchicalConfig, HierarchicalLayout, LayerShape, RadialConfig, RadialLayout, SpringConfig,
    SpringLayout,
};
use pcbgraph::prelude::*;
use pcbgraph::{compute_layout, LayoutSettings};
use std::f64::consts::TAU;
use std::time::{Duration, Instant};

const PACKAGES: &[&str] = &["0402", "0603", "0805", "SOT-23", "SOIC-8", "QFN-32", "TO-220"];
const FUNCTIONS: &[&str] = &["resistor", "capacitor", "inductor", "led", "mcu", "ldo", "diode"];

/// A board of `n` components spread over a handful of categories.
fn board(n: usize) -> KnowledgeGraph {
    let records: Vec<ComponentRecord> = (0..n)
        .map(|i| {
            ComponentRecord::new(format!("P{:03}", i), format!("Part{:03}", i))
                .with_package(PACKAGES[i % PACKAGES.len()])
                .with_function(FUNCTIONS[(i / 3) % FUNCTIONS.len()])
        })
        .collect();
    build(&records).graph
}

fn angle_of(p: pcbgraph::Point) -> f64 {
    p.y.atan2(p.x).rem_euclid(TAU)
}

#[test]
fn test_hierarchical_is_stable_across_calls() {
    let graph = board(40);
    let engine = HierarchicalLayout::default();
    let first = engine.layout(&graph);
    for _ in 0..3 {
        assert_eq!(engine.layout(&graph), first);
    }
}

#[test]
fn test_hierarchical_orders_layer_by_label() {
    let graph = board(20);
    let config = HierarchicalConfig {
        shape: LayerShape::Columns,
        ..Default::default()
    };
    let layout = HierarchicalLayout::new(config).unwrap().layout(&graph);

    // Packages share a column and are stacked in label order
    let mut packages: Vec<(&str, f64)> = graph
        .nodes_of_kind(NodeKind::Package)
        .into_iter()
        .map(|n| (n.label(), layout.position(n.id()).unwrap().y))
        .collect();
    packages.sort_by(|a, b| a.0.cmp(b.0));
    for pair in packages.windows(2) {
        assert!(pair[0].1 < pair[1].1, "{:?}", pair);
    }

    let xs: Vec<f64> = graph
        .nodes_of_kind(NodeKind::Package)
        .into_iter()
        .map(|n| layout.position(n.id()).unwrap().x)
        .collect();
    assert!(xs.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn test_hierarchical_layers_follow_precedence() {
    let graph = board(10);
    let layout = HierarchicalLayout::default().layout(&graph);

    let component = layout.layers[&NodeKind::Component];
    let package = layout.layers[&NodeKind::Package];
    let physical = layout.layers[&NodeKind::PhysicalClass];
    assert!(component.index > package.index);
    assert!(package.index > physical.index);
    assert!(component.radius.unwrap() > package.radius.unwrap());
}

#[test]
fn test_spring_same_seed_reproduces_coordinates() {
    let graph = board(60);
    let a = SpringLayout::default().with_seed(1234).layout(&graph);
    let b = SpringLayout::default().with_seed(1234).layout(&graph);
    assert_eq!(a.positions, b.positions);

    let c = SpringLayout::default().with_seed(4321).layout(&graph);
    assert_ne!(a.positions, c.positions);
}

#[test]
fn test_spring_terminates_within_budget_at_expected_size() {
    let graph = board(200);
    let config = SpringConfig::default();
    let budget = config.iterations;

    let started = Instant::now();
    let layout = SpringLayout::new(config).unwrap().layout(&graph);
    let elapsed = started.elapsed();

    assert_eq!(layout.len(), graph.node_count());
    assert!(layout.iterations.unwrap() <= budget);
    assert!(elapsed < Duration::from_secs(30), "took {:?}", elapsed);
}

#[test]
fn test_spring_keeps_minimum_separation() {
    let graph = board(50);
    let config = SpringConfig::default();
    let min_separation = config.min_separation;
    let layout = SpringLayout::new(config).unwrap().layout(&graph);

    let closest = layout.min_distance().unwrap();
    assert!(closest >= min_separation - 1e-9, "closest pair {}", closest);
}

#[test]
fn test_spring_budget_of_one_returns_best_positions() {
    let graph = board(30);
    let config = SpringConfig {
        iterations: 1,
        tolerance: 0.0,
        ..Default::default()
    };
    let layout = SpringLayout::new(config).unwrap().layout(&graph);
    assert_eq!(layout.iterations, Some(1));
    assert!(!layout.converged);
    assert_eq!(layout.len(), graph.node_count());
}

#[test]
fn test_radial_sector_width_is_proportional() {
    let graph = board(42);
    let engine = RadialLayout::default();
    let sectors = engine.sectors(&graph);
    let total: usize = sectors.iter().map(|s| s.members.len()).sum();
    assert_eq!(total, 42);

    for sector in &sectors {
        let k = graph.in_degree(&sector.anchor_id);
        assert_eq!(sector.members.len(), k);
        let expected = TAU * k as f64 / total as f64;
        assert!((sector.width - expected).abs() < 1e-12);
    }

    let covered: f64 = sectors.iter().map(|s| s.width).sum();
    assert!((covered - TAU).abs() < 1e-9);
}

#[test]
fn test_radial_members_fall_inside_their_arc() {
    let graph = board(42);
    let engine = RadialLayout::new(RadialConfig {
        start_angle: 0.3,
        ..Default::default()
    })
    .unwrap();
    let layout = engine.layout(&graph);

    for sector in engine.sectors(&graph) {
        for member in &sector.members {
            let angle = angle_of(layout.position(member).unwrap());
            assert!(sector.contains(angle), "{} outside {:?}", member, sector);
        }
    }
}

#[test]
fn test_radial_components_sit_on_member_ring() {
    let graph = board(12);
    let config = RadialConfig::default();
    let member_radius = config.member_radius;
    let layout = RadialLayout::new(config).unwrap().layout(&graph);

    for node in graph.nodes_of_kind(NodeKind::Component) {
        let p = layout.position(node.id()).unwrap();
        assert!(((p.x * p.x + p.y * p.y).sqrt() - member_radius).abs() < 1e-9);
    }
}

#[test]
fn test_engines_are_interchangeable() {
    let graph = board(25);
    let settings = LayoutSettings::default();
    for algorithm in LayoutAlgorithm::ALL {
        let engine: Box<dyn LayoutEngine> = settings.engine(algorithm).unwrap();
        assert_eq!(engine.algorithm(), algorithm);
        let layout = engine.layout(&graph);
        assert_eq!(layout.algorithm, algorithm);
        assert_eq!(layout.len(), graph.node_count());
        assert_eq!(layout, compute_layout(&graph, algorithm, &settings).unwrap());
    }
}

#[test]
fn test_layout_does_not_mutate_graph() {
    let graph = board(15);
    let before: Vec<String> = graph.nodes().map(|n| format!("{:?}", n)).collect();
    for algorithm in LayoutAlgorithm::ALL {
        compute_layout(&graph, algorithm, &LayoutSettings::default()).unwrap();
    }
    let after: Vec<String> = graph.nodes().map(|n| format!("{:?}", n)).collect();
    assert_eq!(before, after);
}

#[test]
fn test_algorithm_names_parse() {
    assert_eq!("radial".parse::<LayoutAlgorithm>().unwrap(), LayoutAlgorithm::Radial);
    assert_eq!("Spring".parse::<LayoutAlgorithm>().unwrap(), LayoutAlgorithm::Spring);
    assert!("circular".parse::<LayoutAlgorithm>().is_err());
}
