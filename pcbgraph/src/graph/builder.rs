//! Graph builder.
//!
//! Turns component records into a [`KnowledgeGraph`]. Bad records never
//! abort a build: they are rejected or repaired, counted, and reported as
//! [`Diagnostic`]s on the result.

use serde::Serialize;
use std::fmt;

use crate::graph::knowledge::KnowledgeGraph;
use crate::graph::stats::{GraphStatistics, StatsAccumulator};
use crate::model::{
    Component, ComponentRecord, Dimensions, GraphNode, NodeKind, RelationKind, DEFAULT_LABEL_LEN,
};
use crate::taxonomy::{Classification, MatchOutcome, TaxonomyClassifier};

/// A per-record problem found while building.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Record lacks an id or a name and was rejected.
    MalformedRecord { index: usize, reason: String },
    /// Record reuses an id already accepted earlier in the run and was rejected.
    DuplicateComponentId { index: usize, id: String },
    /// No function rule matched and the `hasFunction` edge was omitted.
    Unclassified { id: String, descriptor: String },
    /// A negative or non-finite dimension was dropped.
    InvalidDimension {
        id: String,
        field: &'static str,
        value: f64,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MalformedRecord { index, reason } => {
                write!(f, "record #{} rejected: {}", index, reason)
            }
            Diagnostic::DuplicateComponentId { index, id } => {
                write!(f, "record #{} rejected: duplicate component id '{}'", index, id)
            }
            Diagnostic::Unclassified { id, descriptor } => {
                write!(f, "component '{}' has no function class for '{}'", id, descriptor)
            }
            Diagnostic::InvalidDimension { id, field, value } => {
                write!(f, "component '{}' has invalid {} {}; ignored", id, field, value)
            }
        }
    }
}

/// Output of one build.
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub graph: KnowledgeGraph,
    pub statistics: GraphStatistics,
    pub diagnostics: Vec<Diagnostic>,
}

impl BuildResult {
    pub fn into_parts(self) -> (KnowledgeGraph, GraphStatistics) {
        (self.graph, self.statistics)
    }
}

pub struct GraphBuilder<'a> {
    classifier: &'a TaxonomyClassifier,
    label_len: usize,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(classifier: &'a TaxonomyClassifier) -> Self {
        Self {
            classifier,
            label_len: DEFAULT_LABEL_LEN,
        }
    }

    /// Truncation length for component display labels.
    pub fn with_label_len(mut self, label_len: usize) -> Self {
        self.label_len = label_len;
        self
    }

    /// Build a fresh graph from `records`.
    pub fn build(&self, records: &[ComponentRecord]) -> BuildResult {
        tracing::info!("Building knowledge graph from {} records", records.len());

        let mut graph = KnowledgeGraph::new();
        let mut acc = StatsAccumulator::default();
        let mut diagnostics = Vec::new();

        for (index, record) in records.iter().enumerate() {
            acc.record_seen();

            let id = record.id.trim();
            let name = record.name.trim();
            if id.is_empty() || name.is_empty() {
                let reason = if id.is_empty() { "missing id" } else { "missing name" };
                tracing::warn!("Rejecting record #{}: {}", index, reason);
                acc.malformed();
                diagnostics.push(Diagnostic::MalformedRecord {
                    index,
                    reason: reason.to_string(),
                });
                continue;
            }

            if graph.contains_component(id) {
                tracing::warn!("Rejecting record #{}: duplicate id '{}'", index, id);
                acc.duplicate();
                diagnostics.push(Diagnostic::DuplicateComponentId {
                    index,
                    id: id.to_string(),
                });
                continue;
            }

            let dimensions = sanitize_dimensions(id, record, &mut acc, &mut diagnostics);
            let classification = self.classifier.classify(
                &record.package,
                &record.function_descriptor,
                &record.physical_descriptor,
            );

            let component = Component {
                key: id.to_string(),
                name: name.to_string(),
                raw_package: record.package.trim().to_string(),
                function_descriptor: record.function_descriptor.trim().to_string(),
                physical_descriptor: record.physical_descriptor.trim().to_string(),
                dimensions,
                manufacturer: non_empty(&record.manufacturer),
                part_number: non_empty(&record.part_number),
                library_name: non_empty(&record.library_name),
            };
            acc.component(&component.dimensions);

            let descriptor = component.function_descriptor.clone();
            let node = graph.add_node(GraphNode::component(component, self.label_len));

            self.attach(
                &mut graph,
                &mut acc,
                node,
                id,
                &descriptor,
                classification,
                &mut diagnostics,
            );
        }

        let statistics = acc.finish(&graph);
        tracing::info!(
            "Built graph: {} nodes, {} edges, {} rejected",
            statistics.total_nodes,
            statistics.total_edges,
            statistics.rejected()
        );

        BuildResult {
            graph,
            statistics,
            diagnostics,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn attach(
        &self,
        graph: &mut KnowledgeGraph,
        acc: &mut StatsAccumulator,
        node: petgraph::graph::NodeIndex,
        id: &str,
        descriptor: &str,
        classification: Classification,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let Classification {
            package,
            function,
            physical,
        } = classification;

        let unclassified = function
            .as_ref()
            .map_or(true, |f| f.outcome == MatchOutcome::Sentinel);
        if unclassified {
            acc.unclassified();
        }

        let mut labels = vec![(NodeKind::Package, package.label)];
        match function {
            Some(f) => labels.push((NodeKind::FunctionClass, f.label)),
            None => {
                tracing::debug!("No function class for component '{}'", id);
                diagnostics.push(Diagnostic::Unclassified {
                    id: id.to_string(),
                    descriptor: descriptor.to_string(),
                });
            }
        }
        labels.push((NodeKind::PhysicalClass, physical.label));

        for (kind, label) in labels {
            let Some(relation) = kind.relation() else {
                continue;
            };
            let (category, created) = graph.ensure_category(kind, &label);
            if created {
                tracing::debug!("New {} node '{}'", kind, label);
            }
            graph.link(node, category, relation);
            acc.label(kind, &label);
            acc.edge(relation);
        }
    }
}

/// Build with the default taxonomy and label length.
pub fn build(records: &[ComponentRecord]) -> BuildResult {
    GraphBuilder::new(&TaxonomyClassifier::default()).build(records)
}

fn sanitize_dimensions(
    id: &str,
    record: &ComponentRecord,
    acc: &mut StatsAccumulator,
    diagnostics: &mut Vec<Diagnostic>,
) -> Dimensions {
    let mut check = |field: &'static str, value: Option<f64>| -> Option<f64> {
        let v = value?;
        if v.is_finite() && v >= 0.0 {
            return Some(v);
        }
        tracing::warn!("Component '{}': invalid {} {}", id, field, v);
        acc.invalid_dimension();
        diagnostics.push(Diagnostic::InvalidDimension {
            id: id.to_string(),
            field,
            value: v,
        });
        None
    };

    Dimensions {
        length: check("length", record.length),
        width: check("width", record.width),
        height: check("height", record.height),
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Relations a fully classified component carries.
pub const RELATIONS_PER_COMPONENT: usize = RelationKind::ALL.len();

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::{TaxonomyConfig, UnmatchedPolicy};

    fn sample() -> Vec<ComponentRecord> {
        vec![
            ComponentRecord::new("1", "R1")
                .with_package("R0603")
                .with_function("Resistor")
                .with_dimensions(1.6, 0.8, 0.45),
            ComponentRecord::new("2", "R2")
                .with_package("0603")
                .with_function("Resistor")
                .with_dimensions(1.6, 0.8, 0.45),
            ComponentRecord::new("3", "C1")
                .with_package("C0805")
                .with_function("Capacitor")
                .with_dimensions(2.0, 1.25, 0.6),
            ComponentRecord::new("4", "U1")
                .with_package("SOIC-8")
                .with_function("IC/Transistor"),
        ]
    }

    #[test]
    fn builds_shared_category_nodes() {
        let result = build(&sample());
        let graph = &result.graph;

        assert_eq!(graph.count_of_kind(NodeKind::Component), 4);
        assert_eq!(graph.count_of_kind(NodeKind::Package), 3);
        assert_eq!(graph.count_of_kind(NodeKind::FunctionClass), 3);
        assert_eq!(graph.count_of_kind(NodeKind::PhysicalClass), 1);
        assert_eq!(graph.edge_count(), 12);
        assert_eq!(graph.category(NodeKind::Package, "0603").unwrap().count, 2);
        assert!(graph.verify().is_ok());

        for node in graph.nodes_of_kind(NodeKind::Component) {
            assert_eq!(graph.out_degree(node.id()), RELATIONS_PER_COMPONENT);
        }
    }

    #[test]
    fn statistics_match_graph() {
        let result = build(&sample());
        let stats = &result.statistics;
        assert_eq!(stats.total_records, 4);
        assert_eq!(stats.total_components, 4);
        assert_eq!(stats.total_nodes, result.graph.node_count());
        assert_eq!(stats.total_edges, result.graph.edge_count());
        assert_eq!(stats.relation_count(RelationKind::HasFunction), 4);
        assert_eq!(stats.label_count(NodeKind::Package, "0603"), 2);
        assert_eq!(stats.dimensions.length.unwrap().count, 3);
        assert_eq!(stats.network.weak_components, 1);
        assert!(stats.network.weakly_connected);
    }

    #[test]
    fn duplicate_id_is_rejected_and_counted() {
        let records = vec![
            ComponentRecord::new("C1", "first").with_package("0603"),
            ComponentRecord::new("C1", "second").with_package("0805"),
        ];
        let result = build(&records);
        assert_eq!(result.graph.count_of_kind(NodeKind::Component), 1);
        assert_eq!(result.statistics.rejected_duplicate, 1);
        assert_eq!(result.graph.node("COMP_C1").unwrap().name(), "first");
        assert!(result.graph.category(NodeKind::Package, "0805").is_none());
        assert!(matches!(
            result.diagnostics[0],
            Diagnostic::DuplicateComponentId { index: 1, .. }
        ));
    }

    #[test]
    fn malformed_records_are_rejected() {
        let records = vec![
            ComponentRecord::new("", "nameless id"),
            ComponentRecord::new("7", "  "),
            ComponentRecord::new("8", "ok"),
        ];
        let result = build(&records);
        assert_eq!(result.statistics.rejected_malformed, 2);
        assert_eq!(result.statistics.total_components, 1);
        assert_eq!(result.diagnostics.len(), 2);
    }

    #[test]
    fn empty_input_is_an_empty_graph() {
        let result = build(&[]);
        assert!(result.graph.is_empty());
        assert_eq!(result.statistics.total_edges, 0);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn blank_descriptor_counts_as_unclassified() {
        let records = vec![
            ComponentRecord::new("1", "X1").with_package("0603"),
            ComponentRecord::new("2", "X2").with_package("0603").with_function("  "),
        ];
        let result = build(&records);
        let node = result
            .graph
            .category(NodeKind::FunctionClass, "Unclassified")
            .unwrap();
        assert_eq!(node.count, 2);
        assert_eq!(result.statistics.unclassified, 2);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn omit_policy_drops_edge_with_diagnostic() {
        let classifier = TaxonomyClassifier::new(TaxonomyConfig {
            unmatched_function: UnmatchedPolicy::Omit,
            ..Default::default()
        })
        .unwrap();
        let records = vec![ComponentRecord::new("1", "Q1")
            .with_package("SOT-23")
            .with_function("Class_42")];
        let result = GraphBuilder::new(&classifier).build(&records);

        assert_eq!(result.graph.out_degree("COMP_1"), 2);
        assert_eq!(result.statistics.unclassified, 1);
        assert!(matches!(
            &result.diagnostics[0],
            Diagnostic::Unclassified { id, .. } if id == "1"
        ));
        assert!(result.graph.verify().is_ok());
    }

    #[test]
    fn invalid_dimensions_are_dropped() {
        let mut record = ComponentRecord::new("1", "R1").with_dimensions(-1.0, 0.8, f64::NAN);
        record.package = "0603".into();
        let result = build(&[record]);
        let node = result.graph.node("COMP_1").unwrap().as_component().unwrap();
        assert_eq!(node.component.dimensions.length, None);
        assert_eq!(node.component.dimensions.width, Some(0.8));
        assert_eq!(node.component.dimensions.height, None);
        assert_eq!(result.statistics.invalid_dimensions, 2);
    }

    #[test]
    fn label_length_is_configurable() {
        let classifier = TaxonomyClassifier::default();
        let records = vec![ComponentRecord::new("1", "A very long component name")];
        let result = GraphBuilder::new(&classifier).with_label_len(6).build(&records);
        assert_eq!(result.graph.node("COMP_1").unwrap().label(), "A very");
    }
}
