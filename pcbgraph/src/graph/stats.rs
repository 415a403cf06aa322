//! Aggregate statistics over a built graph.
//!
//! Counts are accumulated while the builder runs and finalized against the
//! finished graph. Every map is ordered, so two builds over the same records
//! in any order produce identical statistics.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::graph::knowledge::KnowledgeGraph;
use crate::model::{Dimensions, NodeKind, RelationKind};

/// Mean, standard deviation and range of one dimension over present values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl SummaryStats {
    /// Population statistics; `None` when there are no values.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        // Sorted so the floating point sum does not depend on record order.
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let n = sorted.len() as f64;
        let mean = sorted.iter().sum::<f64>() / n;
        let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        Some(Self {
            count: sorted.len(),
            mean,
            std_dev: variance.sqrt(),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionSummary {
    pub length: Option<SummaryStats>,
    pub width: Option<SummaryStats>,
    pub height: Option<SummaryStats>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkMetrics {
    pub density: f64,
    pub weakly_connected: bool,
    pub weak_components: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphStatistics {
    /// Records offered to the builder, including rejected ones.
    pub total_records: usize,
    pub total_components: usize,
    pub total_nodes: usize,
    pub total_edges: usize,
    pub node_counts: BTreeMap<NodeKind, usize>,
    pub relation_counts: BTreeMap<RelationKind, usize>,
    /// Components per category label, for each category kind.
    pub label_counts: BTreeMap<NodeKind, BTreeMap<String, usize>>,
    pub rejected_malformed: usize,
    pub rejected_duplicate: usize,
    /// Components whose function fell back to the sentinel or was omitted.
    pub unclassified: usize,
    pub invalid_dimensions: usize,
    pub dimensions: DimensionSummary,
    pub network: NetworkMetrics,
}

impl GraphStatistics {
    pub fn rejected(&self) -> usize {
        self.rejected_malformed + self.rejected_duplicate
    }

    pub fn node_count(&self, kind: NodeKind) -> usize {
        self.node_counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn relation_count(&self, relation: RelationKind) -> usize {
        self.relation_counts.get(&relation).copied().unwrap_or(0)
    }

    pub fn label_count(&self, kind: NodeKind, label: &str) -> usize {
        self.label_counts
            .get(&kind)
            .and_then(|m| m.get(label))
            .copied()
            .unwrap_or(0)
    }

    /// The `n` most used labels of a category kind, by count descending then label.
    pub fn top(&self, kind: NodeKind, n: usize) -> Vec<(String, usize)> {
        let Some(counts) = self.label_counts.get(&kind) else {
            return Vec::new();
        };
        let mut entries: Vec<(String, usize)> =
            counts.iter().map(|(l, c)| (l.clone(), *c)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries.truncate(n);
        entries
    }
}

/// Running counters fed by the builder.
#[derive(Debug, Default)]
pub(crate) struct StatsAccumulator {
    stats: GraphStatistics,
    lengths: Vec<f64>,
    widths: Vec<f64>,
    heights: Vec<f64>,
}

impl StatsAccumulator {
    pub(crate) fn record_seen(&mut self) {
        self.stats.total_records += 1;
    }

    pub(crate) fn malformed(&mut self) {
        self.stats.rejected_malformed += 1;
    }

    pub(crate) fn duplicate(&mut self) {
        self.stats.rejected_duplicate += 1;
    }

    pub(crate) fn unclassified(&mut self) {
        self.stats.unclassified += 1;
    }

    pub(crate) fn invalid_dimension(&mut self) {
        self.stats.invalid_dimensions += 1;
    }

    pub(crate) fn component(&mut self, dimensions: &Dimensions) {
        self.stats.total_components += 1;
        self.lengths.extend(dimensions.length);
        self.widths.extend(dimensions.width);
        self.heights.extend(dimensions.height);
    }

    pub(crate) fn label(&mut self, kind: NodeKind, label: &str) {
        *self
            .stats
            .label_counts
            .entry(kind)
            .or_default()
            .entry(label.to_string())
            .or_default() += 1;
    }

    pub(crate) fn edge(&mut self, relation: RelationKind) {
        self.stats.total_edges += 1;
        *self.stats.relation_counts.entry(relation).or_default() += 1;
    }

    /// Attach graph-wide figures and return the final statistics.
    pub(crate) fn finish(mut self, graph: &KnowledgeGraph) -> GraphStatistics {
        self.stats.total_nodes = graph.node_count();
        for kind in NodeKind::ALL {
            self.stats
                .node_counts
                .insert(kind, graph.count_of_kind(kind));
        }

        self.stats.dimensions = DimensionSummary {
            length: SummaryStats::from_values(&self.lengths),
            width: SummaryStats::from_values(&self.widths),
            height: SummaryStats::from_values(&self.heights),
        };

        let weak_components = graph.weakly_connected_components();
        self.stats.network = NetworkMetrics {
            density: graph.density(),
            weakly_connected: weak_components == 1,
            weak_components,
        };

        self.stats
    }
}
