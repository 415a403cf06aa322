//! Knowledge graph storage.
//!
//! Nodes live in a petgraph arena; identity lookups go through explicit
//! index maps so a package label or component id always resolves to the
//! same node handle. The graph is only mutated by the builder in this crate.

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::model::{CategoryNode, GraphEdge, GraphNode, NodeKind, RelationKind};

/// Structural invariant violations. A graph produced by the builder never has any.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphInvariantError {
    #[error("category node {0} has outgoing edges")]
    CategoryHasOutgoing(String),
    #[error("component node {0} has incoming edges")]
    ComponentHasIncoming(String),
    #[error("self-loop on node {0}")]
    SelfLoop(String),
    #[error("edge {relation} from {source_id} targets a {actual} node")]
    WrongTargetKind {
        source_id: String,
        relation: RelationKind,
        actual: NodeKind,
    },
    #[error("component {component} has {count} {relation} edges")]
    RelationMultiplicity {
        component: String,
        relation: RelationKind,
        count: usize,
    },
    #[error("category node {id} count {count} does not match in-degree {in_degree}")]
    CountMismatch {
        id: String,
        count: usize,
        in_degree: usize,
    },
}

/// Borrowed view of one edge with resolved endpoint ids.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EdgeView<'a> {
    pub source: &'a str,
    pub target: &'a str,
    pub relation: RelationKind,
    pub weight: f64,
}

/// A component node with every edge touching it.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentDetails<'a> {
    pub node: &'a GraphNode,
    pub relationships: Vec<EdgeView<'a>>,
}

#[derive(Debug, Clone, Default)]
pub struct KnowledgeGraph {
    graph: DiGraph<GraphNode, GraphEdge>,

    /// Node id -> node index.
    id_indices: HashMap<String, NodeIndex>,

    /// (kind, normalized label) -> node index, category kinds only.
    category_indices: HashMap<(NodeKind, String), NodeIndex>,
}

impl KnowledgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn contains_component(&self, key: &str) -> bool {
        self.id_indices
            .contains_key(&NodeKind::Component.node_id(key))
    }

    pub(crate) fn add_node(&mut self, node: GraphNode) -> NodeIndex {
        let id = node.id().to_string();
        let kind = node.kind();
        let label = node.label().to_string();
        let idx = self.graph.add_node(node);
        if kind.is_category() {
            self.category_indices.insert((kind, label), idx);
        }
        self.id_indices.insert(id, idx);
        idx
    }

    /// Return the category node for `label`, creating it on first sight.
    pub(crate) fn ensure_category(&mut self, kind: NodeKind, label: &str) -> (NodeIndex, bool) {
        if let Some(&idx) = self.category_indices.get(&(kind, label.to_string())) {
            return (idx, false);
        }
        (self.add_node(GraphNode::category(kind, label)), true)
    }

    /// Link a component to a category node and bump the category's running count.
    pub(crate) fn link(
        &mut self,
        component: NodeIndex,
        category: NodeIndex,
        relation: RelationKind,
    ) -> EdgeIndex {
        if let Some(c) = self
            .graph
            .node_weight_mut(category)
            .and_then(GraphNode::as_category_mut)
        {
            c.count += 1;
        }
        self.graph
            .add_edge(component, category, GraphEdge::new(relation))
    }

    /// The underlying petgraph graph, for algorithms not wrapped here.
    pub fn inner(&self) -> &DiGraph<GraphNode, GraphEdge> {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.id_indices.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.node_index(id).and_then(|idx| self.graph.node_weight(idx))
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph.node_weights()
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeView<'_>> {
        self.graph.edge_references().map(move |e| self.edge_view(e))
    }

    fn edge_view(
        &self,
        e: petgraph::graph::EdgeReference<'_, GraphEdge>,
    ) -> EdgeView<'_> {
        EdgeView {
            source: self.graph[e.source()].id(),
            target: self.graph[e.target()].id(),
            relation: e.weight().relation,
            weight: e.weight().weight,
        }
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> Vec<&GraphNode> {
        self.graph
            .node_weights()
            .filter(|n| n.kind() == kind)
            .collect()
    }

    pub fn count_of_kind(&self, kind: NodeKind) -> usize {
        self.graph.node_weights().filter(|n| n.kind() == kind).count()
    }

    pub fn edges_of_relation(&self, relation: RelationKind) -> Vec<EdgeView<'_>> {
        self.edges().filter(|e| e.relation == relation).collect()
    }

    /// Look up a category node by kind and normalized label.
    pub fn category(&self, kind: NodeKind, label: &str) -> Option<&CategoryNode> {
        self.category_indices
            .get(&(kind, label.to_string()))
            .and_then(|&idx| self.graph.node_weight(idx))
            .and_then(GraphNode::as_category)
    }

    pub fn successors(&self, id: &str) -> Vec<&GraphNode> {
        self.neighbors(id, Direction::Outgoing)
    }

    pub fn predecessors(&self, id: &str) -> Vec<&GraphNode> {
        self.neighbors(id, Direction::Incoming)
    }

    fn neighbors(&self, id: &str, direction: Direction) -> Vec<&GraphNode> {
        let Some(idx) = self.node_index(id) else {
            return Vec::new();
        };
        // petgraph yields neighbors newest-first; restore insertion order.
        let mut out: Vec<NodeIndex> = self.graph.neighbors_directed(idx, direction).collect();
        out.reverse();
        out.into_iter().map(|n| &self.graph[n]).collect()
    }

    pub fn out_degree(&self, id: &str) -> usize {
        self.node_index(id)
            .map(|idx| self.graph.edges_directed(idx, Direction::Outgoing).count())
            .unwrap_or(0)
    }

    pub fn in_degree(&self, id: &str) -> usize {
        self.node_index(id)
            .map(|idx| self.graph.edges_directed(idx, Direction::Incoming).count())
            .unwrap_or(0)
    }

    /// Node id of the first target of `relation` leaving `id`.
    pub fn target_of(&self, id: &str, relation: RelationKind) -> Option<&GraphNode> {
        let idx = self.node_index(id)?;
        self.graph
            .edges_directed(idx, Direction::Outgoing)
            .filter(|e| e.weight().relation == relation)
            .map(|e| &self.graph[e.target()])
            .last()
    }

    /// Ids of all components that use the given normalized package label.
    pub fn components_using_package(&self, package_label: &str) -> Vec<&str> {
        let Some(&idx) = self
            .category_indices
            .get(&(NodeKind::Package, package_label.to_string()))
        else {
            return Vec::new();
        };
        let mut ids: Vec<&str> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .filter(|e| e.weight().relation == RelationKind::UsesPackage)
            .map(|e| self.graph[e.source()].id())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// A node and every relationship touching it.
    pub fn component_details(&self, id: &str) -> Option<ComponentDetails<'_>> {
        let idx = self.node_index(id)?;
        let node = &self.graph[idx];
        let relationships = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .chain(self.graph.edges_directed(idx, Direction::Incoming))
            .map(|e| self.edge_view(e))
            .collect();
        Some(ComponentDetails {
            node,
            relationships,
        })
    }

    /// Directed density: edges / (n * (n - 1)).
    pub fn density(&self) -> f64 {
        let n = self.graph.node_count();
        if n < 2 {
            return 0.0;
        }
        self.graph.edge_count() as f64 / (n as f64 * (n as f64 - 1.0))
    }

    /// Number of weakly connected components.
    pub fn weakly_connected_components(&self) -> usize {
        petgraph::algo::connected_components(&self.graph)
    }

    /// Check every structural invariant of the component graph.
    pub fn verify(&self) -> Result<(), GraphInvariantError> {
        for idx in self.graph.node_indices() {
            let node = &self.graph[idx];
            let outgoing: Vec<_> = self.graph.edges_directed(idx, Direction::Outgoing).collect();
            let in_degree = self.graph.edges_directed(idx, Direction::Incoming).count();

            match node {
                GraphNode::Category(c) => {
                    if !outgoing.is_empty() {
                        return Err(GraphInvariantError::CategoryHasOutgoing(c.id.clone()));
                    }
                    if c.count != in_degree {
                        return Err(GraphInvariantError::CountMismatch {
                            id: c.id.clone(),
                            count: c.count,
                            in_degree,
                        });
                    }
                }
                GraphNode::Component(c) => {
                    if in_degree != 0 {
                        return Err(GraphInvariantError::ComponentHasIncoming(c.id.clone()));
                    }
                    let mut per_relation: BTreeMap<RelationKind, usize> = BTreeMap::new();
                    for e in &outgoing {
                        if e.target() == idx {
                            return Err(GraphInvariantError::SelfLoop(c.id.clone()));
                        }
                        let relation = e.weight().relation;
                        let actual = self.graph[e.target()].kind();
                        if actual != relation.target_kind() {
                            return Err(GraphInvariantError::WrongTargetKind {
                                source_id: c.id.clone(),
                                relation,
                                actual,
                            });
                        }
                        *per_relation.entry(relation).or_default() += 1;
                    }
                    for (relation, count) in per_relation {
                        if count > 1 {
                            return Err(GraphInvariantError::RelationMultiplicity {
                                component: c.id.clone(),
                                relation,
                                count,
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
