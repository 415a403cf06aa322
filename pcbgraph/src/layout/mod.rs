//! Layout Engines Module
//!
//! Computes 2-D coordinates for every node of a [`KnowledgeGraph`]. Each
//! engine implements the [`LayoutEngine`] trait and is a pure function of
//! the graph and its settings: the graph is never mutated and the same
//! inputs always produce the same coordinates.
//!
//! Available engines:
//! - Hierarchical: one ring (or column) per node kind
//! - Spring: seeded Fruchterman-Reingold simulation with a fixed budget
//! - Radial: anchor categories on an outer ring, members in their sectors

pub mod hierarchical;
pub mod radial;
pub(crate) mod rng;
pub mod spring;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::graph::KnowledgeGraph;
use crate::model::NodeKind;

pub use hierarchical::{HierarchicalConfig, HierarchicalLayout, LayerShape};
pub use radial::{CategorySpacing, RadialConfig, RadialLayout};
pub use spring::{SpringConfig, SpringLayout};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("Invalid layout configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point at `radius` from the origin in direction `angle` (radians).
    pub fn polar(radius: f64, angle: f64) -> Self {
        Self {
            x: radius * angle.cos(),
            y: radius * angle.sin(),
        }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Which ring, row or column a node kind was placed on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerInfo {
    /// 0 is innermost.
    pub index: usize,
    /// Ring radius for circular placements.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    /// Second, smaller ring used by part of the layer (radial orphans).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_radius: Option<f64>,
}

impl LayerInfo {
    pub fn new(index: usize, radius: Option<f64>) -> Self {
        Self {
            index,
            radius,
            inner_radius: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutAlgorithm {
    #[default]
    Hierarchical,
    Spring,
    Radial,
}

impl LayoutAlgorithm {
    pub const ALL: [LayoutAlgorithm; 3] = [
        LayoutAlgorithm::Hierarchical,
        LayoutAlgorithm::Spring,
        LayoutAlgorithm::Radial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutAlgorithm::Hierarchical => "hierarchical",
            LayoutAlgorithm::Spring => "spring",
            LayoutAlgorithm::Radial => "radial",
        }
    }
}

impl fmt::Display for LayoutAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutAlgorithm {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hierarchical" => Ok(LayoutAlgorithm::Hierarchical),
            "spring" | "force" => Ok(LayoutAlgorithm::Spring),
            "radial" => Ok(LayoutAlgorithm::Radial),
            other => Err(LayoutError::InvalidConfig(format!(
                "unknown layout algorithm '{}'",
                other
            ))),
        }
    }
}

/// Coordinates for every node plus the layer assignment that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub algorithm: LayoutAlgorithm,
    pub positions: BTreeMap<String, Point>,
    pub layers: BTreeMap<NodeKind, LayerInfo>,
    /// Iterations actually run, for iterative engines.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iterations: Option<usize>,
    /// False only when an iterative engine stopped on its budget.
    pub converged: bool,
}

impl Layout {
    pub fn new(algorithm: LayoutAlgorithm) -> Self {
        Self {
            algorithm,
            positions: BTreeMap::new(),
            layers: BTreeMap::new(),
            iterations: None,
            converged: true,
        }
    }

    pub fn position(&self, id: &str) -> Option<Point> {
        self.positions.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Smallest distance between two distinct nodes, if there are at least two.
    pub fn min_distance(&self) -> Option<f64> {
        let points: Vec<Point> = self.positions.values().copied().collect();
        let mut best: Option<f64> = None;
        for i in 0..points.len() {
            for j in (i + 1)..points.len() {
                let d = points[i].distance(&points[j]);
                best = Some(best.map_or(d, |b| b.min(d)));
            }
        }
        best
    }

    /// Axis-aligned bounding box as (min, max).
    pub fn bounds(&self) -> Option<(Point, Point)> {
        let mut it = self.positions.values();
        let first = *it.next()?;
        Some(it.fold((first, first), |(lo, hi), p| {
            (
                Point::new(lo.x.min(p.x), lo.y.min(p.y)),
                Point::new(hi.x.max(p.x), hi.y.max(p.y)),
            )
        }))
    }
}

/// A layout strategy over a finished graph.
pub trait LayoutEngine {
    /// The algorithm this engine implements
    fn algorithm(&self) -> LayoutAlgorithm;

    /// Compute coordinates for every node of `graph`
    fn layout(&self, graph: &KnowledgeGraph) -> Layout;
}

/// Per-engine settings, as loaded from configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    pub hierarchical: HierarchicalConfig,
    pub spring: SpringConfig,
    pub radial: RadialConfig,
}

impl LayoutSettings {
    pub fn validate(&self) -> Result<(), LayoutError> {
        self.hierarchical.validate()?;
        self.spring.validate()?;
        self.radial.validate()?;
        Ok(())
    }

    /// Construct the engine for `algorithm` from these settings.
    pub fn engine(&self, algorithm: LayoutAlgorithm) -> Result<Box<dyn LayoutEngine>, LayoutError> {
        Ok(match algorithm {
            LayoutAlgorithm::Hierarchical => {
                Box::new(HierarchicalLayout::new(self.hierarchical.clone())?)
            }
            LayoutAlgorithm::Spring => Box::new(SpringLayout::new(self.spring.clone())?),
            LayoutAlgorithm::Radial => Box::new(RadialLayout::new(self.radial.clone())?),
        })
    }
}

/// Lay out `graph` with the selected algorithm.
pub fn compute_layout(
    graph: &KnowledgeGraph,
    algorithm: LayoutAlgorithm,
    settings: &LayoutSettings,
) -> Result<Layout, LayoutError> {
    let engine = settings.engine(algorithm)?;
    tracing::info!(
        "Computing {} layout for {} nodes",
        algorithm,
        graph.node_count()
    );
    Ok(engine.layout(graph))
}

pub(crate) fn check_positive(name: &str, value: f64) -> Result<(), LayoutError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LayoutError::InvalidConfig(format!(
            "{} must be a positive number, got {}",
            name, value
        )))
    }
}

/// Nodes of one kind sorted by (label, id), the stable in-layer order.
pub(crate) fn sorted_nodes_of_kind<'a>(
    graph: &'a KnowledgeGraph,
    kind: NodeKind,
) -> Vec<&'a crate::model::GraphNode> {
    let mut nodes = graph.nodes_of_kind(kind);
    nodes.sort_by(|a, b| a.label().cmp(b.label()).then_with(|| a.id().cmp(b.id())));
    nodes
}
