//! Radial layout.
//!
//! Categories of the anchor kind sit on the outer ring. Each anchor owns a
//! contiguous sector of the member ring whose width is proportional to its
//! number of components, and its components are spread evenly inside it.
//! Components without an anchor edge go on a smaller inner circle; the
//! remaining category kinds get rings of their own outside the anchors.

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::graph::KnowledgeGraph;
use crate::layout::{
    check_positive, sorted_nodes_of_kind, LayerInfo, Layout, LayoutAlgorithm, LayoutEngine,
    LayoutError, Point,
};
use crate::model::{GraphNode, NodeKind};

/// Where an anchor sits on the outer ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategorySpacing {
    /// Equal angular spacing regardless of sector size.
    #[default]
    Equal,
    /// At the middle of the anchor's own sector.
    ArcCenter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadialConfig {
    pub anchor: NodeKind,
    pub category_spacing: CategorySpacing,
    /// Angle of the first sector, in radians.
    pub start_angle: f64,
    pub anchor_radius: f64,
    pub member_radius: f64,
    /// Circle for components without an anchor edge.
    pub orphan_radius: f64,
    /// Gap between the anchor ring and each further category ring.
    pub ring_spacing: f64,
}

impl Default for RadialConfig {
    fn default() -> Self {
        Self {
            anchor: NodeKind::FunctionClass,
            category_spacing: CategorySpacing::Equal,
            start_angle: 0.0,
            anchor_radius: 10.0,
            member_radius: 6.0,
            orphan_radius: 3.0,
            ring_spacing: 3.0,
        }
    }
}

impl RadialConfig {
    pub fn validate(&self) -> Result<(), LayoutError> {
        if !self.anchor.is_category() {
            return Err(LayoutError::InvalidConfig(format!(
                "radial anchor must be a category kind, got {}",
                self.anchor
            )));
        }
        if !self.start_angle.is_finite() {
            return Err(LayoutError::InvalidConfig(
                "radial.start_angle must be finite".into(),
            ));
        }
        check_positive("radial.anchor_radius", self.anchor_radius)?;
        check_positive("radial.member_radius", self.member_radius)?;
        check_positive("radial.orphan_radius", self.orphan_radius)?;
        check_positive("radial.ring_spacing", self.ring_spacing)?;
        if !(self.orphan_radius < self.member_radius && self.member_radius < self.anchor_radius) {
            return Err(LayoutError::InvalidConfig(
                "radial radii must satisfy orphan_radius < member_radius < anchor_radius".into(),
            ));
        }
        Ok(())
    }
}

/// The arc of the member ring reserved for one anchor category.
#[derive(Debug, Clone, PartialEq)]
pub struct Sector {
    pub anchor_id: String,
    /// Start angle in radians.
    pub start: f64,
    /// Angular width in radians.
    pub width: f64,
    /// Member component ids in placement order.
    pub members: Vec<String>,
}

impl Sector {
    /// True when `angle` lies in [start, start + width], allowing for float error.
    pub fn contains(&self, angle: f64) -> bool {
        let rel = (angle - self.start).rem_euclid(TAU);
        rel <= self.width + 1e-9 || (self.width >= TAU - 1e-9)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RadialLayout {
    config: RadialConfig,
}

impl RadialLayout {
    pub fn new(config: RadialConfig) -> Result<Self, LayoutError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RadialConfig {
        &self.config
    }

    /// Partition the member ring among the anchor categories.
    pub fn sectors(&self, graph: &KnowledgeGraph) -> Vec<Sector> {
        let anchors = sorted_nodes_of_kind(graph, self.config.anchor);
        let grouped: Vec<(&GraphNode, Vec<&GraphNode>)> = anchors
            .into_iter()
            .map(|anchor| {
                let mut members: Vec<&GraphNode> = graph
                    .predecessors(anchor.id())
                    .into_iter()
                    .filter(|n| n.is_component())
                    .collect();
                members.sort_by(|a, b| a.label().cmp(b.label()).then_with(|| a.id().cmp(b.id())));
                (anchor, members)
            })
            .collect();

        // Components without an anchor still count, leaving their share of the ring empty.
        let total = graph.count_of_kind(NodeKind::Component);
        let mut start = self.config.start_angle;
        let mut sectors = Vec::with_capacity(grouped.len());
        for (anchor, members) in grouped {
            let width = if total == 0 {
                0.0
            } else {
                TAU * members.len() as f64 / total as f64
            };
            sectors.push(Sector {
                anchor_id: anchor.id().to_string(),
                start,
                width,
                members: members.iter().map(|m| m.id().to_string()).collect(),
            });
            start += width;
        }
        sectors
    }
}

fn place_on_circle(layout: &mut Layout, nodes: &[&GraphNode], radius: f64, start: f64) {
    let n = nodes.len() as f64;
    for (i, node) in nodes.iter().enumerate() {
        let angle = start + TAU * i as f64 / n;
        layout
            .positions
            .insert(node.id().to_string(), Point::polar(radius, angle));
    }
}

impl LayoutEngine for RadialLayout {
    fn algorithm(&self) -> LayoutAlgorithm {
        LayoutAlgorithm::Radial
    }

    fn layout(&self, graph: &KnowledgeGraph) -> Layout {
        let config = &self.config;
        let mut layout = Layout::new(LayoutAlgorithm::Radial);
        let sectors = self.sectors(graph);
        let anchor_count = sectors.len() as f64;

        for (i, sector) in sectors.iter().enumerate() {
            let anchor_angle = match config.category_spacing {
                CategorySpacing::Equal => config.start_angle + TAU * i as f64 / anchor_count,
                CategorySpacing::ArcCenter => sector.start + sector.width / 2.0,
            };
            layout.positions.insert(
                sector.anchor_id.clone(),
                Point::polar(config.anchor_radius, anchor_angle),
            );

            let k = sector.members.len() as f64;
            for (j, member) in sector.members.iter().enumerate() {
                let angle = sector.start + sector.width * (j as f64 + 0.5) / k;
                layout
                    .positions
                    .insert(member.clone(), Point::polar(config.member_radius, angle));
            }
        }

        let orphans: Vec<&GraphNode> = sorted_nodes_of_kind(graph, NodeKind::Component)
            .into_iter()
            .filter(|n| !layout.positions.contains_key(n.id()))
            .collect();
        if !orphans.is_empty() {
            tracing::debug!(
                "Radial layout: {} components without a {} edge",
                orphans.len(),
                config.anchor
            );
        }
        place_on_circle(&mut layout, &orphans, config.orphan_radius, config.start_angle);

        let mut components = LayerInfo::new(0, Some(config.member_radius));
        if !orphans.is_empty() {
            components.inner_radius = Some(config.orphan_radius);
        }
        layout.layers.insert(NodeKind::Component, components);
        layout
            .layers
            .insert(config.anchor, LayerInfo::new(1, Some(config.anchor_radius)));

        let others = NodeKind::CATEGORIES
            .into_iter()
            .filter(|k| *k != config.anchor);
        for (ring, kind) in others.enumerate() {
            let radius = config.anchor_radius + (ring + 1) as f64 * config.ring_spacing;
            let nodes = sorted_nodes_of_kind(graph, kind);
            place_on_circle(&mut layout, &nodes, radius, config.start_angle);
            layout
                .layers
                .insert(kind, LayerInfo::new(ring + 2, Some(radius)));
        }

        layout
    }
}
