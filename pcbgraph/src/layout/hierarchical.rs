//! Hierarchical layout: one layer per node kind.
//!
//! Components form the outermost layer. The category kinds sit on
//! progressively inner layers in the configured precedence, so with the
//! default order Package is just inside the components and PhysicalClass is
//! innermost. Within a layer nodes are ordered by (label, id).

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::graph::KnowledgeGraph;
use crate::layout::{
    check_positive, sorted_nodes_of_kind, LayerInfo, Layout, LayoutAlgorithm, LayoutEngine,
    LayoutError, Point,
};
use crate::model::NodeKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerShape {
    /// Concentric circles around the origin.
    #[default]
    Rings,
    /// Vertical columns, innermost layer leftmost.
    Columns,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchicalConfig {
    /// Category kinds from the outermost (next to the components) inwards.
    pub precedence: Vec<NodeKind>,
    pub shape: LayerShape,
    /// Radius of the innermost ring.
    pub base_radius: f64,
    /// Distance between consecutive rings or columns.
    pub layer_spacing: f64,
    /// Vertical distance between nodes of a column.
    pub node_spacing: f64,
}

impl Default for HierarchicalConfig {
    fn default() -> Self {
        Self {
            precedence: NodeKind::CATEGORIES.to_vec(),
            shape: LayerShape::Rings,
            base_radius: 2.0,
            layer_spacing: 4.0,
            node_spacing: 1.8,
        }
    }
}

impl HierarchicalConfig {
    pub fn validate(&self) -> Result<(), LayoutError> {
        let is_permutation = self.precedence.len() == NodeKind::CATEGORIES.len()
            && NodeKind::CATEGORIES
                .iter()
                .all(|k| self.precedence.contains(k));
        if !is_permutation {
            return Err(LayoutError::InvalidConfig(format!(
                "hierarchical precedence must list Package, FunctionClass and PhysicalClass once each, got {:?}",
                self.precedence
            )));
        }
        check_positive("hierarchical.base_radius", self.base_radius)?;
        check_positive("hierarchical.layer_spacing", self.layer_spacing)?;
        check_positive("hierarchical.node_spacing", self.node_spacing)?;
        Ok(())
    }

    /// Layer index of each kind, 0 innermost.
    pub fn layer_of(&self, kind: NodeKind) -> usize {
        let categories = self.precedence.len();
        match kind {
            NodeKind::Component => categories,
            other => self
                .precedence
                .iter()
                .position(|k| *k == other)
                .map(|i| categories - 1 - i)
                .unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HierarchicalLayout {
    config: HierarchicalConfig,
}

impl HierarchicalLayout {
    pub fn new(config: HierarchicalConfig) -> Result<Self, LayoutError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &HierarchicalConfig {
        &self.config
    }
}

impl LayoutEngine for HierarchicalLayout {
    fn algorithm(&self) -> LayoutAlgorithm {
        LayoutAlgorithm::Hierarchical
    }

    fn layout(&self, graph: &KnowledgeGraph) -> Layout {
        let mut layout = Layout::new(LayoutAlgorithm::Hierarchical);

        for kind in NodeKind::ALL {
            let index = self.config.layer_of(kind);
            let nodes = sorted_nodes_of_kind(graph, kind);

            let radius = match self.config.shape {
                LayerShape::Rings => {
                    let r = self.config.base_radius + index as f64 * self.config.layer_spacing;
                    let n = nodes.len() as f64;
                    for (i, node) in nodes.iter().enumerate() {
                        let angle = TAU * i as f64 / n;
                        layout
                            .positions
                            .insert(node.id().to_string(), Point::polar(r, angle));
                    }
                    Some(r)
                }
                LayerShape::Columns => {
                    let x = index as f64 * self.config.layer_spacing;
                    let n = nodes.len() as f64;
                    for (i, node) in nodes.iter().enumerate() {
                        let y = (i as f64 - n / 2.0 + 0.5) * self.config.node_spacing;
                        layout.positions.insert(node.id().to_string(), Point::new(x, y));
                    }
                    None
                }
            };

            layout.layers.insert(kind, LayerInfo::new(index, radius));
        }

        layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build;
    use crate::model::ComponentRecord;

    fn records() -> Vec<ComponentRecord> {
        vec![
            ComponentRecord::new("3", "R3").with_package("0603").with_function("resistor"),
            ComponentRecord::new("1", "R1").with_package("0603").with_function("resistor"),
            ComponentRecord::new("2", "C1").with_package("0805").with_function("capacitor"),
            ComponentRecord::new("4", "D1").with_package("DIP-8").with_function("diode"),
        ]
    }

    #[test]
    fn default_layers_put_components_outermost() {
        let config = HierarchicalConfig::default();
        assert_eq!(config.layer_of(NodeKind::Component), 3);
        assert_eq!(config.layer_of(NodeKind::Package), 2);
        assert_eq!(config.layer_of(NodeKind::FunctionClass), 1);
        assert_eq!(config.layer_of(NodeKind::PhysicalClass), 0);
    }

    #[test]
    fn nodes_sit_on_their_ring() {
        let graph = build(&records()).graph;
        let layout = HierarchicalLayout::default().layout(&graph);
        assert_eq!(layout.len(), graph.node_count());

        for node in graph.nodes() {
            let info = layout.layers[&node.kind()];
            let r = info.radius.unwrap();
            let p = layout.position(node.id()).unwrap();
            assert!((p.distance(&Point::default()) - r).abs() < 1e-9);
        }
        let component = layout.layers[&NodeKind::Component].radius;
        assert!(component > layout.layers[&NodeKind::Package].radius);
    }

    #[test]
    fn in_layer_order_is_label_then_id() {
        let graph = build(&records()).graph;
        let layout = HierarchicalLayout::default().layout(&graph);
        // Components sorted by label: C1, D1, R1, R3 -> angle 0 is C1.
        let c1 = layout.position("COMP_2").unwrap();
        assert!(c1.y.abs() < 1e-9 && c1.x > 0.0);

        let again = HierarchicalLayout::default().layout(&graph);
        assert_eq!(layout, again);
    }

    #[test]
    fn input_order_does_not_move_nodes() {
        let mut reversed = records();
        reversed.reverse();
        let a = HierarchicalLayout::default().layout(&build(&records()).graph);
        let b = HierarchicalLayout::default().layout(&build(&reversed).graph);
        assert_eq!(a.positions, b.positions);
    }

    #[test]
    fn columns_follow_precedence() {
        let config = HierarchicalConfig {
            shape: LayerShape::Columns,
            precedence: vec![
                NodeKind::PhysicalClass,
                NodeKind::FunctionClass,
                NodeKind::Package,
            ],
            ..Default::default()
        };
        let graph = build(&records()).graph;
        let layout = HierarchicalLayout::new(config).unwrap().layout(&graph);

        assert_eq!(layout.layers[&NodeKind::Package].index, 0);
        assert_eq!(layout.layers[&NodeKind::Package].radius, None);
        assert_eq!(layout.position("PKG_0603").unwrap().x, 0.0);
        assert_eq!(layout.position("PHY_SurfaceMount").unwrap().x, 8.0);
        assert_eq!(layout.position("COMP_1").unwrap().x, 12.0);
    }

    #[test]
    fn precedence_must_be_a_permutation() {
        let config = HierarchicalConfig {
            precedence: vec![NodeKind::Package, NodeKind::Package, NodeKind::PhysicalClass],
            ..Default::default()
        };
        assert!(HierarchicalLayout::new(config).is_err());

        let config = HierarchicalConfig {
            precedence: vec![NodeKind::Component, NodeKind::Package, NodeKind::PhysicalClass],
            ..Default::default()
        };
        assert!(HierarchicalLayout::new(config).is_err());
    }

    #[test]
    fn non_positive_spacing_is_rejected() {
        let config = HierarchicalConfig {
            layer_spacing: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
