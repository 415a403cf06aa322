//! Node and edge types of the component knowledge graph.
//!
//! The graph has four node kinds and three relation kinds. Every relation
//! starts at a Component and ends at exactly one category kind, so the
//! relation kind alone determines the kind of its target.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Component display labels are cut to this many characters.
pub const DEFAULT_LABEL_LEN: usize = 15;

/// Kind of a graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    Component,
    Package,
    FunctionClass,
    PhysicalClass,
}

impl NodeKind {
    pub const ALL: [NodeKind; 4] = [
        NodeKind::Component,
        NodeKind::Package,
        NodeKind::FunctionClass,
        NodeKind::PhysicalClass,
    ];

    /// The three aggregation kinds, in their default precedence.
    pub const CATEGORIES: [NodeKind; 3] = [
        NodeKind::Package,
        NodeKind::FunctionClass,
        NodeKind::PhysicalClass,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Component => "Component",
            NodeKind::Package => "Package",
            NodeKind::FunctionClass => "FunctionClass",
            NodeKind::PhysicalClass => "PhysicalClass",
        }
    }

    /// Prefix used when deriving node ids, so identities never collide across kinds.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            NodeKind::Component => "COMP",
            NodeKind::Package => "PKG",
            NodeKind::FunctionClass => "FUNC",
            NodeKind::PhysicalClass => "PHY",
        }
    }

    pub fn is_category(&self) -> bool {
        !matches!(self, NodeKind::Component)
    }

    /// The relation that links a component to a node of this kind.
    pub fn relation(&self) -> Option<RelationKind> {
        match self {
            NodeKind::Component => None,
            NodeKind::Package => Some(RelationKind::UsesPackage),
            NodeKind::FunctionClass => Some(RelationKind::HasFunction),
            NodeKind::PhysicalClass => Some(RelationKind::HasPhysicalType),
        }
    }

    /// Build the node id for an identity key of this kind.
    pub fn node_id(&self, key: &str) -> String {
        format!("{}_{}", self.id_prefix(), key)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a graph edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RelationKind {
    #[serde(rename = "usesPackage")]
    UsesPackage,
    #[serde(rename = "hasFunction")]
    HasFunction,
    #[serde(rename = "hasPhysicalType")]
    HasPhysicalType,
}

impl RelationKind {
    pub const ALL: [RelationKind; 3] = [
        RelationKind::UsesPackage,
        RelationKind::HasFunction,
        RelationKind::HasPhysicalType,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::UsesPackage => "usesPackage",
            RelationKind::HasFunction => "hasFunction",
            RelationKind::HasPhysicalType => "hasPhysicalType",
        }
    }

    /// Kind every edge of this relation must point at.
    pub fn target_kind(&self) -> NodeKind {
        match self {
            RelationKind::UsesPackage => NodeKind::Package,
            RelationKind::HasFunction => NodeKind::FunctionClass,
            RelationKind::HasPhysicalType => NodeKind::PhysicalClass,
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw component record as delivered by a record source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub package: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default)]
    pub function_descriptor: String,
    /// Physical form as named by the source; blank means derive it from the package.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub physical_descriptor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_name: Option<String>,
}

impl ComponentRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    pub fn with_function(mut self, descriptor: impl Into<String>) -> Self {
        self.function_descriptor = descriptor.into();
        self
    }

    pub fn with_physical(mut self, descriptor: impl Into<String>) -> Self {
        self.physical_descriptor = descriptor.into();
        self
    }

    pub fn with_dimensions(mut self, length: f64, width: f64, height: f64) -> Self {
        self.length = Some(length);
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    pub fn with_part_number(mut self, part_number: impl Into<String>) -> Self {
        self.part_number = Some(part_number.into());
        self
    }
}

/// Physical outline of a component in millimetres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// An accepted component. Immutable once the builder has created it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Record id as supplied by the source (not the node id).
    pub key: String,
    pub name: String,
    /// Raw package string before normalization.
    pub raw_package: String,
    pub function_descriptor: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub physical_descriptor: String,
    pub dimensions: Dimensions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library_name: Option<String>,
}

impl Component {
    /// Display size used by renderers, grows with the part length.
    pub fn display_size(&self) -> f64 {
        20.0 + self.dimensions.length.unwrap_or(0.0) * 5.0
    }
}

/// Node payload stored in the graph.
///
/// Serialized flat with `kind` set to the node's [`NodeKind`], so category
/// nodes read `"kind": "Package"` rather than naming the Rust variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "NodeRecord", try_from = "NodeRecord")]
pub enum GraphNode {
    Component(ComponentNode),
    Category(CategoryNode),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentNode {
    pub id: String,
    pub label: String,
    pub component: Component,
}

/// A Package, FunctionClass or PhysicalClass node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryNode {
    pub id: String,
    pub category: NodeKind,
    pub label: String,
    /// Number of components linked to this node.
    pub count: usize,
}

impl GraphNode {
    pub fn component(component: Component, label_len: usize) -> Self {
        GraphNode::Component(ComponentNode {
            id: NodeKind::Component.node_id(&component.key),
            label: truncate_label(&component.name, label_len),
            component,
        })
    }

    pub fn category(kind: NodeKind, label: impl Into<String>) -> Self {
        let label = label.into();
        GraphNode::Category(CategoryNode {
            id: kind.node_id(&label),
            category: kind,
            label,
            count: 0,
        })
    }

    pub fn id(&self) -> &str {
        match self {
            GraphNode::Component(c) => &c.id,
            GraphNode::Category(c) => &c.id,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            GraphNode::Component(_) => NodeKind::Component,
            GraphNode::Category(c) => c.category,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            GraphNode::Component(c) => &c.label,
            GraphNode::Category(c) => &c.label,
        }
    }

    /// Full name: the component name, or the category label.
    pub fn name(&self) -> &str {
        match self {
            GraphNode::Component(c) => &c.component.name,
            GraphNode::Category(c) => &c.label,
        }
    }

    pub fn is_component(&self) -> bool {
        matches!(self, GraphNode::Component(_))
    }

    pub fn as_component(&self) -> Option<&ComponentNode> {
        match self {
            GraphNode::Component(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_category(&self) -> Option<&CategoryNode> {
        match self {
            GraphNode::Category(c) => Some(c),
            _ => None,
        }
    }

    pub(crate) fn as_category_mut(&mut self) -> Option<&mut CategoryNode> {
        match self {
            GraphNode::Category(c) => Some(c),
            _ => None,
        }
    }
}

/// Serialized shape of a [`GraphNode`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct NodeRecord {
    kind: NodeKind,
    id: String,
    label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    component: Option<Component>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
}

impl From<GraphNode> for NodeRecord {
    fn from(node: GraphNode) -> Self {
        match node {
            GraphNode::Component(c) => NodeRecord {
                kind: NodeKind::Component,
                id: c.id,
                label: c.label,
                component: Some(c.component),
                count: None,
            },
            GraphNode::Category(c) => NodeRecord {
                kind: c.category,
                id: c.id,
                label: c.label,
                component: None,
                count: Some(c.count),
            },
        }
    }
}

impl TryFrom<NodeRecord> for GraphNode {
    type Error = String;

    fn try_from(record: NodeRecord) -> Result<Self, Self::Error> {
        match (record.kind, record.component) {
            (NodeKind::Component, Some(component)) => Ok(GraphNode::Component(ComponentNode {
                id: record.id,
                label: record.label,
                component,
            })),
            (NodeKind::Component, None) => {
                Err(format!("component node {} has no component payload", record.id))
            }
            (kind, _) => Ok(GraphNode::Category(CategoryNode {
                id: record.id,
                category: kind,
                label: record.label,
                count: record.count.unwrap_or(0),
            })),
        }
    }
}

/// Edge payload stored in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub relation: RelationKind,
    pub weight: f64,
}

impl GraphEdge {
    pub fn new(relation: RelationKind) -> Self {
        Self {
            relation,
            weight: 1.0,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

/// Truncate to `max_chars` characters (not bytes).
pub fn truncate_label(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
