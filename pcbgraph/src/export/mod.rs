//! Exporters
//!
//! Serialize a finished graph (and optionally its layout) for graph
//! databases and viewers. Exporters only read the graph.
//!
//! Files written by [`export_all`]:
//! - `nodes.csv`, `edges.csv` (UTF-8 with BOM, for spreadsheet and Neo4j import)
//! - one `knowledge_graph.*` file per selected [`GraphFormat`]
//!   (`.graphml` for yEd, `.gml`, `.gexf` for Gephi)
//! - `knowledge_graph.json`, `layout.json`

pub mod csv;
pub mod gexf;
pub mod gml;
pub mod graphml;
pub mod json;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::graph::KnowledgeGraph;
use crate::layout::Layout;
use crate::model::GraphNode;

pub use self::csv::CsvExporter;
pub use self::gexf::GexfExporter;
pub use self::gml::GmlExporter;
pub use self::graphml::GraphMlExporter;
pub use self::json::JsonExporter;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Paths written by an export run, keyed by artifact name.
pub type ExportedFiles = BTreeMap<String, PathBuf>;

/// Interchange formats for graph viewers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphFormat {
    GraphMl,
    Gml,
    Gexf,
}

impl GraphFormat {
    pub const ALL: [GraphFormat; 3] = [GraphFormat::GraphMl, GraphFormat::Gml, GraphFormat::Gexf];

    pub fn as_str(&self) -> &'static str {
        match self {
            GraphFormat::GraphMl => "graphml",
            GraphFormat::Gml => "gml",
            GraphFormat::Gexf => "gexf",
        }
    }

    pub fn file_name(&self) -> String {
        format!("knowledge_graph.{}", self.as_str())
    }

    pub fn export_file(
        &self,
        graph: &KnowledgeGraph,
        layout: Option<&Layout>,
        path: &Path,
    ) -> Result<(), ExportError> {
        match self {
            GraphFormat::GraphMl => GraphMlExporter::export_file(graph, layout, path),
            GraphFormat::Gml => GmlExporter::export_file(graph, layout, path),
            GraphFormat::Gexf => GexfExporter::export_file(graph, layout, path),
        }
    }
}

impl fmt::Display for GraphFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GraphFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "graphml" => Ok(GraphFormat::GraphMl),
            "gml" => Ok(GraphFormat::Gml),
            "gexf" => Ok(GraphFormat::Gexf),
            other => Err(format!("unknown graph format: {}", other)),
        }
    }
}

/// Write CSV and JSON plus each of `formats` into `output_dir`, creating it if needed.
pub fn export_all(
    graph: &KnowledgeGraph,
    layout: Option<&Layout>,
    formats: &[GraphFormat],
    output_dir: &Path,
) -> Result<ExportedFiles, ExportError> {
    std::fs::create_dir_all(output_dir)?;
    let mut files = ExportedFiles::new();

    let (nodes, edges) = CsvExporter::export(graph, output_dir)?;
    files.insert("nodes_csv".to_string(), nodes);
    files.insert("edges_csv".to_string(), edges);

    for format in formats {
        let path = output_dir.join(format.file_name());
        format.export_file(graph, layout, &path)?;
        files.insert(format.as_str().to_string(), path);
    }

    let graph_json = output_dir.join("knowledge_graph.json");
    JsonExporter::export_graph_file(graph, &graph_json)?;
    files.insert("graph_json".to_string(), graph_json);

    if let Some(layout) = layout {
        let layout_json = output_dir.join("layout.json");
        JsonExporter::export_layout_file(layout, &layout_json)?;
        files.insert("layout_json".to_string(), layout_json);
    }

    for path in files.values() {
        tracing::info!("Exported {}", path.display());
    }
    Ok(files)
}

/// Escape text for XML attribute values and character data.
pub(crate) fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Kind-specific attributes of a node beyond id, name, kind and label.
pub(crate) fn node_properties(node: &GraphNode) -> Map<String, Value> {
    let mut props = Map::new();
    match node {
        GraphNode::Component(c) => {
            let comp = &c.component;
            props.insert("package".into(), json!(comp.raw_package));
            props.insert("function".into(), json!(comp.function_descriptor));
            if !comp.physical_descriptor.is_empty() {
                props.insert("physical".into(), json!(comp.physical_descriptor));
            }
            if let Some(v) = comp.dimensions.length {
                props.insert("length".into(), json!(v));
            }
            if let Some(v) = comp.dimensions.width {
                props.insert("width".into(), json!(v));
            }
            if let Some(v) = comp.dimensions.height {
                props.insert("height".into(), json!(v));
            }
            if let Some(v) = &comp.manufacturer {
                props.insert("manufacturer".into(), json!(v));
            }
            if let Some(v) = &comp.part_number {
                props.insert("part_number".into(), json!(v));
            }
            if let Some(v) = &comp.library_name {
                props.insert("library_name".into(), json!(v));
            }
            props.insert("size".into(), json!(comp.display_size()));
        }
        GraphNode::Category(c) => {
            props.insert("count".into(), json!(c.count));
        }
    }
    props
}
