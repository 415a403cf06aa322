//! JSON export of the graph and of a computed layout.

use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::export::ExportError;
use crate::graph::{EdgeView, KnowledgeGraph};
use crate::layout::Layout;
use crate::model::GraphNode;

/// Document written to `knowledge_graph.json`.
#[derive(Debug, Serialize)]
pub struct GraphDocument<'a> {
    pub nodes: Vec<&'a GraphNode>,
    pub edges: Vec<EdgeView<'a>>,
}

impl<'a> GraphDocument<'a> {
    pub fn from_graph(graph: &'a KnowledgeGraph) -> Self {
        Self {
            nodes: graph.nodes().collect(),
            edges: graph.edges().collect(),
        }
    }
}

pub struct JsonExporter;

impl JsonExporter {
    pub fn export_graph_file(graph: &KnowledgeGraph, path: &Path) -> Result<(), ExportError> {
        write_pretty(path, &GraphDocument::from_graph(graph))
    }

    pub fn export_layout_file(layout: &Layout, path: &Path) -> Result<(), ExportError> {
        write_pretty(path, layout)
    }

    pub fn graph_to_string(graph: &KnowledgeGraph) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(&GraphDocument::from_graph(graph))?)
    }
}

fn write_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ExportError> {
    let mut w = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut w, value)?;
    w.flush()?;
    Ok(())
}
