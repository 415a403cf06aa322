//! GraphML export.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::export::{xml_escape as escape, ExportError};
use crate::graph::KnowledgeGraph;
use crate::layout::Layout;
use crate::model::GraphNode;

/// (id, domain, attribute name, type)
const KEYS: &[(&str, &str, &str, &str)] = &[
    ("d_kind", "node", "kind", "string"),
    ("d_label", "node", "label", "string"),
    ("d_name", "node", "name", "string"),
    ("d_count", "node", "count", "int"),
    ("d_package", "node", "package", "string"),
    ("d_function", "node", "function", "string"),
    ("d_physical", "node", "physical", "string"),
    ("d_size", "node", "size", "double"),
    ("d_x", "node", "x", "double"),
    ("d_y", "node", "y", "double"),
    ("d_relation", "edge", "relation", "string"),
    ("d_weight", "edge", "weight", "double"),
];

pub struct GraphMlExporter;

impl GraphMlExporter {
    pub fn export_file(
        graph: &KnowledgeGraph,
        layout: Option<&Layout>,
        path: &Path,
    ) -> Result<(), ExportError> {
        let mut w = BufWriter::new(File::create(path)?);
        Self::write(graph, layout, &mut w)?;
        w.flush()?;
        Ok(())
    }

    /// Coordinates are written as `x`/`y` data when a layout is given.
    pub fn write<W: Write>(
        graph: &KnowledgeGraph,
        layout: Option<&Layout>,
        w: &mut W,
    ) -> Result<(), ExportError> {
        writeln!(w, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(
            w,
            r#"<graphml xmlns="http://graphml.graphdrawing.org/xmlns" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="http://graphml.graphdrawing.org/xmlns http://graphml.graphdrawing.org/xmlns/1.0/graphml.xsd">"#
        )?;
        for (id, domain, name, ty) in KEYS {
            writeln!(
                w,
                r#"  <key id="{}" for="{}" attr.name="{}" attr.type="{}"/>"#,
                id, domain, name, ty
            )?;
        }
        writeln!(w, r#"  <graph id="pcb_knowledge_graph" edgedefault="directed">"#)?;

        for node in graph.nodes() {
            writeln!(w, r#"    <node id="{}">"#, escape(node.id()))?;
            data(w, "d_kind", node.kind().as_str())?;
            data(w, "d_label", node.label())?;
            data(w, "d_name", node.name())?;
            match node {
                GraphNode::Component(c) => {
                    data(w, "d_package", &c.component.raw_package)?;
                    data(w, "d_function", &c.component.function_descriptor)?;
                    if !c.component.physical_descriptor.is_empty() {
                        data(w, "d_physical", &c.component.physical_descriptor)?;
                    }
                    data(w, "d_size", &c.component.display_size().to_string())?;
                }
                GraphNode::Category(c) => {
                    data(w, "d_count", &c.count.to_string())?;
                }
            }
            if let Some(p) = layout.and_then(|l| l.position(node.id())) {
                data(w, "d_x", &p.x.to_string())?;
                data(w, "d_y", &p.y.to_string())?;
            }
            writeln!(w, "    </node>")?;
        }

        for (i, edge) in graph.edges().enumerate() {
            writeln!(
                w,
                r#"    <edge id="e{}" source="{}" target="{}">"#,
                i,
                escape(edge.source),
                escape(edge.target)
            )?;
            data(w, "d_relation", edge.relation.as_str())?;
            data(w, "d_weight", &edge.weight.to_string())?;
            writeln!(w, "    </edge>")?;
        }

        writeln!(w, "  </graph>")?;
        writeln!(w, "</graphml>")?;
        Ok(())
    }
}

fn data<W: Write>(w: &mut W, key: &str, value: &str) -> std::io::Result<()> {
    writeln!(w, r#"      <data key="{}">{}</data>"#, key, escape(value))
}
