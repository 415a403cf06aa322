//! GEXF 1.2 export with node attributes and optional `viz` positions.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::export::{xml_escape as escape, ExportError};
use crate::graph::KnowledgeGraph;
use crate::layout::Layout;
use crate::model::GraphNode;

/// (id, title, type)
const NODE_ATTRIBUTES: &[(&str, &str, &str)] = &[
    ("0", "kind", "string"),
    ("1", "name", "string"),
    ("2", "count", "integer"),
    ("3", "package", "string"),
    ("4", "function", "string"),
    ("5", "physical", "string"),
];

const EDGE_ATTRIBUTES: &[(&str, &str, &str)] = &[("0", "relation", "string")];

pub struct GexfExporter;

impl GexfExporter {
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

    pub fn write<W: Write>(
        graph: &KnowledgeGraph,
        layout: Option<&Layout>,
        w: &mut W,
    ) -> Result<(), ExportError> {
        writeln!(w, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(
            w,
            r#"<gexf xmlns="http://www.gexf.net/1.2draft" xmlns:viz="http://www.gexf.net/1.2draft/viz" version="1.2">"#
        )?;
        writeln!(w, "  <meta>")?;
        writeln!(w, "    <creator>pcbgraph {}</creator>", env!("CARGO_PKG_VERSION"))?;
        writeln!(w, "    <description>PCB component knowledge graph</description>")?;
        writeln!(w, "  </meta>")?;
        writeln!(w, r#"  <graph mode="static" defaultedgetype="directed">"#)?;
        attributes(w, "node", NODE_ATTRIBUTES)?;
        attributes(w, "edge", EDGE_ATTRIBUTES)?;

        writeln!(w, "    <nodes>")?;
        for node in graph.nodes() {
            writeln!(
                w,
                r#"      <node id="{}" label="{}">"#,
                escape(node.id()),
                escape(node.label())
            )?;
            writeln!(w, "        <attvalues>")?;
            attvalue(w, "0", node.kind().as_str())?;
            attvalue(w, "1", node.name())?;
            let size = match node {
                GraphNode::Component(c) => {
                    attvalue(w, "3", &c.component.raw_package)?;
                    attvalue(w, "4", &c.component.function_descriptor)?;
                    if !c.component.physical_descriptor.is_empty() {
                        attvalue(w, "5", &c.component.physical_descriptor)?;
                    }
                    c.component.display_size()
                }
                GraphNode::Category(c) => {
                    attvalue(w, "2", &c.count.to_string())?;
                    30.0
                }
            };
            writeln!(w, "        </attvalues>")?;
            if let Some(p) = layout.and_then(|l| l.position(node.id())) {
                writeln!(w, r#"        <viz:position x="{}" y="{}" z="0.0"/>"#, p.x, p.y)?;
            }
            writeln!(w, r#"        <viz:size value="{}"/>"#, size)?;
            writeln!(w, "      </node>")?;
        }
        writeln!(w, "    </nodes>")?;

        writeln!(w, "    <edges>")?;
        for (i, edge) in graph.edges().enumerate() {
            writeln!(
                w,
                r#"      <edge id="{}" source="{}" target="{}" weight="{}">"#,
                i,
                escape(edge.source),
                escape(edge.target),
                edge.weight
            )?;
            writeln!(w, "        <attvalues>")?;
            attvalue(w, "0", edge.relation.as_str())?;
            writeln!(w, "        </attvalues>")?;
            writeln!(w, "      </edge>")?;
        }
        writeln!(w, "    </edges>")?;

        writeln!(w, "  </graph>")?;
        writeln!(w, "</gexf>")?;
        Ok(())
    }
}

fn attributes<W: Write>(
    w: &mut W,
    class: &str,
    table: &[(&str, &str, &str)],
) -> std::io::Result<()> {
    writeln!(w, r#"    <attributes class="{}">"#, class)?;
    for (id, title, ty) in table {
        writeln!(
            w,
            r#"      <attribute id="{}" title="{}" type="{}"/>"#,
            id, title, ty
        )?;
    }
    writeln!(w, "    </attributes>")
}

fn attvalue<W: Write>(w: &mut W, id: &str, value: &str) -> std::io::Result<()> {
    writeln!(
        w,
        r#"          <attvalue for="{}" value="{}"/>"#,
        id,
        escape(value)
    )
}
