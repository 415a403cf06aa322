//! GML export.
//!
//! Nodes get consecutive integer ids in graph order; the string node id is
//! kept as `label` so the file reads back with the same identities.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::export::ExportError;
use crate::graph::KnowledgeGraph;
use crate::layout::Layout;
use crate::model::GraphNode;

pub struct GmlExporter;

impl GmlExporter {
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

    /// Positions go into a `graphics` block when a layout is given.
    pub fn write<W: Write>(
        graph: &KnowledgeGraph,
        layout: Option<&Layout>,
        w: &mut W,
    ) -> Result<(), ExportError> {
        let mut index: HashMap<&str, usize> = HashMap::new();

        writeln!(w, "graph [")?;
        writeln!(w, "  directed 1")?;
        for (i, node) in graph.nodes().enumerate() {
            index.insert(node.id(), i);
            writeln!(w, "  node [")?;
            writeln!(w, "    id {}", i)?;
            string(w, "label", node.id())?;
            string(w, "kind", node.kind().as_str())?;
            string(w, "name", node.name())?;
            string(w, "display", node.label())?;
            match node {
                GraphNode::Component(c) => {
                    string(w, "package", &c.component.raw_package)?;
                    string(w, "function", &c.component.function_descriptor)?;
                    if !c.component.physical_descriptor.is_empty() {
                        string(w, "physical", &c.component.physical_descriptor)?;
                    }
                    writeln!(w, "    size {}", real(c.component.display_size()))?;
                }
                GraphNode::Category(c) => {
                    writeln!(w, "    count {}", c.count)?;
                }
            }
            if let Some(p) = layout.and_then(|l| l.position(node.id())) {
                writeln!(w, "    graphics [")?;
                writeln!(w, "      x {}", real(p.x))?;
                writeln!(w, "      y {}", real(p.y))?;
                writeln!(w, "    ]")?;
            }
            writeln!(w, "  ]")?;
        }

        for edge in graph.edges() {
            let (Some(source), Some(target)) = (index.get(edge.source), index.get(edge.target))
            else {
                tracing::warn!("GML: skipping edge {} -> {}", edge.source, edge.target);
                continue;
            };
            writeln!(w, "  edge [")?;
            writeln!(w, "    source {}", source)?;
            writeln!(w, "    target {}", target)?;
            string(w, "relation", edge.relation.as_str())?;
            writeln!(w, "    weight {}", real(edge.weight))?;
            writeln!(w, "  ]")?;
        }
        writeln!(w, "]")?;
        Ok(())
    }
}

fn string<W: Write>(w: &mut W, key: &str, value: &str) -> std::io::Result<()> {
    writeln!(w, "    {} \"{}\"", key, escape(value))
}

/// GML strings are ASCII; quotes, ampersands and everything outside
/// printable ASCII become character references.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            ' '..='~' => out.push(c),
            c => out.push_str(&format!("&#{};", c as u32)),
        }
    }
    out
}

/// Reals always carry a decimal point so readers do not take them for integers.
fn real(v: f64) -> String {
    let s = v.to_string();
    if s.contains('.') || !v.is_finite() {
        s
    } else {
        format!("{}.0", s)
    }
}
