//! CSV node and edge tables.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::export::{node_properties, ExportError};
use crate::graph::KnowledgeGraph;

const BOM: &str = "\u{feff}";

pub struct CsvExporter;

impl CsvExporter {
    /// Write `nodes.csv` and `edges.csv` into `dir`.
    pub fn export(graph: &KnowledgeGraph, dir: &Path) -> Result<(PathBuf, PathBuf), ExportError> {
        let nodes = dir.join("nodes.csv");
        let edges = dir.join("edges.csv");

        let mut w = BufWriter::new(File::create(&nodes)?);
        Self::write_nodes(graph, &mut w)?;
        w.flush()?;

        let mut w = BufWriter::new(File::create(&edges)?);
        Self::write_edges(graph, &mut w)?;
        w.flush()?;

        Ok((nodes, edges))
    }

    /// Columns: node_id, name, type, label, properties (a JSON object).
    pub fn write_nodes<W: Write>(graph: &KnowledgeGraph, w: &mut W) -> Result<(), ExportError> {
        write!(w, "{}", BOM)?;
        writeln!(w, "node_id,name,type,label,properties")?;
        for node in graph.nodes() {
            let props = serde_json::to_string(&node_properties(node))?;
            write_row(
                w,
                &[node.id(), node.name(), node.kind().as_str(), node.label(), &props],
            )?;
        }
        Ok(())
    }

    /// Columns: source, target, relation, weight.
    pub fn write_edges<W: Write>(graph: &KnowledgeGraph, w: &mut W) -> Result<(), ExportError> {
        write!(w, "{}", BOM)?;
        writeln!(w, "source,target,relation,weight")?;
        for edge in graph.edges() {
            let weight = edge.weight.to_string();
            write_row(w, &[edge.source, edge.target, edge.relation.as_str(), &weight])?;
        }
        Ok(())
    }
}

fn write_row<W: Write>(w: &mut W, fields: &[&str]) -> std::io::Result<()> {
    let line: Vec<String> = fields.iter().map(|f| escape(f)).collect();
    writeln!(w, "{}", line.join(","))
}

/// Quote a field when it contains a separator, quote or line break.
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build;
    use crate::model::ComponentRecord;

    #[test]
    fn escape_quotes_only_when_needed() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn node_table_has_bom_header_and_rows() {
        let graph = build(&[ComponentRecord::new("1", "R1, 10k")
            .with_package("0603")
            .with_function("resistor")])
        .graph;
        let mut buf = Vec::new();
        CsvExporter::write_nodes(&graph, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.starts_with('\u{feff}'));
        let lines: Vec<&str> = text.trim_start_matches('\u{feff}').lines().collect();
        assert_eq!(lines[0], "node_id,name,type,label,properties");
        assert_eq!(lines.len(), 1 + graph.node_count());
        assert!(lines[1].starts_with("COMP_1,\"R1, 10k\",Component,"));
        assert!(lines.iter().any(|l| l.starts_with("PKG_0603,0603,Package,0603,")));
    }

    #[test]
    fn edge_table_lists_relations() {
        let graph = build(&[ComponentRecord::new("1", "R1").with_package("0603")]).graph;
        let mut buf = Vec::new();
        CsvExporter::write_edges(&graph, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("COMP_1,PKG_0603,usesPackage,1\n"));
        assert_eq!(text.lines().count(), 4);
    }
}
