//! Analysis reports (Markdown and JSON) built from graph statistics.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::export::{ExportError, ExportedFiles};
use crate::graph::{Diagnostic, DimensionSummary, GraphStatistics, SummaryStats};
use crate::layout::{Layout, LayoutAlgorithm};
use crate::model::NodeKind;

#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DataSummary {
    pub total_records: usize,
    pub total_components: usize,
    pub unique_packages: usize,
    pub unique_functions: usize,
    pub unique_physical: usize,
    pub rejected_malformed: usize,
    pub rejected_duplicate: usize,
    pub unclassified: usize,
}

/// One label with its component count and percentage of all components.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelShare {
    pub label: String,
    pub count: usize,
    pub share: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LayoutSummary {
    pub algorithm: LayoutAlgorithm,
    pub nodes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iterations: Option<usize>,
    pub converged: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub data_summary: DataSummary,
    pub graph_statistics: GraphStatistics,
    pub package_distribution: Vec<LabelShare>,
    pub function_distribution: Vec<LabelShare>,
    pub physical_distribution: Vec<LabelShare>,
    pub size_statistics: DimensionSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutSummary>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    /// `top_n` limits the package table; the other distributions are complete.
    pub fn new(
        statistics: &GraphStatistics,
        diagnostics: &[Diagnostic],
        layout: Option<&Layout>,
        top_n: usize,
    ) -> Self {
        let total = statistics.total_components;
        let shares = |kind: NodeKind, n: usize| -> Vec<LabelShare> {
            statistics
                .top(kind, n)
                .into_iter()
                .map(|(label, count)| LabelShare {
                    share: percent(count, total),
                    label,
                    count,
                })
                .collect()
        };

        Self {
            metadata: ReportMetadata {
                generated_at: Utc::now(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            data_summary: DataSummary {
                total_records: statistics.total_records,
                total_components: total,
                unique_packages: statistics.node_count(NodeKind::Package),
                unique_functions: statistics.node_count(NodeKind::FunctionClass),
                unique_physical: statistics.node_count(NodeKind::PhysicalClass),
                rejected_malformed: statistics.rejected_malformed,
                rejected_duplicate: statistics.rejected_duplicate,
                unclassified: statistics.unclassified,
            },
            graph_statistics: statistics.clone(),
            package_distribution: shares(NodeKind::Package, top_n),
            function_distribution: shares(NodeKind::FunctionClass, usize::MAX),
            physical_distribution: shares(NodeKind::PhysicalClass, usize::MAX),
            size_statistics: statistics.dimensions.clone(),
            layout: layout.map(|l| LayoutSummary {
                algorithm: l.algorithm,
                nodes: l.len(),
                iterations: l.iterations,
                converged: l.converged,
            }),
            diagnostics: diagnostics.to_vec(),
        }
    }

    pub fn with_timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.metadata.generated_at = at;
        self
    }

    pub fn to_markdown(&self) -> String {
        self.markdown().to_string()
    }

    /// Markdown rendering that can be formatted into any writer.
    pub fn markdown(&self) -> Markdown<'_> {
        Markdown(self)
    }

    /// Write the Markdown report section by section.
    pub fn write_markdown_to<W: fmt::Write>(&self, md: &mut W) -> fmt::Result {
        writeln!(md, "# PCB Component Knowledge Graph Report\n")?;
        writeln!(
            md,
            "**Generated**: {}\n",
            self.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        self.write_overview(md)?;
        self.write_graph_statistics(md)?;

        writeln!(md, "## 3. Top Packages\n")?;
        share_table(md, "Package", &self.package_distribution, true)?;
        writeln!(md, "## 4. Function Distribution\n")?;
        share_table(md, "Function", &self.function_distribution, false)?;
        writeln!(md, "## 5. Physical Form Distribution\n")?;
        share_table(md, "Physical class", &self.physical_distribution, false)?;

        self.write_sizes(md)?;
        self.write_layout(md)?;
        self.write_diagnostics(md)
    }

    fn write_overview<W: fmt::Write>(&self, md: &mut W) -> fmt::Result {
        let d = &self.data_summary;
        writeln!(md, "## 1. Data Overview\n")?;
        writeln!(md, "- **Records read**: {}", d.total_records)?;
        writeln!(md, "- **Components**: {}", d.total_components)?;
        writeln!(md, "- **Package types**: {}", d.unique_packages)?;
        writeln!(md, "- **Function classes**: {}", d.unique_functions)?;
        writeln!(md, "- **Physical classes**: {}", d.unique_physical)?;
        writeln!(
            md,
            "- **Rejected**: {} malformed, {} duplicate ids",
            d.rejected_malformed, d.rejected_duplicate
        )?;
        writeln!(md, "- **Unclassified functions**: {}\n", d.unclassified)
    }

    fn write_graph_statistics<W: fmt::Write>(&self, md: &mut W) -> fmt::Result {
        let s = &self.graph_statistics;
        writeln!(md, "## 2. Graph Statistics\n")?;
        writeln!(md, "- **Nodes**: {}", s.total_nodes)?;
        writeln!(md, "- **Edges**: {}", s.total_edges)?;
        writeln!(md, "- **Density**: {:.4}", s.network.density)?;
        writeln!(
            md,
            "- **Weakly connected components**: {}\n",
            s.network.weak_components
        )?;

        writeln!(md, "### Node kinds\n")?;
        for (kind, count) in &s.node_counts {
            writeln!(md, "- {}: {}", kind, count)?;
        }
        writeln!(md)?;

        writeln!(md, "### Relations\n")?;
        for (relation, count) in &s.relation_counts {
            writeln!(md, "- {}: {}", relation, count)?;
        }
        writeln!(md)
    }

    fn write_sizes<W: fmt::Write>(&self, md: &mut W) -> fmt::Result {
        writeln!(md, "## 6. Size Statistics\n")?;
        let dims = &self.size_statistics;
        if dims.length.is_none() && dims.width.is_none() && dims.height.is_none() {
            return writeln!(md, "No dimension data.\n");
        }
        writeln!(md, "| Dimension | Mean (mm) | Std (mm) | Min (mm) | Max (mm) |")?;
        writeln!(md, "|-----------|-----------|----------|----------|----------|")?;
        for (name, stats) in [
            ("Length", dims.length),
            ("Width", dims.width),
            ("Height", dims.height),
        ] {
            size_row(md, name, stats)?;
        }
        writeln!(md)
    }

    fn write_layout<W: fmt::Write>(&self, md: &mut W) -> fmt::Result {
        let Some(layout) = &self.layout else {
            return Ok(());
        };
        writeln!(md, "## 7. Layout\n")?;
        writeln!(md, "- **Algorithm**: {}", layout.algorithm)?;
        writeln!(md, "- **Nodes placed**: {}", layout.nodes)?;
        if let Some(iterations) = layout.iterations {
            writeln!(md, "- **Iterations**: {}", iterations)?;
        }
        writeln!(md, "- **Converged**: {}\n", layout.converged)
    }

    fn write_diagnostics<W: fmt::Write>(&self, md: &mut W) -> fmt::Result {
        if self.diagnostics.is_empty() {
            return Ok(());
        }
        writeln!(md, "## Diagnostics\n")?;
        for diagnostic in &self.diagnostics {
            writeln!(md, "- {}", diagnostic)?;
        }
        writeln!(md)
    }

    pub fn write_markdown(&self, path: &Path) -> Result<(), ExportError> {
        let mut w = BufWriter::new(File::create(path)?);
        write!(w, "{}", self.markdown())?;
        w.flush()?;
        Ok(())
    }

    pub fn write_json(&self, path: &Path) -> Result<(), ExportError> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Write `report.md` and `report.json` into `dir`.
    pub fn write_all(&self, dir: &Path) -> Result<ExportedFiles, ExportError> {
        std::fs::create_dir_all(dir)?;
        let mut files = ExportedFiles::new();
        let md = dir.join("report.md");
        self.write_markdown(&md)?;
        files.insert("report_md".to_string(), md);
        let json = dir.join("report.json");
        self.write_json(&json)?;
        files.insert("report_json".to_string(), json);
        for path in files.values() {
            tracing::info!("Wrote report {}", path.display());
        }
        Ok(files)
    }
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// [`Report`] rendered as Markdown through `Display`.
pub struct Markdown<'a>(&'a Report);

impl fmt::Display for Markdown<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.write_markdown_to(f)
    }
}

fn share_table<W: fmt::Write>(
    md: &mut W,
    heading: &str,
    rows: &[LabelShare],
    ranked: bool,
) -> fmt::Result {
    if rows.is_empty() {
        return writeln!(md, "No data.\n");
    }
    if ranked {
        writeln!(md, "| Rank | {} | Components | Share |", heading)?;
        writeln!(md, "|------|------|------------|-------|")?;
    } else {
        writeln!(md, "| {} | Components | Share |", heading)?;
        writeln!(md, "|------|------------|-------|")?;
    }
    for (i, row) in rows.iter().enumerate() {
        let label = row.label.replace('|', "\\|");
        if ranked {
            writeln!(md, "| {} | {} | {} | {:.1}% |", i + 1, label, row.count, row.share)?;
        } else {
            writeln!(md, "| {} | {} | {:.1}% |", label, row.count, row.share)?;
        }
    }
    writeln!(md)
}

fn size_row<W: fmt::Write>(md: &mut W, name: &str, stats: Option<SummaryStats>) -> fmt::Result {
    match stats {
        Some(s) => writeln!(
            md,
            "| {} | {:.2} | {:.2} | {:.2} | {:.2} |",
            name, s.mean, s.std_dev, s.min, s.max
        ),
        None => writeln!(md, "| {} | - | - | - | - |", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build;
    use crate::model::ComponentRecord;
    use chrono::TimeZone;

    fn report() -> Report {
        let records = vec![
            ComponentRecord::new("1", "R1")
                .with_package("0603")
                .with_function("resistor")
                .with_dimensions(1.6, 0.8, 0.45),
            ComponentRecord::new("2", "R2")
                .with_package("0603")
                .with_function("resistor")
                .with_dimensions(1.6, 0.8, 0.45),
            ComponentRecord::new("3", "C1")
                .with_package("0805")
                .with_function("capacitor"),
            ComponentRecord::new("3", "dup"),
        ];
        let result = build(&records);
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        Report::new(&result.statistics, &result.diagnostics, None, 10).with_timestamp(at)
    }

    #[test]
    fn package_shares_are_percentages() {
        let r = report();
        assert_eq!(r.package_distribution[0].label, "0603");
        assert_eq!(r.package_distribution[0].count, 2);
        assert!((r.package_distribution[0].share - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(r.data_summary.rejected_duplicate, 1);
    }

    #[test]
    fn markdown_has_all_sections() {
        let md = report().to_markdown();
        assert!(md.contains("**Generated**: 2024-05-01 12:30:00 UTC"));
        assert!(md.contains("## 3. Top Packages"));
        assert!(md.contains("| 1 | 0603 | 2 | 66.7% |"));
        assert!(md.contains("| Length | 1.60 | 0.00 | 1.60 | 1.60 |"));
        assert!(md.contains("duplicate component id '3'"));
        assert!(!md.contains("## 7. Layout"));
    }

    /// Accepts `budget` bytes, then fails every write.
    struct ShortWriter {
        budget: usize,
        written: String,
    }

    impl fmt::Write for ShortWriter {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            if self.written.len() + s.len() > self.budget {
                return Err(fmt::Error);
            }
            self.written.push_str(s);
            Ok(())
        }
    }

    #[test]
    fn markdown_writer_errors_are_propagated() {
        let r = report();
        let mut w = ShortWriter {
            budget: 200,
            written: String::new(),
        };
        assert_eq!(r.write_markdown_to(&mut w), Err(fmt::Error));
        assert!(w.written.starts_with("# PCB Component Knowledge Graph Report"));
        assert!(!w.written.contains("## 6. Size Statistics"));

        let mut unlimited = ShortWriter {
            budget: usize::MAX,
            written: String::new(),
        };
        assert_eq!(r.write_markdown_to(&mut unlimited), Ok(()));
        assert_eq!(unlimited.written, r.to_markdown());
    }

    #[test]
    fn markdown_file_matches_rendering() {
        let r = report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.md");
        r.write_markdown(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), r.to_markdown());
    }

    #[test]
    fn json_report_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let files = report().write_all(dir.path()).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&files["report_json"]).unwrap()).unwrap();
        assert_eq!(json["data_summary"]["total_components"], 3);
        assert_eq!(json["metadata"]["generated_at"], "2024-05-01T12:30:00Z");
        assert_eq!(json["diagnostics"][0]["kind"], "duplicate_component_id");
    }
}
