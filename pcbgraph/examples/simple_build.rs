//! Build a graph from a record file and print a short summary.
//!
//! ```sh
//! cargo run --example simple_build -- pcbgraph/tests/fixtures/vayo_small.json
//! ```

use pcbgraph::prelude::*;
use std::path::PathBuf;

fn main() -> Result<(), PcbGraphError> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("Vayo.json"));

    let core = PcbGraphCore::default();
    let records = PcbGraphCore::load_records(&path)?;
    let build = core.build(&records);
    let stats = &build.statistics;

    println!("Components: {}", stats.total_components);
    println!("Nodes: {}  Edges: {}", stats.total_nodes, stats.total_edges);
    println!("Rejected: {}", stats.rejected());

    for kind in NodeKind::CATEGORIES {
        println!("\nTop {}:", kind);
        for (label, count) in stats.top(kind, 5) {
            println!("  {:<16} {}", label, count);
        }
    }

    let layout = core.layout(&build.graph, LayoutAlgorithm::Radial, None)?;
    if let Some((lo, hi)) = layout.bounds() {
        println!(
            "\nRadial layout spans ({:.1}, {:.1}) to ({:.1}, {:.1})",
            lo.x, lo.y, hi.x, hi.y
        );
    }

    Ok(())
}
