//! Classify with an extended taxonomy and a radial layout anchored on packages.

use pcbgraph::layout::{RadialConfig, RadialLayout};
use pcbgraph::taxonomy::{KeywordRule, PackagePattern, UnmatchedPolicy};
use pcbgraph::prelude::*;
use pcbgraph::TaxonomyConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut taxonomy = TaxonomyConfig::default();
    taxonomy.package_patterns.insert(
        0,
        PackagePattern {
            label: "HDR-2x5".into(),
            patterns: vec!["HDR_2X5".into(), "HDR-2X5".into()],
        },
    );
    taxonomy.function_rules.push(KeywordRule {
        label: "Mechanical".into(),
        keywords: vec!["standoff".into(), "screw".into(), "fiducial".into()],
    });
    taxonomy.unmatched_function = UnmatchedPolicy::Omit;

    let classifier = TaxonomyClassifier::new(taxonomy)?;
    let records = vec![
        ComponentRecord::new("1", "J1").with_package("HDR_2X5").with_function("pin header"),
        ComponentRecord::new("2", "FID1").with_package("FIDUCIAL_1MM").with_function("fiducial"),
        ComponentRecord::new("3", "R1").with_package("R0603").with_function("resistor"),
        ComponentRecord::new("4", "TP1").with_package("TP_1MM").with_function("test point"),
    ];

    let build = GraphBuilder::new(&classifier).build(&records);
    for diagnostic in &build.diagnostics {
        println!("note: {}", diagnostic);
    }

    let engine = RadialLayout::new(RadialConfig {
        anchor: NodeKind::Package,
        ..Default::default()
    })?;
    for sector in engine.sectors(&build.graph) {
        println!(
            "{:<20} {:>2} members, {:.0} degrees",
            sector.anchor_id,
            sector.members.len(),
            sector.width.to_degrees()
        );
    }

    let layout = engine.layout(&build.graph);
    for (id, p) in &layout.positions {
        println!("{:<20} ({:>6.2}, {:>6.2})", id, p.x, p.y);
    }
    Ok(())
}
