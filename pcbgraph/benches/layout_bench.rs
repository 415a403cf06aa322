use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pcbgraph::prelude::*;
use pcbgraph::{compute_layout, LayoutSettings};

const PACKAGES: &[&str] = &["0402", "0603", "0805", "1206", "SOT-23", "SOIC-8", "QFN-32", "TO-220"];
const FUNCTIONS: &[&str] = &["resistor", "capacitor", "inductor", "led", "mcu", "ldo", "diode", ""];

/// About 200 graph nodes, the size of a typical board.
fn records() -> Vec<ComponentRecord> {
    (0..180)
        .map(|i| {
            ComponentRecord::new(format!("P{}", i), format!("Part{}", i))
                .with_package(PACKAGES[i % PACKAGES.len()])
                .with_function(FUNCTIONS[(i / 5) % FUNCTIONS.len()])
                .with_dimensions(1.0 + (i % 7) as f64 * 0.3, 0.5, 0.4)
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let records = records();
    c.bench_function("build_graph", |b| {
        b.iter(|| pcbgraph::graph::build(black_box(&records)));
    });
}

fn bench_layouts(c: &mut Criterion) {
    let graph = pcbgraph::graph::build(&records()).graph;
    let settings = LayoutSettings::default();

    for algorithm in LayoutAlgorithm::ALL {
        c.bench_function(&format!("layout_{}", algorithm), |b| {
            b.iter(|| compute_layout(black_box(&graph), algorithm, &settings));
        });
    }
}

criterion_group!(benches, bench_build, bench_layouts);
criterion_main!(benches);
