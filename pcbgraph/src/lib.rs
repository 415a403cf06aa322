//! pcbgraph - PCB component knowledge graph builder
//!
//! This library turns flat PCB component records into a typed knowledge
//! graph (components linked to their package, function class and physical
//! form) and computes 2-D layouts of that graph for visualization.
//!
//! # Quick Start
//!
//! ```no_run
//! use pcbgraph::{LayoutAlgorithm, PcbGraphCore};
//! use std::path::Path;
//!
//! let core = PcbGraphCore::default();
//! let records = PcbGraphCore::load_records(Path::new("Vayo.json")).unwrap();
//! let build = core.build(&records);
//! let layout = core
//!     .layout(&build.graph, LayoutAlgorithm::Radial, None)
//!     .unwrap();
//!
//! println!(
//!     "{} nodes, {} edges, {} positions",
//!     build.statistics.total_nodes,
//!     build.statistics.total_edges,
//!     layout.len()
//! );
//! ```
//!
//! # Features
//!
//! - **Taxonomy**: configurable, ordered pattern tables for package, function and physical form
//! - **Graph builder**: deduplicated category nodes, rejection counters, statistics
//! - **Layouts**: hierarchical, seeded force-directed and radial engines
//! - **Exports**: CSV, GraphML, GML, GEXF, JSON and Markdown/JSON reports

pub mod config;
pub mod core;
pub mod export;
pub mod graph;
pub mod layout;
pub mod model;
pub mod parser;
pub mod report;
pub mod taxonomy;

// Re-export main types
pub use config::{ConfigError, ExportConfig, PcbGraphConfig};
pub use crate::core::{PcbGraphCore, PcbGraphError, RunOptions, RunResult};
pub use export::GraphFormat;
pub use graph::{BuildResult, Diagnostic, GraphBuilder, GraphStatistics, KnowledgeGraph};
pub use layout::{
    compute_layout, Layout, LayoutAlgorithm, LayoutEngine, LayoutError, LayoutSettings, Point,
};
pub use model::{ComponentRecord, GraphNode, NodeKind, RelationKind};
pub use parser::{detect_and_parse, RecordSourceError, VayoParser};
pub use report::Report;
pub use taxonomy::{Classification, TaxonomyClassifier, TaxonomyConfig};

/// Load records from a Vayo export or a flat record array (convenience wrapper).
pub fn load_records(path: &std::path::Path) -> Result<Vec<ComponentRecord>, PcbGraphError> {
    PcbGraphCore::load_records(path)
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        BuildResult, ComponentRecord, GraphBuilder, KnowledgeGraph, Layout, LayoutAlgorithm,
        LayoutEngine, NodeKind, PcbGraphConfig, PcbGraphCore, PcbGraphError, RelationKind,
        TaxonomyClassifier,
    };
}
