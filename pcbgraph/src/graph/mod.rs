//! Knowledge graph: storage, builder and statistics.

pub mod builder;
pub mod knowledge;
pub mod stats;

pub use builder::{build, BuildResult, Diagnostic, GraphBuilder, RELATIONS_PER_COMPONENT};
pub use knowledge::{ComponentDetails, EdgeView, GraphInvariantError, KnowledgeGraph};
pub use stats::{DimensionSummary, GraphStatistics, NetworkMetrics, SummaryStats};
