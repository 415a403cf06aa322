//! Taxonomy: configured tables and the classifier that applies them.

pub mod classifier;
pub mod tables;

pub use classifier::{Classification, Classified, MatchOutcome, TaxonomyClassifier};
pub use tables::{KeywordRule, PackagePattern, TaxonomyConfig, UnmatchedPolicy};
