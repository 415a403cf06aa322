//! Taxonomy classifier.
//!
//! Maps one component's raw package, function and physical strings to its
//! three category labels. Matching is deterministic and never fails:
//! anything that no rule covers resolves to a verbatim label or a sentinel.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::taxonomy::tables::{TaxonomyConfig, UnmatchedPolicy};

/// How a label was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    /// A configured rule matched.
    Matched,
    /// No package or physical rule matched; the trimmed raw string is used as is.
    Verbatim,
    /// Input was empty or unmatched and fell back to the sentinel category.
    Sentinel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classified {
    pub label: String,
    pub outcome: MatchOutcome,
}

impl Classified {
    fn new(label: impl Into<String>, outcome: MatchOutcome) -> Self {
        Self {
            label: label.into(),
            outcome,
        }
    }
}

/// The three category labels for one component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub package: Classified,
    /// `None` only under [`UnmatchedPolicy::Omit`] when no rule matched.
    pub function: Option<Classified>,
    pub physical: Classified,
}

/// A rule with its needles already normalized for matching.
#[derive(Debug, Clone)]
struct CompiledRule {
    label: String,
    needles: Vec<String>,
}

/// Classifier over an immutable set of taxonomy tables.
#[derive(Debug, Clone)]
pub struct TaxonomyClassifier {
    config: TaxonomyConfig,
    packages: Vec<CompiledRule>,
    functions: Vec<CompiledRule>,
    physicals: Vec<CompiledRule>,
}

impl Default for TaxonomyClassifier {
    fn default() -> Self {
        let config = TaxonomyConfig::default();
        Self::compile(config)
    }
}

impl TaxonomyClassifier {
    /// Create a classifier from validated tables.
    pub fn new(config: TaxonomyConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::compile(config))
    }

    fn compile(config: TaxonomyConfig) -> Self {
        let packages = config
            .package_patterns
            .iter()
            .map(|p| CompiledRule {
                label: p.label.trim().to_string(),
                needles: p.patterns.iter().map(|s| s.trim().to_uppercase()).collect(),
            })
            .collect();
        let functions = config
            .function_rules
            .iter()
            .map(|r| CompiledRule {
                label: r.label.trim().to_string(),
                needles: r.keywords.iter().map(|s| s.trim().to_lowercase()).collect(),
            })
            .collect();
        let physicals = config
            .physical_rules
            .iter()
            .map(|r| CompiledRule {
                label: r.label.trim().to_string(),
                needles: r.keywords.iter().map(|s| s.trim().to_uppercase()).collect(),
            })
            .collect();

        Self {
            config,
            packages,
            functions,
            physicals,
        }
    }

    pub fn config(&self) -> &TaxonomyConfig {
        &self.config
    }

    /// Classify all three descriptors of one component. A blank physical
    /// descriptor falls back to the form implied by the package.
    pub fn classify(
        &self,
        package: &str,
        function_descriptor: &str,
        physical_descriptor: &str,
    ) -> Classification {
        let package = self.classify_package(package);
        let physical = self
            .classify_physical_descriptor(physical_descriptor)
            .unwrap_or_else(|| self.classify_physical(&package.label, package.outcome));
        let function = self.classify_function(function_descriptor);

        Classification {
            package,
            function,
            physical,
        }
    }

    /// Normalize a raw package string.
    pub fn classify_package(&self, raw: &str) -> Classified {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Classified::new(self.config.unknown_package.trim(), MatchOutcome::Sentinel);
        }

        let upper = trimmed.to_uppercase();
        for rule in &self.packages {
            if rule.needles.iter().any(|n| upper.contains(n.as_str())) {
                return Classified::new(rule.label.clone(), MatchOutcome::Matched);
            }
        }

        Classified::new(trimmed, MatchOutcome::Verbatim)
    }

    /// Classify a function descriptor, honoring the unmatched policy.
    pub fn classify_function(&self, descriptor: &str) -> Option<Classified> {
        let tokens = tokenize(descriptor);
        let lowered = descriptor.trim().to_lowercase();

        if !tokens.is_empty() {
            for rule in &self.functions {
                if rule
                    .needles
                    .iter()
                    .any(|n| keyword_matches(n, &tokens, &lowered))
                {
                    return Some(Classified::new(rule.label.clone(), MatchOutcome::Matched));
                }
            }
        }

        // Empty descriptors always land in the sentinel so every component keeps its edge.
        if tokens.is_empty() || self.config.unmatched_function == UnmatchedPolicy::Sentinel {
            return Some(Classified::new(
                self.config.unclassified_function.trim(),
                MatchOutcome::Sentinel,
            ));
        }
        None
    }

    /// Classify an explicit physical descriptor; `None` when it is blank.
    pub fn classify_physical_descriptor(&self, descriptor: &str) -> Option<Classified> {
        let trimmed = descriptor.trim();
        if trimmed.is_empty() {
            return None;
        }
        let matched = self.physical_for_label(trimmed);
        if matched.outcome == MatchOutcome::Matched {
            return Some(matched);
        }
        Some(Classified::new(trimmed, MatchOutcome::Verbatim))
    }

    /// Derive the physical form from the normalized package label.
    fn classify_physical(&self, package_label: &str, outcome: MatchOutcome) -> Classified {
        if outcome == MatchOutcome::Sentinel {
            return Classified::new(self.config.other_physical.trim(), MatchOutcome::Sentinel);
        }
        self.physical_for_label(package_label)
    }

    /// Physical form for an already normalized package label.
    pub fn physical_for_label(&self, package_label: &str) -> Classified {
        let upper = package_label.trim().to_uppercase();
        for rule in &self.physicals {
            if rule.needles.iter().any(|n| upper.contains(n.as_str())) {
                return Classified::new(rule.label.clone(), MatchOutcome::Matched);
            }
        }
        Classified::new(self.config.other_physical.trim(), MatchOutcome::Sentinel)
    }
}

/// Lowercased alphanumeric runs of a descriptor.
fn tokenize(descriptor: &str) -> Vec<String> {
    descriptor
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Single-word keywords match the start of a token ("capacitor" matches
/// "capacitors"). Keywords containing separators match as substrings.
fn keyword_matches(keyword: &str, tokens: &[String], lowered: &str) -> bool {
    if keyword.chars().all(|c| c.is_alphanumeric()) {
        tokens.iter().any(|t| t.starts_with(keyword))
    } else {
        lowered.contains(keyword)
    }
}
