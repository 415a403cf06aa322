//! Run configuration loaded from JSON.
//!
//! Every section has defaults, so a file only needs to name what it changes:
//!
//! ```json
//! {
//!   "taxonomy": { "unmatched_function": "omit" },
//!   "layout": { "spring": { "seed": 7, "iterations": 300 } },
//!   "export": { "top_n": 5, "graph_formats": ["graphml", "gexf"] }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::export::GraphFormat;
use crate::layout::LayoutSettings;
use crate::model::DEFAULT_LABEL_LEN;
use crate::taxonomy::TaxonomyConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Options for exporters and reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Length of the top-N occurrence lists.
    pub top_n: usize,
    /// Component display labels are truncated to this many characters.
    pub label_len: usize,
    /// Graph interchange files written next to the CSV and JSON exports.
    pub graph_formats: Vec<GraphFormat>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            label_len: DEFAULT_LABEL_LEN,
            graph_formats: GraphFormat::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PcbGraphConfig {
    pub taxonomy: TaxonomyConfig,
    pub layout: LayoutSettings,
    pub export: ExportConfig,
}

impl PcbGraphConfig {
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&content)?;
        tracing::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: PcbGraphConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.taxonomy.validate()?;
        self.layout
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.export.label_len == 0 {
            return Err(ConfigError::Invalid("export.label_len must be positive".into()));
        }
        Ok(())
    }
}
