//! Record sources.
//!
//! Two JSON layouts are accepted: a Vayo export (an object with a `Part`
//! array) and a flat array of [`ComponentRecord`] objects. Anything else at
//! the top level is rejected with [`RecordSourceError::NotASequence`].

pub mod vayo;

use serde_json::Value;
use std::path::Path;
use thiserror::Error;

use crate::model::ComponentRecord;

pub use vayo::VayoParser;

#[derive(Debug, Error)]
pub enum RecordSourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Input is not a sequence of component records: {0}")]
    NotASequence(String),
    #[error("Invalid input format: {0}")]
    InvalidFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Vayo,
    Records,
}

/// Decide which layout a decoded document uses.
pub fn detect_format(value: &Value) -> Result<SourceFormat, RecordSourceError> {
    match value {
        Value::Object(map) if map.contains_key("Part") => Ok(SourceFormat::Vayo),
        Value::Array(_) => Ok(SourceFormat::Records),
        other => Err(RecordSourceError::NotASequence(format!(
            "top-level value is {}",
            vayo::json_type(other)
        ))),
    }
}

/// Read and parse a record file of either layout.
pub fn detect_and_parse(path: &Path) -> Result<Vec<ComponentRecord>, RecordSourceError> {
    let content = std::fs::read_to_string(path)?;
    tracing::info!("Loading component records from {}", path.display());
    detect_and_parse_str(&content)
}

pub fn detect_and_parse_str(content: &str) -> Result<Vec<ComponentRecord>, RecordSourceError> {
    let value: Value = serde_json::from_str(content)?;
    match detect_format(&value)? {
        SourceFormat::Vayo => VayoParser::parse_value(&value),
        SourceFormat::Records => parse_records(value),
    }
}

/// Parse a flat array of records. Every element must be an object.
fn parse_records(value: Value) -> Result<Vec<ComponentRecord>, RecordSourceError> {
    let Value::Array(items) = value else {
        return Err(RecordSourceError::NotASequence(
            "expected an array of records".to_string(),
        ));
    };
    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        if !item.is_object() {
            return Err(RecordSourceError::InvalidFormat(format!(
                "record #{} is {}, expected an object",
                index,
                vayo::json_type(&item)
            )));
        }
        records.push(serde_json::from_value(item)?);
    }
    tracing::info!("Parsed {} component records", records.len());
    Ok(records)
}
