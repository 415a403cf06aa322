//! Vayo placement export parser
//!
//! Reads the JSON export of the Vayo DFM tool. The document is an object
//! with a `Part` array; every part carries its identity at the top level,
//! package and classification codes under `General`, and the body outline
//! under `Shape.Outline`:
//!
//! ```json
//! { "Part": [ { "IDNUM": 1, "NAME": "R1", "LNAME": "RES_0603",
//!               "General": { "C": "R0603", "FunctionClass": 1, "PhysicalClass": 1,
//!                            "MFR": "Yageo" },
//!               "Shape": { "Outline": { "ChipL": 1.6, "ChipW": 0.8, "ChipH": 0.45 } } } ] }
//! ```
//!
//! Fields are read leniently: numbers may be given as strings and missing
//! fields become empty values that the graph builder validates.

use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

use crate::model::ComponentRecord;
use crate::parser::RecordSourceError;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct VayoPart {
    #[serde(rename = "IDNUM")]
    idnum: Option<Value>,
    #[serde(rename = "NAME")]
    name: Option<Value>,
    #[serde(rename = "LNAME")]
    lname: Option<Value>,
    #[serde(rename = "General")]
    general: Option<VayoGeneral>,
    #[serde(rename = "Shape")]
    shape: Option<VayoShape>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct VayoGeneral {
    #[serde(rename = "C")]
    package: Option<Value>,
    #[serde(rename = "FunctionClass")]
    function_class: Option<Value>,
    #[serde(rename = "PhysicalClass")]
    physical_class: Option<Value>,
    #[serde(rename = "MFR")]
    manufacturer: Option<Value>,
    #[serde(rename = "MPN")]
    part_number: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct VayoShape {
    #[serde(rename = "Outline")]
    outline: Option<VayoOutline>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct VayoOutline {
    #[serde(rename = "ChipL")]
    length: Option<Value>,
    #[serde(rename = "ChipW")]
    width: Option<Value>,
    #[serde(rename = "ChipH")]
    height: Option<Value>,
}

/// Parser for Vayo JSON exports
pub struct VayoParser;

impl VayoParser {
    pub fn parse_file(path: &Path) -> Result<Vec<ComponentRecord>, RecordSourceError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_str(&content)
    }

    pub fn parse_str(content: &str) -> Result<Vec<ComponentRecord>, RecordSourceError> {
        let value: Value = serde_json::from_str(content)?;
        Self::parse_value(&value)
    }

    /// Parse an already decoded document.
    pub fn parse_value(value: &Value) -> Result<Vec<ComponentRecord>, RecordSourceError> {
        let parts = match value.get("Part") {
            Some(Value::Array(parts)) => parts,
            Some(other) => {
                return Err(RecordSourceError::NotASequence(format!(
                    "'Part' is {}",
                    json_type(other)
                )))
            }
            None => {
                return Err(RecordSourceError::InvalidFormat(
                    "missing 'Part' array".to_string(),
                ))
            }
        };

        let mut records = Vec::with_capacity(parts.len());
        for (index, part) in parts.iter().enumerate() {
            if !part.is_object() {
                tracing::warn!(
                    "Skipping Part[{}]: expected an object, found {}",
                    index,
                    json_type(part)
                );
                continue;
            }
            match VayoPart::deserialize(part) {
                Ok(part) => records.push(part.into_record()),
                Err(e) => tracing::warn!("Skipping Part[{}]: {}", index, e),
            }
        }

        tracing::info!("Parsed {} Vayo parts", records.len());
        Ok(records)
    }

    /// Name of a numeric function class code.
    pub fn function_class_name(code: i64) -> String {
        match code {
            1 => "Resistor".to_string(),
            2 => "Capacitor".to_string(),
            7 => "Inductor".to_string(),
            11 => "LED".to_string(),
            12 => "Diode".to_string(),
            14 => "IC/Transistor".to_string(),
            other => format!("Class_{}", other),
        }
    }

    /// Name of a numeric physical class code.
    pub fn physical_class_name(code: i64) -> String {
        match code {
            1 => "Passive".to_string(),
            2 => "Active".to_string(),
            3 => "Connector".to_string(),
            other => format!("Physical_{}", other),
        }
    }
}

impl VayoPart {
    fn into_record(self) -> ComponentRecord {
        let general = self.general.unwrap_or_default();
        let outline = self
            .shape
            .and_then(|s| s.outline)
            .unwrap_or_default();

        let library_name = text(self.lname.as_ref());
        let name = text(self.name.as_ref())
            .or_else(|| library_name.clone())
            .unwrap_or_default();

        let function_descriptor =
            class_code(general.function_class.as_ref(), VayoParser::function_class_name);
        let physical_descriptor =
            class_code(general.physical_class.as_ref(), VayoParser::physical_class_name);

        ComponentRecord {
            id: text(self.idnum.as_ref()).unwrap_or_default(),
            name,
            package: text(general.package.as_ref()).unwrap_or_default(),
            length: outline.length.as_ref().and_then(number),
            width: outline.width.as_ref().and_then(number),
            height: outline.height.as_ref().and_then(number),
            function_descriptor,
            physical_descriptor,
            manufacturer: text(general.manufacturer.as_ref()),
            part_number: text(general.part_number.as_ref()),
            library_name,
        }
    }
}

/// Name of a numeric class code, or the text as given when it is not a number.
fn class_code(value: Option<&Value>, name: fn(i64) -> String) -> String {
    match value {
        Some(v) => match integer(v) {
            Some(code) => name(code),
            None => text(Some(v)).unwrap_or_default(),
        },
        None => String::new(),
    }
}

/// Non-empty trimmed text of a string or number.
fn text(value: Option<&Value>) -> Option<String> {
    let s = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
