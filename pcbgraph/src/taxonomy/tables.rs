//! Taxonomy tables.
//!
//! All classification rules are plain data. The built-in tables below are
//! only defaults; a JSON configuration file may replace any of them.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Canonical package label and the case-insensitive substrings that select it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagePattern {
    pub label: String,
    pub patterns: Vec<String>,
}

/// Category label selected when any of its keywords matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub label: String,
    pub keywords: Vec<String>,
}

/// What happens to a function descriptor that no rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedPolicy {
    /// Link the component to the sentinel category.
    #[default]
    Sentinel,
    /// Leave the component without a `hasFunction` edge and record a diagnostic.
    Omit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxonomyConfig {
    /// Checked in order; the first pattern that matches wins.
    pub package_patterns: Vec<PackagePattern>,
    /// Checked in order against descriptor tokens.
    pub function_rules: Vec<KeywordRule>,
    /// Markers searched for in the package label, in order.
    pub physical_rules: Vec<KeywordRule>,
    /// Package label for components with an empty package string.
    pub unknown_package: String,
    pub unclassified_function: String,
    pub other_physical: String,
    pub unmatched_function: UnmatchedPolicy,
}

impl Default for TaxonomyConfig {
    fn default() -> Self {
        Self {
            package_patterns: default_package_patterns(),
            function_rules: default_function_rules(),
            physical_rules: default_physical_rules(),
            unknown_package: "Unknown".to_string(),
            unclassified_function: "Unclassified".to_string(),
            other_physical: "Other".to_string(),
            unmatched_function: UnmatchedPolicy::Sentinel,
        }
    }
}

impl TaxonomyConfig {
    /// Reject tables that could not classify anything deterministically.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (what, value) in [
            ("unknown_package", &self.unknown_package),
            ("unclassified_function", &self.unclassified_function),
            ("other_physical", &self.other_physical),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", what)));
            }
        }

        for pattern in &self.package_patterns {
            check_rule("package pattern", &pattern.label, &pattern.patterns)?;
        }
        for rule in &self.function_rules {
            check_rule("function rule", &rule.label, &rule.keywords)?;
        }
        for rule in &self.physical_rules {
            check_rule("physical rule", &rule.label, &rule.keywords)?;
        }
        Ok(())
    }
}

fn check_rule(what: &str, label: &str, needles: &[String]) -> Result<(), ConfigError> {
    if label.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{} has an empty label", what)));
    }
    if needles.is_empty() {
        return Err(ConfigError::Invalid(format!(
            "{} '{}' has no keywords",
            what, label
        )));
    }
    if needles.iter().any(|n| n.trim().is_empty()) {
        return Err(ConfigError::Invalid(format!(
            "{} '{}' has an empty keyword",
            what, label
        )));
    }
    Ok(())
}

fn pattern(label: &str, patterns: &[&str]) -> PackagePattern {
    PackagePattern {
        label: label.to_string(),
        patterns: patterns.iter().map(|p| p.to_string()).collect(),
    }
}

fn rule(label: &str, keywords: &[&str]) -> KeywordRule {
    KeywordRule {
        label: label.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
    }
}

/// Chip sizes are listed with their metric aliases. Longer SOT/SOD names
/// come before their prefixes.
pub fn default_package_patterns() -> Vec<PackagePattern> {
    vec![
        pattern("0201", &["0201"]),
        pattern("0402", &["0402", "1005"]),
        pattern("0603", &["0603", "1608"]),
        pattern("0805", &["0805", "2012"]),
        pattern("1206", &["1206", "3216"]),
        pattern("1210", &["1210", "3225"]),
        pattern("2512", &["2512", "6332"]),
        pattern("SOT-223", &["SOT-223", "SOT223"]),
        pattern("SOT-23-5", &["SOT-23-5", "SOT23-5"]),
        pattern("SOT-23-6", &["SOT-23-6", "SOT23-6"]),
        pattern("SOT-23", &["SOT-23", "SOT23"]),
        pattern("SOD-123", &["SOD-123", "SOD123"]),
        pattern("SOD-323", &["SOD-323", "SOD323"]),
        pattern("SOIC-8", &["SOIC-8", "SOIC8", "SO-8", "SOP-8", "SOP8"]),
        pattern("SOIC-16", &["SOIC-16", "SOIC16", "SO-16"]),
        pattern("LQFP-48", &["LQFP-48", "LQFP48"]),
        pattern("LQFP-64", &["LQFP-64", "LQFP64"]),
        pattern("TO-220", &["TO-220", "TO220"]),
        pattern("TO-92", &["TO-92", "TO92"]),
    ]
}

/// Specific parts come before the generic ones that share keywords
/// (LED before Diode, Power before IC before Transistor).
pub fn default_function_rules() -> Vec<KeywordRule> {
    vec![
        rule("LED", &["led"]),
        rule("Diode", &["diode", "schottky", "zener", "tvs", "rectifier"]),
        rule("Resistor", &["resistor", "resistance", "ohm", "potentiometer"]),
        rule("Capacitor", &["capacitor", "mlcc", "electrolytic", "tantalum"]),
        rule("Inductor", &["inductor", "choke", "ferrite", "coil"]),
        rule("Crystal", &["crystal", "xtal", "oscillator", "resonator"]),
        rule("Power", &["regulator", "ldo", "buck", "boost", "pmic", "converter"]),
        rule(
            "IC",
            &[
                "ic",
                "mcu",
                "microcontroller",
                "processor",
                "fpga",
                "opamp",
                "amplifier",
                "logic",
                "eeprom",
                "flash",
                "driver",
                "controller",
            ],
        ),
        rule("Transistor", &["transistor", "mosfet", "bjt"]),
        rule("Connector", &["connector", "header", "socket", "jack", "terminal", "plug"]),
        rule("Sensor", &["sensor", "thermistor", "accelerometer", "gyro", "hall"]),
        rule("Switch", &["switch", "button", "relay"]),
    ]
}

/// SMD power packages (TO-252/263) are listed before the through-hole TO family.
pub fn default_physical_rules() -> Vec<KeywordRule> {
    vec![
        rule(
            "SurfaceMount",
            &[
                "SMD", "SMT", "SOT", "SOD", "SOIC", "SOP", "QFN", "QFP", "BGA", "DFN", "LGA",
                "PLCC", "MELF", "TO-252", "TO-263", "DPAK", "0201", "0402", "0603", "0805",
                "1206", "1210", "1812", "2010", "2512",
            ],
        ),
        rule(
            "ThroughHole",
            &[
                "THT", "PTH", "DIP", "SIP", "TO-220", "TO220", "TO-92", "TO92", "TO-247",
                "AXIAL", "RADIAL", "HC-49",
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tables_validate() {
        assert!(TaxonomyConfig::default().validate().is_ok());
    }

    #[test]
    fn empty_sentinel_is_rejected() {
        let config = TaxonomyConfig {
            other_physical: "  ".into(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("other_physical"));
    }

    #[test]
    fn rule_without_keywords_is_rejected() {
        let mut config = TaxonomyConfig::default();
        config.function_rules.push(KeywordRule {
            label: "Empty".into(),
            keywords: vec![],
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: TaxonomyConfig =
            serde_json::from_str(r#"{"unmatched_function": "omit"}"#).unwrap();
        assert_eq!(config.unmatched_function, UnmatchedPolicy::Omit);
        assert_eq!(config.function_rules, default_function_rules());
        assert_eq!(config.unknown_package, "Unknown");
    }
}
