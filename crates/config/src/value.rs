//! Template value parsing
//!
//! Configuration values for the field-template map arrive either as plain
//! TOML values or as strings carrying embedded JSON. A top-level string that
//! begins with `{` or `[` is parsed as JSON so operators can declare nested
//! maps and arrays inline; everything else passes through structurally.

use tracing::warn;

/// Parse a raw template value string.
///
/// Strings beginning with `{` or `[` are treated as JSON. If JSON parsing
/// fails, the raw string is kept as a literal template and a warning is
/// logged.
pub fn parse_value(raw: &str) -> serde_json::Value {
    if raw.starts_with('{') || raw.starts_with('[') {
        match serde_json::from_str(raw) {
            Ok(value) => return value,
            Err(e) => {
                warn!(
                    value = raw,
                    error = %e,
                    "failed to parse value as json, assuming it is a string"
                );
            }
        }
    }
    serde_json::Value::String(raw.to_string())
}

/// Convert a TOML value into a template value.
///
/// Top-level strings go through [`parse_value`] (the JSON convention);
/// nested strings inside TOML tables and arrays are kept verbatim since
/// their structure is already explicit.
pub fn template_value(value: &toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => parse_value(s),
        other => toml_to_json(other),
    }
}

/// Structural TOML → JSON conversion, no string reinterpretation.
fn toml_to_json(value: &toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s.clone()),
        toml::Value::Integer(i) => serde_json::Value::from(*i),
        toml::Value::Float(f) => serde_json::Value::from(*f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(*b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => serde_json::Value::Object(
            table
                .iter()
                .map(|(k, v)| (k.clone(), toml_to_json(v)))
                .collect(),
        ),
    }
}
