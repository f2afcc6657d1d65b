//! Per-event placeholder context
//!
//! A context snapshots everything a template may reference for one event:
//! the tag and its derived segment arrays, the event time, the engine's
//! hostname, and the input record. It is built fresh per event and
//! discarded after the reform call returns.
//!
//! Record fields are exposed two ways: always as `record["key"]`, and as a
//! bare name only when the key does not collide with a reserved context
//! name. When both collide, the reserved value wins for the bare name while
//! `record["key"]` keeps returning the record's own value.

use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::tag;

#[cfg(test)]
#[path = "context_test.rs"]
mod tests;

/// Context names that record fields can never shadow
pub const RESERVED_NAMES: &[&str] = &[
    "tag",
    "tags",
    "tag_parts",
    "tag_prefix",
    "tag_suffix",
    "time",
    "hostname",
    "record",
];

/// Immutable per-event snapshot of the bindings available to a template
#[derive(Debug)]
pub struct EventContext {
    tag: String,
    time: i64,
    hostname: String,
    tag_parts: Vec<String>,
    tag_prefix: Vec<String>,
    tag_suffix: Vec<String>,
    record: Map<String, Value>,

    /// Literal-mode token table: exact placeholder text → bound value,
    /// with both positive and negative indices precomputed
    tokens: HashMap<String, Value>,
}

impl EventContext {
    /// Build the context for one event. Pure; no I/O.
    pub fn build(tag: &str, time: i64, record: &Map<String, Value>, hostname: &str) -> Self {
        let tag_parts = tag::split(tag);
        let tag_prefix = tag::prefixes(&tag_parts);
        let tag_suffix = tag::suffixes(&tag_parts);

        let mut tokens = HashMap::new();
        tokens.insert("${tag}".to_string(), Value::String(tag.to_string()));
        tokens.insert("${time}".to_string(), Value::from(time));
        tokens.insert(
            "${hostname}".to_string(),
            Value::String(hostname.to_string()),
        );

        let arrays: [(&str, &[String]); 4] = [
            ("tags", &tag_parts),
            ("tag_parts", &tag_parts),
            ("tag_prefix", &tag_prefix),
            ("tag_suffix", &tag_suffix),
        ];
        for (name, items) in arrays {
            let len = items.len() as i64;
            for (i, item) in items.iter().enumerate() {
                let value = Value::String(item.clone());
                tokens.insert(format!("${{{name}[{i}]}}"), value.clone());
                tokens.insert(format!("${{{name}[{}]}}", i as i64 - len), value);
            }
        }

        for (key, value) in record {
            tokens.insert(format!("${{record[\"{key}\"]}}"), value.clone());
            if !RESERVED_NAMES.contains(&key.as_str()) {
                tokens.insert(format!("${{{key}}}"), value.clone());
            }
        }

        Self {
            tag: tag.to_string(),
            time,
            hostname: hostname.to_string(),
            tag_parts,
            tag_prefix,
            tag_suffix,
            record: record.clone(),
            tokens,
        }
    }

    /// Look up a literal placeholder token (exact text, e.g. `${tag_parts[-1]}`)
    pub fn token(&self, token: &str) -> Option<&Value> {
        self.tokens.get(token)
    }

    /// Resolve a bare name for expression evaluation.
    ///
    /// Reserved context names win over record fields; a record field is
    /// only reachable here when its key is not reserved. Returns `None`
    /// when the name is bound nowhere - callers raise an unbound-name
    /// error rather than defaulting to null.
    pub fn binding(&self, name: &str) -> Option<Value> {
        match name {
            "tag" => Some(Value::String(self.tag.clone())),
            "tags" | "tag_parts" => Some(string_array(&self.tag_parts)),
            "tag_prefix" => Some(string_array(&self.tag_prefix)),
            "tag_suffix" => Some(string_array(&self.tag_suffix)),
            "time" => Some(Value::from(self.time)),
            "hostname" => Some(Value::String(self.hostname.clone())),
            "record" => Some(Value::Object(self.record.clone())),
            _ => self.record.get(name).cloned(),
        }
    }

    /// The event's input tag
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The event's input time (epoch seconds)
    pub fn time(&self) -> i64 {
        self.time
    }

    /// The input record (read-only view)
    pub fn record(&self) -> &Map<String, Value> {
        &self.record
    }

    /// The tag's dot-delimited parts
    pub fn tag_parts(&self) -> &[String] {
        &self.tag_parts
    }
}

fn string_array(items: &[String]) -> Value {
    Value::Array(items.iter().map(|s| Value::String(s.clone())).collect())
}
