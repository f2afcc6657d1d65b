//! Reformer configuration
//!
//! Defines a reformer instance: the output tag template, record-shaping
//! options, and the field-template map. Built-in option names are captured
//! by named fields; every remaining top-level key is a destination-key →
//! template-value pair. The same mapping can also be declared under a
//! nested `record` table; both forms populate one field-template map.
//!
//! # Example
//!
//! ```toml
//! tag = "reformed.${tag}"
//! remove_keys = "message"
//! renew_record = false
//!
//! [record]
//! hostname = "${hostname}"
//! input_tag = "${tag}"
//! message = "${hostname} ${tag_parts[-1]} ${message}"
//! ```

use serde::Deserialize;
use std::collections::HashMap;
use tracing::warn;

use crate::error::{ConfigError, Result};
use crate::value::template_value;

/// Configuration for a single reformer instance
///
/// Deserialized from TOML. Unknown top-level keys become entries in the
/// field-template map rather than errors.
#[derive(Debug, Clone, Deserialize)]
pub struct ReformerInstanceConfig {
    /// Output tag template (required)
    #[serde(default)]
    pub tag: Option<String>,

    /// Deprecated alias for `tag`
    #[serde(default)]
    pub output_tag: Option<String>,

    /// Record keys to remove after the template merge, comma-separated
    #[serde(default)]
    pub remove_keys: Option<String>,

    /// Record keys to carry over from the input record, comma-separated.
    /// Only valid together with `renew_record`.
    #[serde(default)]
    pub keep_keys: Option<String>,

    /// Start the output record empty instead of copying the input record
    #[serde(default)]
    pub renew_record: bool,

    /// Output record field to reinterpret as the event time
    #[serde(default)]
    pub renew_time_key: Option<String>,

    /// Evaluate placeholders as expressions (default) instead of the
    /// literal token grammar
    #[serde(default = "default_true")]
    pub enable_expressions: bool,

    /// Preserve a bound value's native type when a template value is
    /// exactly one placeholder
    #[serde(default)]
    pub auto_typecast: bool,

    /// Whether this reformer is enabled (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Field-template map declared as a nested table
    #[serde(default)]
    pub record: Option<HashMap<String, toml::Value>>,

    /// Field-template map declared as top-level keys
    #[serde(flatten)]
    pub fields: HashMap<String, toml::Value>,
}

fn default_true() -> bool {
    true
}

impl Default for ReformerInstanceConfig {
    fn default() -> Self {
        Self {
            tag: None,
            output_tag: None,
            remove_keys: None,
            keep_keys: None,
            renew_record: false,
            renew_time_key: None,
            enable_expressions: true,
            auto_typecast: false,
            enabled: true,
            record: None,
            fields: HashMap::new(),
        }
    }
}

impl ReformerInstanceConfig {
    /// The effective output tag template.
    ///
    /// Falls back to the deprecated `output_tag` option with a warning.
    pub fn effective_tag(&self) -> Option<&str> {
        if let Some(tag) = self.tag.as_deref() {
            return Some(tag);
        }
        if let Some(tag) = self.output_tag.as_deref() {
            warn!("`output_tag` is deprecated, use `tag` instead");
            return Some(tag);
        }
        None
    }

    /// Build the field-template map from top-level keys and the nested
    /// `record` table. Entries from the `record` table win on conflicts.
    pub fn field_map(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut map = serde_json::Map::new();
        for (key, value) in &self.fields {
            map.insert(key.clone(), template_value(value));
        }
        if let Some(record) = &self.record {
            for (key, value) in record {
                map.insert(key.clone(), template_value(value));
            }
        }
        map
    }

    /// Keys to remove after the merge, split on commas
    pub fn remove_key_list(&self) -> Option<Vec<String>> {
        self.remove_keys
            .as_deref()
            .map(|s| s.split(',').map(str::to_string).collect())
    }

    /// Keys to keep when renewing the record, split on commas
    pub fn keep_key_list(&self) -> Option<Vec<String>> {
        self.keep_keys
            .as_deref()
            .map(|s| s.split(',').map(str::to_string).collect())
    }

    /// Validate the configuration
    ///
    /// # Errors
    /// - `tag` (or the deprecated `output_tag`) must be present
    /// - `keep_keys` requires `renew_record = true`
    pub fn validate(&self) -> Result<()> {
        if self.tag.is_none() && self.output_tag.is_none() {
            return Err(ConfigError::missing_field("tag"));
        }
        if self.keep_keys.is_some() && !self.renew_record {
            return Err(ConfigError::RequiresOption {
                field: "keep_keys",
                requires: "renew_record",
            });
        }
        Ok(())
    }
}
