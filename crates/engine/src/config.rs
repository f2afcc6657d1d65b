//! Reformer configuration
//!
//! Typed configuration consumed by the engine, with builder-style
//! construction for tests and embedders plus a `TryFrom` conversion from
//! the TOML-facing instance config.

use reform_config::ReformerInstanceConfig;
use serde_json::{Map, Value};

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

/// Which expansion strategy the engine uses
///
/// Selected once at configuration time; an engine never mixes strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpandMode {
    /// Closed placeholder token grammar, no evaluation
    Literal,
    /// Embedded expressions in a restricted scope
    #[default]
    Expression,
}

/// Configuration for the reform engine
#[derive(Debug, Clone)]
pub struct ReformConfig {
    /// Whether the reformer is enabled
    pub enabled: bool,
    /// Output tag template (required)
    pub tag: String,
    /// Field-template map: destination key → template value
    pub fields: Map<String, Value>,
    /// Keys removed from the output record after the merge
    pub remove_keys: Vec<String>,
    /// Keys carried over from the input record when renewing.
    /// Only valid together with `renew_record`.
    pub keep_keys: Vec<String>,
    /// Start the output record empty instead of copying the input
    pub renew_record: bool,
    /// Output record field to reinterpret as the event time
    pub renew_time_key: Option<String>,
    /// Expansion strategy
    pub mode: ExpandMode,
    /// Preserve native types for single-placeholder template values
    pub auto_typecast: bool,
}

impl ReformConfig {
    /// Create a config with the required output tag template
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            enabled: true,
            tag: tag.into(),
            fields: Map::new(),
            remove_keys: Vec::new(),
            keep_keys: Vec::new(),
            renew_record: false,
            renew_time_key: None,
            mode: ExpandMode::default(),
            auto_typecast: false,
        }
    }

    /// Add one field template
    pub fn with_field(mut self, key: impl Into<String>, template: Value) -> Self {
        self.fields.insert(key.into(), template);
        self
    }

    /// Replace the field-template map
    pub fn with_fields(mut self, fields: Map<String, Value>) -> Self {
        self.fields = fields;
        self
    }

    /// Set keys to remove after the merge
    pub fn with_remove_keys(mut self, keys: Vec<String>) -> Self {
        self.remove_keys = keys;
        self
    }

    /// Set keys to keep from the input record (requires renew_record)
    pub fn with_keep_keys(mut self, keys: Vec<String>) -> Self {
        self.keep_keys = keys;
        self
    }

    /// Start the output record empty
    pub fn with_renew_record(mut self, renew: bool) -> Self {
        self.renew_record = renew;
        self
    }

    /// Re-derive the event time from this output field
    pub fn with_renew_time_key(mut self, key: impl Into<String>) -> Self {
        self.renew_time_key = Some(key.into());
        self
    }

    /// Select the expansion strategy
    pub fn with_mode(mut self, mode: ExpandMode) -> Self {
        self.mode = mode;
        self
    }

    /// Preserve native types for single-placeholder values
    pub fn with_auto_typecast(mut self, auto_typecast: bool) -> Self {
        self.auto_typecast = auto_typecast;
        self
    }

    /// Disable the reformer
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.tag.is_empty() {
            return Err("`tag` must be specified".to_string());
        }
        if !self.keep_keys.is_empty() && !self.renew_record {
            return Err("`renew_record` must be true to use `keep_keys`".to_string());
        }
        Ok(())
    }
}

impl TryFrom<&ReformerInstanceConfig> for ReformConfig {
    type Error = String;

    fn try_from(config: &ReformerInstanceConfig) -> Result<Self, Self::Error> {
        config.validate().map_err(|e| e.to_string())?;

        let tag = config
            .effective_tag()
            .ok_or_else(|| "`tag` must be specified".to_string())?;

        let mut reform_config = ReformConfig::new(tag);
        reform_config.enabled = config.enabled;
        reform_config.fields = config.field_map();
        reform_config.remove_keys = config.remove_key_list().unwrap_or_default();
        reform_config.keep_keys = config.keep_key_list().unwrap_or_default();
        reform_config.renew_record = config.renew_record;
        reform_config.renew_time_key = config.renew_time_key.clone();
        reform_config.mode = if config.enable_expressions {
            ExpandMode::Expression
        } else {
            ExpandMode::Literal
        };
        reform_config.auto_typecast = config.auto_typecast;

        reform_config.validate()?;
        Ok(reform_config)
    }
}
