//! Structural template recursion
//!
//! A template value mirrors the JSON shape of a record: a string with
//! embedded placeholders, a nested map whose keys are themselves
//! templates, a nested array, or a plain scalar. Compilation walks the
//! structure once at configuration time; expansion walks the compiled
//! mirror per event, preserving nesting, order and length.

use serde_json::{Map, Value};

use crate::context::EventContext;
use crate::expand::{stringify, Compiled};
use crate::{Expander, ReformResult};

#[cfg(test)]
#[path = "template_test.rs"]
mod tests;

/// A compiled template value
#[derive(Debug, Clone)]
pub enum Template {
    /// A template string
    Text(Compiled),
    /// Nested map; keys are compiled with force-string so they always
    /// expand to strings
    Map(Vec<(Compiled, Template)>),
    /// Nested array, expanded positionally
    Array(Vec<Template>),
    /// Non-string scalar, passed through unchanged
    Scalar(Value),
}

impl Template {
    /// Compile a raw template value through the given expander.
    pub fn compile(source: &Value, expander: &dyn Expander) -> ReformResult<Self> {
        match source {
            Value::String(s) => Ok(Self::Text(expander.compile(s, false)?)),
            Value::Object(map) => {
                let mut entries = Vec::with_capacity(map.len());
                for (key, value) in map {
                    entries.push((expander.compile(key, true)?, Self::compile(value, expander)?));
                }
                Ok(Self::Map(entries))
            }
            Value::Array(items) => items
                .iter()
                .map(|item| Self::compile(item, expander))
                .collect::<ReformResult<Vec<_>>>()
                .map(Self::Array),
            other => Ok(Self::Scalar(other.clone())),
        }
    }

    /// Expand for one event.
    ///
    /// `None` means this template value failed to expand as a whole.
    /// Failures nested inside a map or array degrade to null in place so
    /// sibling entries are unaffected.
    pub fn expand(&self, expander: &dyn Expander, ctx: &EventContext) -> Option<Value> {
        match self {
            Self::Text(compiled) => expander.expand(compiled, ctx),
            Self::Map(entries) => {
                let mut out = Map::new();
                for (key, value) in entries {
                    // A key that fails to expand drops its entry; the
                    // expander has already logged the failure
                    let Some(key) = expander.expand(key, ctx) else {
                        continue;
                    };
                    let expanded = value.expand(expander, ctx).unwrap_or(Value::Null);
                    out.insert(stringify(&key), expanded);
                }
                Some(Value::Object(out))
            }
            Self::Array(items) => Some(Value::Array(
                items
                    .iter()
                    .map(|item| item.expand(expander, ctx).unwrap_or(Value::Null))
                    .collect(),
            )),
            Self::Scalar(value) => Some(value.clone()),
        }
    }
}
