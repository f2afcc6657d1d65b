//! Literal placeholder expander
//!
//! Expands a closed, declarative token grammar with no expression
//! evaluation: `${name}`, `${name[index]}`, `${record["key"]}`, and the
//! legacy `__UPPER_SNAKE__` form. Tokens are matched verbatim against the
//! context's precomputed token table.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::warn;

use super::{stringify, Compiled};
use crate::context::EventContext;
use crate::{Expander, ReformResult};

#[cfg(test)]
#[path = "literal_test.rs"]
mod tests;

/// Placeholder token: `${ident}` with an optional integer or quoted-key
/// subscript, or a legacy `__UPPER_SNAKE__` token.
static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\$\{[A-Za-z0-9_.]+(?:\[(?:-?\d+|"[^"]*")\])?\}|__[A-Z_]+__"#).unwrap()
});

/// Matches when a template string is exactly one placeholder token
static SINGLE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?:\$\{[A-Za-z0-9_.]+(?:\[(?:-?\d+|"[^"]*")\])?\}|__[A-Z_]+__)$"#).unwrap()
});

/// Literal placeholder expander
///
/// Stateless between calls; safe to share across workers.
#[derive(Debug, Clone, Copy)]
pub struct LiteralExpander {
    auto_typecast: bool,
}

impl LiteralExpander {
    /// Create a new literal expander
    pub fn new(auto_typecast: bool) -> Self {
        Self { auto_typecast }
    }
}

impl Expander for LiteralExpander {
    fn compile(&self, source: &str, force_string: bool) -> ReformResult<Compiled> {
        // The token grammar needs no per-template preparation; tokens are
        // matched against the per-event table at expansion time.
        Ok(Compiled::Pattern {
            source: source.to_string(),
            force_string,
        })
    }

    fn expand(&self, compiled: &Compiled, ctx: &EventContext) -> Option<Value> {
        let Compiled::Pattern {
            source,
            force_string,
        } = compiled
        else {
            return None;
        };

        if self.auto_typecast && !force_string && SINGLE_TOKEN.is_match(source) {
            // Whole string is one token: return the bound value with its
            // native type preserved
            return match ctx.token(source) {
                Some(value) => Some(value.clone()),
                None => {
                    warn!(placeholder = source.as_str(), "unknown placeholder found");
                    Some(Value::Null)
                }
            };
        }

        let expanded = TOKEN.replace_all(source, |caps: &regex::Captures<'_>| {
            let token = &caps[0];
            match ctx.token(token) {
                Some(value) => stringify(value),
                None => {
                    warn!(placeholder = token, "unknown placeholder found");
                    String::new()
                }
            }
        });
        Some(Value::String(expanded.into_owned()))
    }

    fn name(&self) -> &'static str {
        "literal"
    }
}
