//! Template expansion strategies
//!
//! Two interchangeable expanders implement the `Expander` trait:
//!
//! - [`LiteralExpander`] resolves a closed placeholder token grammar
//!   against a precomputed token table. Safe mode: no evaluation.
//! - [`ExpressionExpander`] parses placeholders into expressions once at
//!   configuration time and evaluates them per event inside a restricted
//!   scope that exposes only the context's bindings.
//!
//! One expander is selected at configuration time; an engine never mixes
//! strategies at runtime.

mod literal;

pub mod expression;

pub use expression::ExpressionExpander;
pub use literal::LiteralExpander;

use serde_json::Value;

/// A template string compiled by an expander.
///
/// Each expander produces and consumes only its own variant; the engine
/// never hands one expander's output to the other.
#[derive(Debug, Clone)]
pub enum Compiled {
    /// Literal token scan. The source is kept verbatim and scanned per
    /// event against the context's token table.
    Pattern {
        /// Raw template text
        source: String,
        /// Value is used as a map key and must stringify
        force_string: bool,
    },
    /// Parsed expression interpolation program
    Program(expression::Program),
}

/// Canonical string representation of a bound value.
///
/// Strings render bare (no quotes), null renders empty, and everything
/// else uses its JSON representation.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
