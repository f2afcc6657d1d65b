//! Expression expander
//!
//! Expands templates by evaluating embedded expressions in a restricted
//! scope that exposes exactly the context's bindings plus the record's own
//! fields as implicit locals, and nothing else.
//!
//! Template strings are compiled once at configuration time: every
//! `${expr}` span is parsed into an expression splice inside an
//! interpolation program. When auto-typecast is enabled and the entire
//! template value is exactly one span, the compiled program evaluates the
//! inner expression directly and preserves its native type instead of
//! forcing a string.
//!
//! Evaluation failures (undefined names, indexing nil, out-of-range
//! indices) are caught per template value: the value expands to null, a
//! warning carries the template text and the reason, and sibling fields
//! continue unaffected.

mod ast;
mod eval;
mod parser;

pub use ast::{BinOp, Expr, Segment};
pub use eval::{eval, EvalError};
pub use parser::{parse_template, ParseError};

use serde_json::Value;
use tracing::warn;

use super::{stringify, Compiled};
use crate::context::EventContext;
use crate::{Expander, ReformError, ReformResult};

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

/// A template string compiled into an interpolation program
#[derive(Debug, Clone)]
pub struct Program {
    source: String,
    kind: ProgramKind,
}

#[derive(Debug, Clone)]
enum ProgramKind {
    /// The whole template is exactly one placeholder span: evaluate the
    /// expression directly, preserving its native type
    Single(Expr),
    /// Mixed text and splices: always produces a string
    Text(Vec<Segment>),
}

impl Program {
    /// The original template text, for diagnostics
    pub fn source(&self) -> &str {
        &self.source
    }

    fn eval(&self, ctx: &EventContext) -> Result<Value, EvalError> {
        match &self.kind {
            ProgramKind::Single(expr) => eval(expr, ctx),
            ProgramKind::Text(segments) => {
                let mut out = String::new();
                for segment in segments {
                    match segment {
                        Segment::Literal(text) => out.push_str(text),
                        Segment::Splice(expr) => out.push_str(&stringify(&eval(expr, ctx)?)),
                    }
                }
                Ok(Value::String(out))
            }
        }
    }
}

/// Expression expander
///
/// Holds no per-event state; the evaluation scope is rebuilt from the
/// context on every call, so one instance is safe to share across workers.
#[derive(Debug, Clone, Copy)]
pub struct ExpressionExpander {
    auto_typecast: bool,
}

impl ExpressionExpander {
    /// Create a new expression expander
    pub fn new(auto_typecast: bool) -> Self {
        Self { auto_typecast }
    }
}

impl Expander for ExpressionExpander {
    fn compile(&self, source: &str, force_string: bool) -> ReformResult<Compiled> {
        let segments =
            parse_template(source).map_err(|e| ReformError::compile(source, e.to_string()))?;
        let kind = match segments.as_slice() {
            [Segment::Splice(expr)] if self.auto_typecast && !force_string => {
                ProgramKind::Single(expr.clone())
            }
            _ => ProgramKind::Text(segments),
        };
        Ok(Compiled::Program(Program {
            source: source.to_string(),
            kind,
        }))
    }

    fn expand(&self, compiled: &Compiled, ctx: &EventContext) -> Option<Value> {
        let Compiled::Program(program) = compiled else {
            return None;
        };
        match program.eval(ctx) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(
                    template = program.source(),
                    error = %e,
                    "failed to expand template"
                );
                None
            }
        }
    }

    fn name(&self) -> &'static str {
        "expression"
    }
}
