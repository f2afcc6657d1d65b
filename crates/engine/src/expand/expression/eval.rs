//! Expression evaluation
//!
//! Evaluates a parsed expression against a per-event context. The scope is
//! the enumerated context bindings plus the record's own fields as implicit
//! locals; any other free name is an unbound-name error, never a silent
//! null. Out-of-range indexing and type mismatches are errors too - the
//! caller treats any error as "this template value failed to expand".

use serde_json::Value;
use thiserror::Error;

use super::ast::{BinOp, Expr};
use crate::context::EventContext;
use crate::expand::stringify;

#[cfg(test)]
#[path = "eval_test.rs"]
mod tests;

/// Errors raised while evaluating an expression
#[derive(Debug, Clone, Error)]
pub enum EvalError {
    /// A free name matched neither a context binding nor a record field
    #[error("undefined name `{0}`")]
    UnboundName(String),

    /// Array index outside the valid positive/negative range
    #[error("index {index} out of range for {len} elements")]
    OutOfRange {
        /// The requested index
        index: i64,
        /// Length of the indexed array
        len: usize,
    },

    /// Postfix accessor not in the supported set
    #[error("unknown method `{0}`")]
    UnknownMethod(String),

    /// Integer or float division by zero
    #[error("division by zero")]
    DivisionByZero,

    /// Operation applied to a value of the wrong type
    #[error("{0}")]
    Type(String),
}

/// Evaluate an expression against the event context.
pub fn eval(expr: &Expr, ctx: &EventContext) -> Result<Value, EvalError> {
    match expr {
        Expr::Nil => Ok(Value::Null),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Int(n) => Ok(Value::from(*n)),
        Expr::Float(f) => Ok(Value::from(*f)),
        Expr::Str(s) => Ok(Value::String(s.clone())),
        Expr::Name(name) => ctx
            .binding(name)
            .ok_or_else(|| EvalError::UnboundName(name.clone())),
        Expr::Index(base, index) => {
            let base = eval(base, ctx)?;
            let index = eval(index, ctx)?;
            index_value(&base, &index)
        }
        Expr::Method(base, name) => {
            let base = eval(base, ctx)?;
            call_method(&base, name)
        }
        Expr::Neg(inner) => negate(&eval(inner, ctx)?),
        Expr::Binary(op, lhs, rhs) => {
            let lhs = eval(lhs, ctx)?;
            let rhs = eval(rhs, ctx)?;
            binary(*op, &lhs, &rhs)
        }
    }
}

fn index_value(base: &Value, index: &Value) -> Result<Value, EvalError> {
    match base {
        Value::Array(items) => {
            let idx = index.as_i64().ok_or_else(|| {
                EvalError::Type(format!("array index must be an integer, got {}", kind(index)))
            })?;
            let len = items.len() as i64;
            let resolved = if idx < 0 { len + idx } else { idx };
            if resolved < 0 || resolved >= len {
                return Err(EvalError::OutOfRange {
                    index: idx,
                    len: items.len(),
                });
            }
            Ok(items[resolved as usize].clone())
        }
        Value::Object(map) => {
            let key = index.as_str().ok_or_else(|| {
                EvalError::Type(format!("map key must be a string, got {}", kind(index)))
            })?;
            // A present map with an absent key reads as null; only unbound
            // names and bad indices are errors
            Ok(map.get(key).cloned().unwrap_or(Value::Null))
        }
        other => Err(EvalError::Type(format!("cannot index {}", kind(other)))),
    }
}

fn call_method(base: &Value, name: &str) -> Result<Value, EvalError> {
    match name {
        "first" => match base {
            Value::Array(items) => Ok(items.first().cloned().unwrap_or(Value::Null)),
            other => Err(EvalError::Type(format!("cannot take first of {}", kind(other)))),
        },
        "last" => match base {
            Value::Array(items) => Ok(items.last().cloned().unwrap_or(Value::Null)),
            other => Err(EvalError::Type(format!("cannot take last of {}", kind(other)))),
        },
        "length" | "size" => match base {
            Value::Array(items) => Ok(Value::from(items.len())),
            Value::String(s) => Ok(Value::from(s.chars().count())),
            Value::Object(map) => Ok(Value::from(map.len())),
            other => Err(EvalError::Type(format!("{} has no length", kind(other)))),
        },
        "keys" => match base {
            Value::Object(map) => Ok(Value::Array(
                map.keys().map(|k| Value::String(k.clone())).collect(),
            )),
            other => Err(EvalError::Type(format!("{} has no keys", kind(other)))),
        },
        "to_s" => Ok(Value::String(stringify(base))),
        "to_i" => to_int(base),
        other => Err(EvalError::UnknownMethod(other.to_string())),
    }
}

fn to_int(value: &Value) -> Result<Value, EvalError> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::from(i))
            } else {
                Ok(Value::from(n.as_f64().unwrap_or(0.0) as i64))
            }
        }
        Value::String(s) => Ok(Value::from(leading_int(s))),
        Value::Null => Ok(Value::from(0)),
        other => Err(EvalError::Type(format!(
            "cannot convert {} to an integer",
            kind(other)
        ))),
    }
}

/// Parse the leading integer of a string, 0 when there is none.
fn leading_int(s: &str) -> i64 {
    let trimmed = s.trim_start();
    let mut end = 0;
    for (i, c) in trimmed.char_indices() {
        if c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+')) {
            end = i + c.len_utf8();
        } else {
            break;
        }
    }
    trimmed[..end].parse().unwrap_or(0)
}

fn negate(value: &Value) -> Result<Value, EvalError> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.checked_neg()
                    .map(Value::from)
                    .ok_or_else(|| EvalError::Type("integer overflow".to_string()))
            } else {
                Ok(Value::from(-n.as_f64().unwrap_or(0.0)))
            }
        }
        other => Err(EvalError::Type(format!("cannot negate {}", kind(other)))),
    }
}

fn binary(op: BinOp, lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
    match op {
        BinOp::Add => add(lhs, rhs),
        BinOp::Sub | BinOp::Mul | BinOp::Div => arithmetic(op, lhs, rhs),
        BinOp::Eq => Ok(Value::Bool(values_equal(lhs, rhs))),
        BinOp::Ne => Ok(Value::Bool(!values_equal(lhs, rhs))),
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => compare(op, lhs, rhs),
    }
}

fn add(lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
    match (lhs, rhs) {
        (Value::Number(_), Value::Number(_)) => arithmetic(BinOp::Add, lhs, rhs),
        (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{a}{b}"))),
        (Value::Array(a), Value::Array(b)) => {
            let mut out = a.clone();
            out.extend(b.iter().cloned());
            Ok(Value::Array(out))
        }
        _ => Err(EvalError::Type(format!(
            "cannot add {} and {}",
            kind(lhs),
            kind(rhs)
        ))),
    }
}

fn arithmetic(op: BinOp, lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
    let (Value::Number(a), Value::Number(b)) = (lhs, rhs) else {
        return Err(EvalError::Type(format!(
            "arithmetic needs numbers, got {} and {}",
            kind(lhs),
            kind(rhs)
        )));
    };

    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        let result = match op {
            BinOp::Add => a.checked_add(b),
            BinOp::Sub => a.checked_sub(b),
            BinOp::Mul => a.checked_mul(b),
            BinOp::Div => {
                if b == 0 {
                    return Err(EvalError::DivisionByZero);
                }
                a.checked_div(b)
            }
            _ => None,
        };
        return result
            .map(Value::from)
            .ok_or_else(|| EvalError::Type("integer overflow".to_string()));
    }

    let a = a.as_f64().unwrap_or(0.0);
    let b = b.as_f64().unwrap_or(0.0);
    let result = match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => {
            if b == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            a / b
        }
        _ => return Err(EvalError::Type("not an arithmetic operator".to_string())),
    };
    Ok(Value::from(result))
}

fn values_equal(lhs: &Value, rhs: &Value) -> bool {
    if let (Value::Number(a), Value::Number(b)) = (lhs, rhs) {
        // Cross int/float comparison
        return a.as_f64() == b.as_f64();
    }
    lhs == rhs
}

fn compare(op: BinOp, lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
    let ordering = match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .unwrap_or(0.0)
            .partial_cmp(&b.as_f64().unwrap_or(0.0)),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => {
            return Err(EvalError::Type(format!(
                "cannot compare {} and {}",
                kind(lhs),
                kind(rhs)
            )))
        }
    };
    let Some(ordering) = ordering else {
        return Err(EvalError::Type("incomparable values".to_string()));
    };
    let result = match op {
        BinOp::Lt => ordering.is_lt(),
        BinOp::Le => ordering.is_le(),
        BinOp::Gt => ordering.is_gt(),
        BinOp::Ge => ordering.is_ge(),
        _ => return Err(EvalError::Type("not a comparison operator".to_string())),
    };
    Ok(Value::Bool(result))
}

/// Human-readable value kind for error messages
fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "nil",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "map",
    }
}
