//! Template and expression parser using winnow.
//!
//! Parses template strings into segments: literal text and `${expr}`
//! splices. Parsing happens once at configuration time; a malformed
//! expression is a configuration error, not a per-event failure.

use winnow::combinator::{alt, delimited, opt, preceded, repeat};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{any, take_while};

use super::ast::{BinOp, Expr, Segment};

#[cfg(test)]
#[path = "parser_test.rs"]
mod tests;

/// Error produced when a template string fails to parse
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message} at offset {offset}")]
pub struct ParseError {
    /// Byte offset of the failure in the template source
    pub offset: usize,
    /// What went wrong
    pub message: String,
}

/// Parse a template string into segments.
pub fn parse_template(input: &str) -> Result<Vec<Segment>, ParseError> {
    let mut remaining = input;
    let segments = template(&mut remaining).unwrap_or_default();
    if remaining.is_empty() {
        return Ok(segments);
    }
    let offset = input.len() - remaining.len();
    let message = if remaining.starts_with("${") {
        "invalid placeholder expression".to_string()
    } else {
        format!(
            "unexpected character '{}'",
            remaining.chars().next().unwrap_or('?')
        )
    };
    Err(ParseError { offset, message })
}

/// Parse a complete template into segments.
fn template(input: &mut &str) -> ModalResult<Vec<Segment>> {
    repeat(0.., segment).map(merge_literals).parse_next(input)
}

/// Merge adjacent Literal segments into single segments.
fn merge_literals(segments: Vec<Segment>) -> Vec<Segment> {
    let mut result: Vec<Segment> = Vec::with_capacity(segments.len());
    for segment in segments {
        match segment {
            Segment::Literal(text) => {
                if let Some(Segment::Literal(prev)) = result.last_mut() {
                    prev.push_str(&text);
                } else {
                    result.push(Segment::Literal(text));
                }
            }
            other => result.push(other),
        }
    }
    result
}

/// Parse a single segment (splice or literal character).
fn segment(input: &mut &str) -> ModalResult<Segment> {
    alt((splice, literal_char)).parse_next(input)
}

/// Parse a `${expr}` splice.
fn splice(input: &mut &str) -> ModalResult<Segment> {
    delimited(("${", ws), expr, (ws, '}'))
        .map(Segment::Splice)
        .parse_next(input)
}

/// Parse one literal character. Rejects the start of a splice so a
/// malformed `${...}` surfaces as a parse error instead of literal text.
fn literal_char(input: &mut &str) -> ModalResult<Segment> {
    let c = any.parse_next(input)?;
    if c == '$' && input.starts_with('{') {
        return Err(ErrMode::Backtrack(ContextError::new()));
    }
    Ok(Segment::Literal(c.to_string()))
}

/// Parse optional whitespace.
fn ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., |c: char| c.is_ascii_whitespace())
        .void()
        .parse_next(input)
}

/// Parse an expression (entry point: comparison precedence level).
pub(super) fn expr(input: &mut &str) -> ModalResult<Expr> {
    comparison(input)
}

/// Parse a comparison: `additive (op additive)?`
fn comparison(input: &mut &str) -> ModalResult<Expr> {
    let lhs = additive(input)?;
    match opt(preceded(ws, comparison_op)).parse_next(input)? {
        Some(op) => {
            let _ = ws(input)?;
            let rhs = additive(input)?;
            Ok(Expr::binary(op, lhs, rhs))
        }
        None => Ok(lhs),
    }
}

fn comparison_op(input: &mut &str) -> ModalResult<BinOp> {
    alt((
        "==".value(BinOp::Eq),
        "!=".value(BinOp::Ne),
        "<=".value(BinOp::Le),
        ">=".value(BinOp::Ge),
        '<'.value(BinOp::Lt),
        '>'.value(BinOp::Gt),
    ))
    .parse_next(input)
}

/// Parse additive chains: `term (('+'|'-') term)*`
fn additive(input: &mut &str) -> ModalResult<Expr> {
    let init = term(input)?;
    repeat(
        0..,
        (
            preceded(ws, alt(('+'.value(BinOp::Add), '-'.value(BinOp::Sub)))),
            preceded(ws, term),
        ),
    )
    .fold(
        move || init.clone(),
        |lhs, (op, rhs)| Expr::binary(op, lhs, rhs),
    )
    .parse_next(input)
}

/// Parse multiplicative chains: `unary (('*'|'/') unary)*`
fn term(input: &mut &str) -> ModalResult<Expr> {
    let init = unary(input)?;
    repeat(
        0..,
        (
            preceded(ws, alt(('*'.value(BinOp::Mul), '/'.value(BinOp::Div)))),
            preceded(ws, unary),
        ),
    )
    .fold(
        move || init.clone(),
        |lhs, (op, rhs)| Expr::binary(op, lhs, rhs),
    )
    .parse_next(input)
}

/// Parse unary minus or a postfix chain.
fn unary(input: &mut &str) -> ModalResult<Expr> {
    alt((
        preceded(('-', ws), unary).map(|e| Expr::Neg(Box::new(e))),
        postfix,
    ))
    .parse_next(input)
}

enum Postfix {
    Index(Expr),
    Method(String),
}

/// Parse a primary followed by any number of `[index]` / `.method` ops.
fn postfix(input: &mut &str) -> ModalResult<Expr> {
    let init = primary(input)?;
    repeat(0.., postfix_op)
        .fold(
            move || init.clone(),
            |base, op| match op {
                Postfix::Index(index) => Expr::index(base, index),
                Postfix::Method(name) => Expr::method(base, name),
            },
        )
        .parse_next(input)
}

fn postfix_op(input: &mut &str) -> ModalResult<Postfix> {
    alt((
        delimited(('[', ws), expr, (ws, ']')).map(Postfix::Index),
        preceded('.', identifier).map(|s: &str| Postfix::Method(s.to_string())),
    ))
    .parse_next(input)
}

/// Parse a primary expression: literal, name, or parenthesized group.
fn primary(input: &mut &str) -> ModalResult<Expr> {
    alt((
        number,
        string_literal,
        name_or_keyword,
        delimited(('(', ws), expr, (ws, ')')),
    ))
    .parse_next(input)
}

/// Parse an integer or float literal.
fn number(input: &mut &str) -> ModalResult<Expr> {
    let digits: &str = take_while(1.., |c: char| c.is_ascii_digit()).parse_next(input)?;
    let frac: Option<(char, &str)> =
        opt(('.', take_while(1.., |c: char| c.is_ascii_digit()))).parse_next(input)?;
    match frac {
        Some((_, frac_digits)) => format!("{digits}.{frac_digits}")
            .parse::<f64>()
            .map(Expr::Float)
            .map_err(|_| ErrMode::Backtrack(ContextError::new())),
        None => digits
            .parse::<i64>()
            .map(Expr::Int)
            .map_err(|_| ErrMode::Backtrack(ContextError::new())),
    }
}

/// Parse a single- or double-quoted string literal.
fn string_literal(input: &mut &str) -> ModalResult<Expr> {
    alt((
        delimited('"', take_while(0.., |c: char| c != '"'), '"'),
        delimited('\'', take_while(0.., |c: char| c != '\''), '\''),
    ))
    .map(|s: &str| Expr::Str(s.to_string()))
    .parse_next(input)
}

/// Parse an identifier, distinguishing keyword literals from names.
fn name_or_keyword(input: &mut &str) -> ModalResult<Expr> {
    identifier
        .map(|name: &str| match name {
            "true" => Expr::Bool(true),
            "false" => Expr::Bool(false),
            "nil" => Expr::Nil,
            other => Expr::Name(other.to_string()),
        })
        .parse_next(input)
}

/// Parse an identifier.
fn identifier<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    let start = *input;
    let first = any.parse_next(input)?;
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(ErrMode::Backtrack(ContextError::new()));
    }
    let rest: &str =
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_').parse_next(input)?;
    Ok(&start[..first.len_utf8() + rest.len()])
}
