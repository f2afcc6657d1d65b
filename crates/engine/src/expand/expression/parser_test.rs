//! Tests for the template/expression parser

use super::*;

fn name(s: &str) -> Expr {
    Expr::Name(s.to_string())
}

#[test]
fn test_plain_text() {
    let segments = parse_template("just text").unwrap();
    assert_eq!(segments, vec![Segment::Literal("just text".to_string())]);
}

#[test]
fn test_empty_template() {
    assert_eq!(parse_template("").unwrap(), vec![]);
}

#[test]
fn test_single_splice() {
    let segments = parse_template("${tag}").unwrap();
    assert_eq!(segments, vec![Segment::Splice(name("tag"))]);
}

#[test]
fn test_mixed_text_and_splices() {
    let segments = parse_template("reformed.${tag}.out").unwrap();
    assert_eq!(
        segments,
        vec![
            Segment::Literal("reformed.".to_string()),
            Segment::Splice(name("tag")),
            Segment::Literal(".out".to_string()),
        ]
    );
}

#[test]
fn test_adjacent_literals_merged() {
    let segments = parse_template("a$b}c").unwrap();
    assert_eq!(segments, vec![Segment::Literal("a$b}c".to_string())]);
}

#[test]
fn test_index_with_integer() {
    let segments = parse_template("${tag_parts[0]}").unwrap();
    assert_eq!(
        segments,
        vec![Segment::Splice(Expr::index(name("tag_parts"), Expr::Int(0)))]
    );
}

#[test]
fn test_index_with_negative_integer() {
    let segments = parse_template("${tag_parts[-1]}").unwrap();
    assert_eq!(
        segments,
        vec![Segment::Splice(Expr::index(
            name("tag_parts"),
            Expr::Neg(Box::new(Expr::Int(1)))
        ))]
    );
}

#[test]
fn test_index_with_string_key() {
    for template in ["${record[\"foo\"]}", "${record['foo']}"] {
        let segments = parse_template(template).unwrap();
        assert_eq!(
            segments,
            vec![Segment::Splice(Expr::index(
                name("record"),
                Expr::Str("foo".to_string())
            ))]
        );
    }
}

#[test]
fn test_method_chain() {
    let segments = parse_template("${tags.last}").unwrap();
    assert_eq!(
        segments,
        vec![Segment::Splice(Expr::method(name("tags"), "last"))]
    );

    let segments = parse_template("${time.to_s}").unwrap();
    assert_eq!(
        segments,
        vec![Segment::Splice(Expr::method(name("time"), "to_s"))]
    );
}

#[test]
fn test_chained_postfix() {
    let segments = parse_template("${record[\"items\"].first}").unwrap();
    assert_eq!(
        segments,
        vec![Segment::Splice(Expr::method(
            Expr::index(name("record"), Expr::Str("items".to_string())),
            "first"
        ))]
    );
}

#[test]
fn test_keywords() {
    assert_eq!(
        parse_template("${nil}").unwrap(),
        vec![Segment::Splice(Expr::Nil)]
    );
    assert_eq!(
        parse_template("${true}").unwrap(),
        vec![Segment::Splice(Expr::Bool(true))]
    );
    // A name merely starting with a keyword stays a name
    assert_eq!(
        parse_template("${trueish}").unwrap(),
        vec![Segment::Splice(name("trueish"))]
    );
}

#[test]
fn test_number_literals() {
    assert_eq!(
        parse_template("${42}").unwrap(),
        vec![Segment::Splice(Expr::Int(42))]
    );
    assert_eq!(
        parse_template("${1.5}").unwrap(),
        vec![Segment::Splice(Expr::Float(1.5))]
    );
}

#[test]
fn test_arithmetic_precedence() {
    let segments = parse_template("${1 + 2 * 3}").unwrap();
    assert_eq!(
        segments,
        vec![Segment::Splice(Expr::binary(
            BinOp::Add,
            Expr::Int(1),
            Expr::binary(BinOp::Mul, Expr::Int(2), Expr::Int(3)),
        ))]
    );
}

#[test]
fn test_comparison() {
    let segments = parse_template("${time > 100}").unwrap();
    assert_eq!(
        segments,
        vec![Segment::Splice(Expr::binary(
            BinOp::Gt,
            name("time"),
            Expr::Int(100),
        ))]
    );
}

#[test]
fn test_parenthesized_group() {
    let segments = parse_template("${(1 + 2) * 3}").unwrap();
    assert_eq!(
        segments,
        vec![Segment::Splice(Expr::binary(
            BinOp::Mul,
            Expr::binary(BinOp::Add, Expr::Int(1), Expr::Int(2)),
            Expr::Int(3),
        ))]
    );
}

#[test]
fn test_whitespace_inside_splice() {
    let segments = parse_template("${ tag }").unwrap();
    assert_eq!(segments, vec![Segment::Splice(name("tag"))]);
}

#[test]
fn test_malformed_splice_is_an_error() {
    let err = parse_template("${unclosed").unwrap_err();
    assert!(err.message.contains("placeholder"));

    let err = parse_template("${]}").unwrap_err();
    assert!(err.message.contains("placeholder"));
}

#[test]
fn test_dollar_without_brace_is_literal() {
    let segments = parse_template("cost: $5").unwrap();
    assert_eq!(segments, vec![Segment::Literal("cost: $5".to_string())]);
}
