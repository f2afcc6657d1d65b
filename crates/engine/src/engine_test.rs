//! Tests for the reform engine

use super::*;
use serde_json::json;
use std::sync::atomic::Ordering;

fn record(value: serde_json::Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

fn reformer(config: ReformConfig) -> Reformer {
    Reformer::new(config).unwrap().with_hostname("test-host")
}

#[test]
fn test_basic_reform_literal_mode() {
    let config = ReformConfig::new("reformed.${tag}")
        .with_mode(ExpandMode::Literal)
        .with_field("hostname", json!("${hostname}"))
        .with_field("input_tag", json!("${tag}"))
        .with_field("message", json!("${hostname} ${tag_parts[-1]} ${message}"));
    let engine = reformer(config);

    let rec = record(json!({"eventType0": "type", "message": "hello"}));
    let out = engine.reform("foo.bar", 1_700_000_000, &rec).unwrap();

    assert_eq!(out.tag, "reformed.foo.bar");
    assert_eq!(out.time, 1_700_000_000);
    assert_eq!(out.record["hostname"], json!("test-host"));
    assert_eq!(out.record["input_tag"], json!("foo.bar"));
    assert_eq!(out.record["message"], json!("test-host bar hello"));
    // Input fields survive when renew_record is off
    assert_eq!(out.record["eventType0"], json!("type"));
}

#[test]
fn test_basic_reform_expression_mode() {
    let config = ReformConfig::new("reformed.${tag}")
        .with_field("message", json!("${hostname} ${tag_parts.last} ${message}"));
    let engine = reformer(config);

    let rec = record(json!({"message": "hello"}));
    let out = engine.reform("foo.bar", 0, &rec).unwrap();

    assert_eq!(out.tag, "reformed.foo.bar");
    assert_eq!(out.record["message"], json!("test-host bar hello"));
}

#[test]
fn test_reserved_key_precedence() {
    for mode in [ExpandMode::Literal, ExpandMode::Expression] {
        let config = ReformConfig::new("t")
            .with_mode(mode)
            .with_field("new_tag", json!("${tag}"))
            .with_field("new_record_tag", json!("${record[\"tag\"]}"));
        let engine = reformer(config);

        let rec = record(json!({"tag": "X", "time": "Y"}));
        let out = engine.reform("input.tag", 1, &rec).unwrap();

        assert_eq!(out.record["new_tag"], json!("input.tag"));
        assert_eq!(out.record["new_record_tag"], json!("X"));
    }
}

#[test]
fn test_auto_typecast_preserves_integer() {
    for mode in [ExpandMode::Literal, ExpandMode::Expression] {
        let config = ReformConfig::new("t")
            .with_mode(mode)
            .with_auto_typecast(true)
            .with_field("copied", json!("${count}"))
            .with_field("doubled", json!("${count}${count}"));
        let engine = reformer(config);

        let rec = record(json!({"count": 123}));
        let out = engine.reform("a", 0, &rec).unwrap();

        assert_eq!(out.record["copied"], json!(123));
        // Concatenation always yields a string, regardless of typecast
        assert_eq!(out.record["doubled"], json!("123123"));
    }
}

#[test]
fn test_remove_keys_applied_after_merge() {
    let config = ReformConfig::new("t")
        .with_field("message", json!("bar ${message}"))
        .with_field("removed_me", json!("${message}"))
        .with_remove_keys(vec!["removed_me".to_string(), "eventType0".to_string()]);
    let engine = reformer(config);

    let rec = record(json!({"eventType0": "type", "message": "hello"}));
    let out = engine.reform("a", 0, &rec).unwrap();

    // Template-produced and input keys listed in remove_keys never appear
    assert!(!out.record.contains_key("removed_me"));
    assert!(!out.record.contains_key("eventType0"));
    assert_eq!(out.record["message"], json!("bar hello"));
}

#[test]
fn test_keep_keys_with_renew_record() {
    let config = ReformConfig::new("t")
        .with_renew_record(true)
        .with_keep_keys(vec!["eventType0".to_string(), "count".to_string()])
        .with_field("added", json!("${message}"));
    let engine = reformer(config);

    let rec = record(json!({"eventType0": "type", "count": 7, "message": "hello"}));
    let out = engine.reform("a", 0, &rec).unwrap();

    // Exactly the kept keys (original types) plus template keys survive
    assert_eq!(out.record["eventType0"], json!("type"));
    assert_eq!(out.record["count"], json!(7));
    assert_eq!(out.record["added"], json!("hello"));
    assert!(!out.record.contains_key("message"));
    assert_eq!(out.record.len(), 3);
}

#[test]
fn test_renew_record_without_keep_keys() {
    let config = ReformConfig::new("t")
        .with_renew_record(true)
        .with_field("only", json!("value"));
    let engine = reformer(config);

    let rec = record(json!({"a": 1, "b": 2}));
    let out = engine.reform("a", 0, &rec).unwrap();

    assert_eq!(out.record.len(), 1);
    assert_eq!(out.record["only"], json!("value"));
}

#[test]
fn test_unknown_placeholder_literal_mode_still_emits() {
    let config = ReformConfig::new("t")
        .with_mode(ExpandMode::Literal)
        .with_field("message", json!("${unknown}"));
    let engine = reformer(config);

    let out = engine.reform("a", 0, &record(json!({}))).unwrap();
    // Event is emitted; the unknown token substitutes empty text
    assert_eq!(out.record["message"], json!(""));
}

#[test]
fn test_expression_failure_nulls_field_but_emits() {
    let config = ReformConfig::new("t")
        .with_field("bad", json!("${unknown}"))
        .with_field("good", json!("${message}"));
    let engine = reformer(config);

    let out = engine.reform("a", 0, &record(json!({"message": "m"}))).unwrap();
    assert_eq!(out.record["bad"], Value::Null);
    assert_eq!(out.record["good"], json!("m"));
}

#[test]
fn test_tag_expansion_failure_drops_event() {
    let config = ReformConfig::new("${unknown['bar']}");
    let engine = reformer(config);

    let events = vec![(0, record(json!({})))];
    let emitted = engine.process_batch("input", &events);

    assert!(emitted.is_empty());
    assert_eq!(engine.metrics().events_processed.load(Ordering::Relaxed), 1);
    assert_eq!(engine.metrics().events_dropped.load(Ordering::Relaxed), 1);
    assert_eq!(engine.metrics().events_emitted.load(Ordering::Relaxed), 0);
}

#[test]
fn test_renew_time_key_from_number() {
    let config = ReformConfig::new("t")
        .with_auto_typecast(true)
        .with_renew_time_key("produced_at")
        .with_field("produced_at", json!("${stamp}"));
    let engine = reformer(config);

    let rec = record(json!({"stamp": 1_600_000_000}));
    let out = engine.reform("a", 1_700_000_000, &rec).unwrap();
    assert_eq!(out.time, 1_600_000_000);
    assert_eq!(out.record["produced_at"], json!(1_600_000_000));
}

#[test]
fn test_renew_time_key_from_numeric_string() {
    let config = ReformConfig::new("t")
        .with_renew_time_key("produced_at")
        .with_field("produced_at", json!("${stamp}"));
    let engine = reformer(config);

    let rec = record(json!({"stamp": 1_600_000_000}));
    let out = engine.reform("a", 1_700_000_000, &rec).unwrap();
    // Without typecast the field is a string; it still renews the time
    assert_eq!(out.record["produced_at"], json!("1600000000"));
    assert_eq!(out.time, 1_600_000_000);
}

#[test]
fn test_renew_time_key_survives_remove_keys() {
    let config = ReformConfig::new("t")
        .with_auto_typecast(true)
        .with_renew_time_key("produced_at")
        .with_field("produced_at", json!("${stamp}"))
        .with_remove_keys(vec!["produced_at".to_string()]);
    let engine = reformer(config);

    let rec = record(json!({"stamp": 1_600_000_000}));
    let out = engine.reform("a", 1_700_000_000, &rec).unwrap();
    // The time is renewed even though the carrier field is stripped
    assert_eq!(out.time, 1_600_000_000);
    assert!(!out.record.contains_key("produced_at"));
}

#[test]
fn test_renew_time_key_non_numeric_keeps_input_time() {
    let config = ReformConfig::new("t")
        .with_renew_time_key("produced_at")
        .with_field("produced_at", json!("not a time"));
    let engine = reformer(config);

    let out = engine.reform("a", 42, &record(json!({}))).unwrap();
    assert_eq!(out.time, 42);
}

#[test]
fn test_nested_templates_end_to_end() {
    let config = ReformConfig::new("t")
        .with_mode(ExpandMode::Literal)
        .with_field(
            "hash_field",
            json!({"hostname": "${hostname}", "${tag}": 100}),
        )
        .with_field("array_field", json!(["${hostname}", "${tag}"]));
    let engine = reformer(config);

    let out = engine.reform("foo.bar", 0, &record(json!({}))).unwrap();
    assert_eq!(
        out.record["hash_field"],
        json!({"hostname": "test-host", "foo.bar": 100})
    );
    assert_eq!(out.record["array_field"], json!(["test-host", "foo.bar"]));
}

#[test]
fn test_process_batch_emits_per_event() {
    let config = ReformConfig::new("reformed.${tag}")
        .with_field("n", json!("${n}"))
        .with_auto_typecast(true);
    let engine = reformer(config);

    let events: Vec<(i64, Map<String, Value>)> = (0..3)
        .map(|i| (i, record(json!({"n": i}))))
        .collect();
    let emitted = engine.process_batch("foo", &events);

    assert_eq!(emitted.len(), 3);
    for (i, event) in emitted.iter().enumerate() {
        assert_eq!(event.tag, "reformed.foo");
        assert_eq!(event.time, i as i64);
        assert_eq!(event.record["n"], json!(i));
    }
    assert_eq!(engine.metrics().events_emitted.load(Ordering::Relaxed), 3);
    assert_eq!(engine.metrics().drop_rate(), 0.0);
}

#[test]
fn test_batch_continues_after_dropped_event() {
    // Tag expands from a record field: present for one event, absent for
    // the other, so one is routed and one is dropped
    let config = ReformConfig::new("${route}");
    let engine = reformer(config);

    let events = vec![
        (0, record(json!({"route": "a.b"}))),
        (1, record(json!({}))),
        (2, record(json!({"route": "c.d"}))),
    ];
    let emitted = engine.process_batch("input", &events);

    assert_eq!(emitted.len(), 2);
    assert_eq!(emitted[0].tag, "a.b");
    assert_eq!(emitted[1].tag, "c.d");
    assert_eq!(engine.metrics().events_dropped.load(Ordering::Relaxed), 1);
}

#[test]
fn test_invalid_config_rejected_at_construction() {
    let err = Reformer::new(ReformConfig::new("")).unwrap_err();
    assert!(matches!(err, ReformError::Config(_)));

    let err = Reformer::new(
        ReformConfig::new("t").with_keep_keys(vec!["a".to_string()]),
    )
    .unwrap_err();
    assert!(matches!(err, ReformError::Config(_)));
}

#[test]
fn test_malformed_expression_template_rejected_at_construction() {
    let err = Reformer::new(ReformConfig::new("${unclosed")).unwrap_err();
    assert!(matches!(err, ReformError::Compile { .. }));
}

#[test]
fn test_reformer_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Reformer>();
}
