//! Tests for the typed reformer configuration

use super::*;
use serde_json::json;

#[test]
fn test_defaults() {
    let config = ReformConfig::new("reformed.${tag}");
    assert!(config.enabled);
    assert_eq!(config.mode, ExpandMode::Expression);
    assert!(!config.auto_typecast);
    assert!(!config.renew_record);
    assert!(config.fields.is_empty());
    config.validate().unwrap();
}

#[test]
fn test_builder() {
    let config = ReformConfig::new("t")
        .with_field("hostname", json!("${hostname}"))
        .with_remove_keys(vec!["message".to_string()])
        .with_keep_keys(vec!["kept".to_string()])
        .with_renew_record(true)
        .with_renew_time_key("produced_at")
        .with_mode(ExpandMode::Literal)
        .with_auto_typecast(true);
    assert_eq!(config.fields["hostname"], json!("${hostname}"));
    assert_eq!(config.remove_keys, vec!["message"]);
    assert_eq!(config.keep_keys, vec!["kept"]);
    assert!(config.renew_record);
    assert_eq!(config.renew_time_key.as_deref(), Some("produced_at"));
    assert_eq!(config.mode, ExpandMode::Literal);
    assert!(config.auto_typecast);
    config.validate().unwrap();
}

#[test]
fn test_empty_tag_rejected() {
    let err = ReformConfig::new("").validate().unwrap_err();
    assert!(err.contains("tag"));
}

#[test]
fn test_keep_keys_without_renew_record_rejected() {
    let err = ReformConfig::new("t")
        .with_keep_keys(vec!["a".to_string()])
        .validate()
        .unwrap_err();
    assert!(err.contains("renew_record"));
}

#[test]
fn test_try_from_instance_config() {
    let toml = r#"
tag = "reformed.${tag}"
remove_keys = "message,secret"
enable_expressions = false
auto_typecast = true

[record]
hostname = "${hostname}"
"#;
    let instance: ReformerInstanceConfig = toml::from_str(toml).unwrap();
    let config = ReformConfig::try_from(&instance).unwrap();
    assert_eq!(config.tag, "reformed.${tag}");
    assert_eq!(config.remove_keys, vec!["message", "secret"]);
    assert_eq!(config.mode, ExpandMode::Literal);
    assert!(config.auto_typecast);
    assert_eq!(config.fields["hostname"], json!("${hostname}"));
}

#[test]
fn test_try_from_defaults_to_expression_mode() {
    let instance: ReformerInstanceConfig = toml::from_str("tag = \"t\"").unwrap();
    let config = ReformConfig::try_from(&instance).unwrap();
    assert_eq!(config.mode, ExpandMode::Expression);
}

#[test]
fn test_try_from_missing_tag_fails() {
    let instance: ReformerInstanceConfig = toml::from_str("renew_record = true").unwrap();
    let err = ReformConfig::try_from(&instance).unwrap_err();
    assert!(err.contains("tag"));
}

#[test]
fn test_try_from_keep_keys_requires_renew_record() {
    let toml = r#"
tag = "t"
keep_keys = "a,b"
"#;
    let instance: ReformerInstanceConfig = toml::from_str(toml).unwrap();
    assert!(ReformConfig::try_from(&instance).is_err());
}
