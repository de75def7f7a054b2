//! Tests for validator configuration loading.
use kousei::error::ConfigError;
use kousei::prelude::*;
use kousei::validator::ConditionKeys;
use pretty_assertions::assert_eq;

#[test]
fn test_defaults() {
    let config = ValidatorConfig::default();
    assert!(config.strict_references);
    assert!(!config.require_known_triggers);
    assert!(config.warn_on_unread_replace);
    assert!(config.derived_condition_keys.contains(&"age".to_string()));
}

#[test]
fn test_partial_yaml_keeps_other_defaults() {
    let config = ValidatorConfig::from_yaml_str(
        "derived_condition_keys: [age, riskScore]\nstrict_references: false\n",
    )
    .unwrap();
    assert_eq!(config.derived_condition_keys, vec!["age", "riskScore"]);
    assert!(!config.strict_references);
    assert_eq!(
        config.enduser_properties,
        ValidatorConfig::default().enduser_properties
    );
}

#[test]
fn test_empty_document_is_default() {
    assert_eq!(
        ValidatorConfig::from_yaml_str("  \n").unwrap(),
        ValidatorConfig::default()
    );
}

#[test]
fn test_parse_error_names_source() {
    let err = ValidatorConfig::from_yaml_str("strict_references: [oops").unwrap_err();
    assert!(matches!(err, ConfigError::Parse { ref source_label, .. } if source_label == "<inline>"));
}

#[test]
fn test_missing_file() {
    let err = ValidatorConfig::from_file("/nonexistent/kousei.yaml").unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn test_from_file() {
    let path = std::env::temp_dir().join(format!("kousei-config-{}.yaml", std::process::id()));
    std::fs::write(&path, "allow_custom_enduser_fields: false\n").unwrap();
    let config = ValidatorConfig::from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert!(!config.allow_custom_enduser_fields);
    let keys = ConditionKeys::from_config(&config);
    assert!(!keys.is_enduser_property("fields.allergyRisk"));
    assert!(keys.is_enduser_property("email"));
}

#[test]
fn test_condition_keys() {
    let keys = ConditionKeys::default();
    assert!(keys.is_derived("BMI"));
    assert!(keys.is_enduser_property("fields.custom"));
    assert!(!keys.is_enduser_property("fields."));
    assert!(keys.resolves("field_1", |id| id == "field_1"));
    assert!(!keys.resolves("shoeSize", |_| false));
}
