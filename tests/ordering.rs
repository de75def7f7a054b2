//! Tests for form field ordering validation.
mod common;
use common::*;
use kousei::prelude::*;
use kousei::validator::FieldArena;
use pretty_assertions::assert_eq;
use serde_json::json;

fn keys() -> ConditionKeys {
    ConditionKeys::default()
}

#[test]
fn test_single_root_chain_is_valid() {
    let fields = vec![
        root_field("f1", "form_1"),
        after_field("f2", "form_1", "f1"),
        after_field("f3", "form_1", "f2"),
    ];
    let graph = validate_form_fields("form_1", &fields, &keys()).unwrap();
    assert_eq!(graph.root(), "f1");
    assert_eq!(graph.len(), 3);
    assert_eq!(graph.display_order(), vec!["f1", "f2", "f3"]);
    assert_eq!(graph.successors("f1"), &["f2".to_string()]);
}

#[test]
fn test_missing_root() {
    let fields = vec![after_field("f2", "form_1", "f1"), after_field("f1", "form_1", "f2")];
    let err = validate_form_fields("form_1", &fields, &keys()).unwrap_err();
    assert_eq!(
        err,
        ValidationError::MissingRoot {
            form_id: "form_1".to_string()
        }
    );
}

#[test]
fn test_duplicate_root() {
    let fields = vec![root_field("f1", "form_1"), root_field("f2", "form_1")];
    let err = validate_form_fields("form_1", &fields, &keys()).unwrap_err();
    assert_eq!(
        err,
        ValidationError::DuplicateRoot {
            form_id: "form_1".to_string(),
            field_ids: vec!["f1".to_string(), "f2".to_string()],
        }
    );
}

#[test]
fn test_archived_root_does_not_count() {
    let mut old_root = root_field("f0", "form_1");
    old_root.archived_at = Some("2024-01-01T00:00:00.000Z".to_string());
    let fields = vec![old_root, root_field("f1", "form_1"), after_field("f2", "form_1", "f0")];
    let graph = validate_form_fields("form_1", &fields, &keys()).unwrap();
    assert_eq!(graph.root(), "f1");
}

#[test]
fn test_dangling_after_link() {
    let fields = vec![root_field("f1", "form_1"), after_field("f2", "form_1", "f9")];
    let err = validate_form_fields("form_1", &fields, &keys()).unwrap_err();
    assert_eq!(
        err,
        ValidationError::DanglingReference {
            node_id: "f2".to_string(),
            target: "f9".to_string(),
            path: "fields.f2.previousFields[0].info.fieldId".to_string(),
        }
    );
}

#[test]
fn test_previous_equals_link_resolves() {
    let fields = vec![
        root_field("f1", "form_1"),
        field(
            "f2",
            "form_1",
            json!([{ "type": "previousEquals", "info": { "fieldId": "f1", "equals": "Yes" } }]),
        ),
    ];
    assert!(validate_form_fields("form_1", &fields, &keys()).is_ok());
}

#[test]
fn test_compound_logic_keys() {
    let compound = |key: &str| {
        json!([{
            "type": "compoundLogic",
            "info": {
                "fieldId": "f1",
                "priority": 1,
                "label": "Seniors",
                "condition": { "$and": [
                    { "condition": { "f1": "Yes" } },
                    { "condition": { key: { "$gt": 65 } } }
                ]}
            }
        }])
    };

    for key in ["f1", "Age", "dateOfBirth", "fields.allergyRisk"] {
        let fields = vec![root_field("f1", "form_1"), field("f2", "form_1", compound(key))];
        assert!(
            validate_form_fields("form_1", &fields, &keys()).is_ok(),
            "key '{key}' should resolve"
        );
    }

    let fields = vec![root_field("f1", "form_1"), field("f2", "form_1", compound("shoeSize"))];
    let err = validate_form_fields("form_1", &fields, &keys()).unwrap_err();
    assert_eq!(
        err.path(),
        "fields.f2.previousFields[0].info.condition.$and[1].condition.shoeSize"
    );
}

#[test]
fn test_scoring_titles_become_condition_keys() {
    let form: Form = decode(json!({
        "id": "form_1",
        "title": "PHQ-9",
        "scoring": [{ "title": "phq9", "fieldId": "f1", "response": "Often", "score": 3 }],
    }));
    let fields = vec![
        root_field("f1", "form_1"),
        field(
            "f2",
            "form_1",
            json!([{
                "type": "compoundLogic",
                "info": {
                    "fieldId": "f1", "priority": 0, "label": "High",
                    "condition": { "condition": { "phq9": { "$gte": 10 } } }
                }
            }]),
        ),
    ];
    assert!(validate_form_fields("form_1", &fields, &keys()).is_err());
    let with_form = keys().with_form(&form);
    assert!(validate_form_fields("form_1", &fields, &with_form).is_ok());
}

#[test]
fn test_question_group_sub_fields_must_exist() {
    let mut group = after_field("g", "form_1", "f1");
    group.field_type = FormFieldType::QuestionGroup;
    group.options.sub_fields = Some(vec![kousei::model::SubField {
        id: "f9".to_string(),
        is_optional: None,
    }]);
    let fields = vec![root_field("f1", "form_1"), group];
    let err = validate_form_fields("form_1", &fields, &keys()).unwrap_err();
    assert_eq!(err.path(), "fields.g.options.subFields[0].id");
}

#[test]
fn test_unsaved_field_is_rejected_from_set() {
    let mut unsaved = root_field("f1", "form_1");
    unsaved.id = None;
    let err = validate_form_fields("form_1", &[unsaved], &keys()).unwrap_err();
    assert_eq!(
        err,
        ValidationError::MissingId {
            path: "fields[0].id".to_string()
        }
    );
}

#[test]
fn test_arena_accepts_fields_in_creation_order() {
    let mut arena = FieldArena::new("form_1", keys());
    arena.insert(root_field("f1", "form_1")).unwrap();
    arena.insert(after_field("f2", "form_1", "f1")).unwrap();
    assert_eq!(arena.len(), 2);
    assert_eq!(arena.finish().unwrap().display_order(), vec!["f1", "f2"]);
}

#[test]
fn test_arena_rejects_forward_reference() {
    let mut arena = FieldArena::new("form_1", keys());
    arena.insert(root_field("f1", "form_1")).unwrap();
    let err = arena.insert(after_field("f3", "form_1", "f2")).unwrap_err();
    assert!(matches!(err, ValidationError::DanglingReference { ref target, .. } if target == "f2"));
    assert_eq!(arena.len(), 1);
}

#[test]
fn test_arena_rejects_second_root_early() {
    let mut arena = FieldArena::new("form_1", keys());
    arena.insert(root_field("f1", "form_1")).unwrap();
    let err = arena.check(&root_field("f2", "form_1")).unwrap_err();
    assert!(matches!(err, ValidationError::DuplicateRoot { .. }));

    // Updating the existing root keeps a single root.
    let mut retitled = root_field("f1", "form_1");
    retitled.title = "What is your name?".to_string();
    arena.insert(retitled).unwrap();
    assert_eq!(arena.get("f1").unwrap().title, "What is your name?");
    assert_eq!(arena.len(), 1);
}

#[test]
fn test_arena_without_root_fails_on_finish() {
    let mut arena = FieldArena::new("form_1", keys());
    let mut orphan = after_field("f1", "form_1", "f1");
    orphan.previous_fields.clear();
    arena.insert(orphan).unwrap();
    assert!(matches!(
        arena.finish(),
        Err(ValidationError::MissingRoot { .. })
    ));
}
