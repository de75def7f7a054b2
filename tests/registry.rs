//! Tests for the operation registry and field catalogs.
mod common;
use kousei::error::SchemaError;
use kousei::prelude::*;
use kousei::registry::catalog::operation_name;
use kousei::registry::{OperationHandler, OperationKind, schema_for};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

#[test]
fn test_every_resource_has_create_and_update() {
    let registry = Registry::default();
    assert_eq!(registry.operation_names().len(), 14);
    for kind in ResourceKind::ALL {
        for op in [OperationKind::Create, OperationKind::Update] {
            let name = operation_name(op, kind);
            let descriptor = registry.describe(&name).expect("operation should exist");
            assert_eq!(descriptor.kind, op);
            assert_eq!(descriptor.resource, kind);
        }
    }
    assert!(registry.contains("createAutomationTrigger"));
    assert!(!registry.contains("deleteForm"));
}

#[test]
fn test_unknown_operation() {
    let err = Registry::default()
        .invoke("deleteForm", &json!({}))
        .unwrap_err();
    assert!(matches!(err, OperationError::UnknownOperation(ref name) if name == "deleteForm"));
}

#[test]
fn test_create_input_is_decoded() {
    let invocation = Registry::default()
        .invoke(
            "createAutomationStep",
            &json!({
                "journeyId": "journey_1",
                "events": [{ "type": "onJourneyStart" }],
                "action": { "type": "removeFromAllJourneys" }
            }),
        )
        .unwrap();
    match invocation {
        Invocation::Create(ResourceDraft::AutomationStep(step)) => {
            assert_eq!(step.journey_id, "journey_1");
            assert!(step.is_entry());
        }
        other => panic!("unexpected invocation {other:?}"),
    }
}

#[test]
fn test_create_rejects_missing_and_unknown_fields() {
    let registry = Registry::default();
    let err = registry
        .invoke("createForm", &json!({ "description": "no title" }))
        .unwrap_err();
    assert!(matches!(
        err,
        OperationError::Schema(SchemaError::MissingField { ref field, .. }) if field == "title"
    ));

    let err = registry
        .invoke("createForm", &json!({ "title": "T", "colour": "red" }))
        .unwrap_err();
    assert!(matches!(
        err,
        OperationError::Schema(SchemaError::UnknownField { ref field, .. }) if field == "colour"
    ));
}

#[test]
fn test_create_rejects_generated_id() {
    let err = Registry::default()
        .invoke("createJourney", &json!({ "id": "journey_9", "title": "Onboarding" }))
        .unwrap_err();
    assert!(matches!(
        err,
        OperationError::Schema(SchemaError::ReadOnlyField { .. })
    ));
}

#[test]
fn test_create_rejects_bad_variant_with_path() {
    let err = Registry::default()
        .invoke(
            "createAutomationStep",
            &json!({
                "journeyId": "journey_1",
                "events": [
                    { "type": "onJourneyStart" },
                    { "type": "afterAction", "info": { "automationStepId": "step_1" } }
                ],
                "action": { "type": "removeFromAllJourneys" }
            }),
        )
        .unwrap_err();
    match err {
        OperationError::Schema(SchemaError::Variant(ValidationError::InvalidVariant {
            path,
            expected,
            ..
        })) => {
            assert_eq!(path, "events[1]");
            assert!(expected.starts_with("{type: \"afterAction\""));
        }
        other => panic!("expected an InvalidVariant, got {other:?}"),
    }
}

#[test]
fn test_create_rejects_empty_events() {
    let err = Registry::default()
        .invoke(
            "createAutomationStep",
            &json!({
                "journeyId": "journey_1",
                "events": [],
                "action": { "type": "removeFromAllJourneys" }
            }),
        )
        .unwrap_err();
    assert!(err.to_string().contains("non-empty"));
}

#[test]
fn test_create_runs_single_resource_checks() {
    let registry = Registry::default();
    let err = registry
        .invoke(
            "createAutomationTrigger",
            &json!({
                "title": "Enroll",
                "event": { "type": "Tag Added", "info": { "tag": "vip" } },
                "action": { "type": "Add To Journey", "info": { "journeyId": "journey_1" } },
                "journeyId": "journey_1"
            }),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        OperationError::Validation(ValidationError::UnexpectedJourneyIdOnGlobalTrigger { .. })
    ));

    let err = registry
        .invoke(
            "createFormField",
            &json!({
                "formId": "form_1",
                "title": "Pick one",
                "type": "multiple_choice",
                "options": { "choices": [] },
                "previousFields": [{ "type": "root" }]
            }),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        OperationError::Validation(ValidationError::InvalidOptions { .. })
    ));
}

#[test]
fn test_field_options_follow_type() {
    let registry = Registry::default();
    let field = |field_type: &str, options: Value| {
        json!({
            "formId": "form_1",
            "title": "Q",
            "type": field_type,
            "options": options,
            "previousFields": [{ "type": "root" }]
        })
    };

    assert!(registry.invoke("createFormField", &field("Dropdown", json!({ "choices": ["A", "B"] }))).is_ok());
    assert!(registry.invoke("createFormField", &field("Dropdown", json!({}))).is_err());
    assert!(registry.invoke("createFormField", &field("string", json!({ "choices": ["A"] }))).is_err());
    assert!(registry.invoke("createFormField", &field("rating", json!({ "from": 5, "to": 1 }))).is_err());
    assert!(registry.invoke("createFormField", &field("Redirect", json!({ "redirectUrl": "ftp://x" }))).is_err());
    assert!(registry.invoke("createFormField", &field("Redirect", json!({ "redirectUrl": "https://example.com" }))).is_ok());
}

#[test]
fn test_update_input_shape() {
    let registry = Registry::default();
    let invocation = registry
        .invoke(
            "updateForm",
            &json!({
                "id": "form_1",
                "updates": { "tags": ["intake"] },
                "options": { "replaceObjectFields": true }
            }),
        )
        .unwrap();
    match invocation {
        Invocation::Update { resource, request } => {
            assert_eq!(resource, ResourceKind::Form);
            assert_eq!(request.id, "form_1");
            assert!(request.is_replace());
            assert_eq!(request.updates_value(), json!({ "tags": ["intake"] }));
        }
        other => panic!("unexpected invocation {other:?}"),
    }
}

#[test]
fn test_update_rejections() {
    let registry = Registry::default();

    let err = registry
        .invoke("updateForm", &json!({ "id": "form_1", "updates": {} }))
        .unwrap_err();
    assert!(matches!(err, OperationError::Schema(SchemaError::EmptyUpdate { .. })));

    let err = registry
        .invoke("updateForm", &json!({ "updates": { "title": "x" } }))
        .unwrap_err();
    assert!(matches!(err, OperationError::MalformedInput { .. }));

    let err = registry
        .invoke(
            "updateFormField",
            &json!({ "id": "field_1", "updates": { "formId": "form_2" } }),
        )
        .unwrap_err();
    assert!(matches!(err, OperationError::Schema(SchemaError::ReadOnlyField { .. })));

    let err = registry
        .invoke(
            "updateForm",
            &json!({ "id": "form_1", "updates": { "title": "x" }, "force": true }),
        )
        .unwrap_err();
    assert!(err.to_string().contains("force"));
}

#[test]
fn test_partial_variant_update_is_allowed() {
    let invocation = Registry::default().invoke(
        "updateAutomationStep",
        &json!({ "id": "step_1", "updates": { "action": { "info": { "templateId": "tmpl_2" } } } }),
    );
    assert!(invocation.is_ok());
}

#[test]
fn test_alias_and_custom_operation() {
    struct CreateIntakeForm;
    impl OperationHandler for CreateIntakeForm {
        fn name(&self) -> &str {
            "createIntakeForm"
        }
        fn descriptor(&self) -> kousei::registry::OperationDescriptor {
            let mut descriptor = Registry::default()
                .describe("createForm")
                .expect("createForm is built in");
            descriptor.description = "Creates a form tagged as intake.".to_string();
            descriptor
        }
        fn prepare(&self, input: &Value) -> std::result::Result<Invocation, OperationError> {
            let mut input = input.clone();
            input["tags"] = json!(["intake"]);
            Registry::default().invoke("createForm", &input)
        }
    }

    let registry = Registry::builder()
        .with_alias("newForm", "createForm")
        .with_operation(Box::new(CreateIntakeForm))
        .build();
    assert_eq!(registry.describe("newForm").unwrap().name, "newForm");

    match registry.invoke("createIntakeForm", &json!({ "title": "Intake" })).unwrap() {
        Invocation::Create(ResourceDraft::Form(form)) => assert_eq!(form.tags, vec!["intake"]),
        other => panic!("unexpected invocation {other:?}"),
    }
}

#[test]
fn test_input_schemas() {
    let create = schema_for(ResourceKind::FormField).create_input_schema();
    assert_eq!(
        create["required"],
        json!(["formId", "title", "type", "previousFields"])
    );
    assert!(create["properties"].get("id").is_none());
    assert_eq!(create["properties"]["type"]["enum"][12], json!("multiple_choice"));

    let update = schema_for(ResourceKind::FormField).update_input_schema();
    assert!(update["properties"]["updates"]["properties"].get("formId").is_none());
    assert!(update["properties"]["updates"]["properties"].get("title").is_some());
}

#[test]
fn test_formatter_output() {
    let registry = Registry::default();
    let catalog = OperationFormatter::format_catalog(&registry.descriptors());
    assert_eq!(catalog.lines().count(), 14);
    assert!(catalog.lines().any(|l| l.starts_with("createForm ") && l.contains("Creates a Form")));

    let described =
        OperationFormatter::format_descriptor(&registry.describe("createAutomationStep").unwrap());
    assert!(described.starts_with("createAutomationStep (create AutomationStep)"));
    assert!(described.contains("journeyId"));
    assert!(described.contains("create-only"));
    assert!(described.contains("non-empty"));
    assert!(!described.contains("    id "));
}

#[test]
fn test_default_state_must_be_declared() {
    let registry = Registry::default();
    let journey = |default_state: &str| {
        json!({
            "title": "Care plan",
            "states": [
                { "name": "Enrolled", "priority": "Neutral" },
                { "name": "Graduated", "priority": "Low" }
            ],
            "defaultState": default_state
        })
    };
    assert!(registry.invoke("createJourney", &journey("Enrolled")).is_ok());
    let err = registry.invoke("createJourney", &journey("Paused")).unwrap_err();
    assert!(matches!(
        err,
        OperationError::Validation(ValidationError::DanglingReference { ref path, .. }) if path == "defaultState"
    ));
}
