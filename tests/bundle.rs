//! Tests for offline validation of exported bundles.
use kousei::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn export() -> Value {
    json!({
        "forms": [
            { "id": "form_1", "title": "Intake", "intakeFields": ["allergies"] }
        ],
        "formFields": [
            {
                "id": "field_1", "formId": "form_1", "title": "Name", "type": "string",
                "previousFields": [{ "type": "root" }]
            },
            {
                "id": "field_2", "formId": "form_1", "title": "Allergic?", "type": "multiple_choice",
                "options": { "choices": ["Yes", "No"], "radio": true },
                "previousFields": [{ "type": "after", "info": { "fieldId": "field_1" } }]
            },
            {
                "id": "field_3", "formId": "form_1", "title": "Which?", "type": "stringLong",
                "previousFields": [{
                    "type": "compoundLogic",
                    "info": {
                        "fieldId": "field_2", "priority": 0, "label": "Allergic",
                        "condition": { "$or": [
                            { "condition": { "field_2": "Yes" } },
                            { "condition": { "allergies": { "$exists": true } } }
                        ]}
                    }
                }]
            }
        ],
        "messageTemplates": [
            { "id": "tmpl_1", "title": "Welcome", "subject": "Hi", "message": "Welcome" }
        ],
        "calendarEventTemplates": [
            {
                "id": "cal_1", "title": "Consult", "durationInMinutes": 30,
                "reminders": [{ "type": "webhook", "msBeforeStartTime": 3_600_000 }]
            }
        ],
        "journeys": [
            { "id": "journey_1", "title": "Onboarding" }
        ],
        "automationSteps": [
            {
                "id": "step_1", "journeyId": "journey_1",
                "events": [{ "type": "onJourneyStart" }],
                "action": { "type": "sendEmail", "info": { "templateId": "tmpl_1", "senderId": "user_1" } }
            },
            {
                "id": "step_2", "journeyId": "journey_1",
                "events": [{ "type": "waitForTrigger", "info": { "automationStepId": "step_1", "triggerId": "trigger_1" } }],
                "action": { "type": "addEnduserTags", "info": { "tags": ["resumed"] } }
            }
        ],
        "automationTriggers": [
            {
                "id": "trigger_1", "title": "Resume", "journeyId": "journey_1",
                "event": { "type": "Tag Added", "info": { "tag": "ready" } },
                "action": { "type": "Move To Step" }
            },
            {
                "id": "trigger_2", "title": "Enroll",
                "event": { "type": "Form Submitted", "info": { "formId": "form_1" } },
                "action": { "type": "Add To Journey", "info": { "journeyId": "journey_1" } }
            }
        ]
    })
}

#[test]
fn test_valid_bundle_report() {
    let bundle = Bundle::from_value(&export()).unwrap();
    assert_eq!(bundle.form_fields.len(), 3);

    let report = bundle.validate_all(&ValidatorConfig::default()).unwrap();
    assert_eq!(report.forms.len(), 1);
    assert_eq!(report.forms[0].display_order(), vec!["field_1", "field_2", "field_3"]);
    assert_eq!(report.journeys[0].activation_order(), vec!["step_1", "step_2"]);
    assert_eq!(report.triggers, 2);
    assert_eq!(report.templates, 2);
}

#[test]
fn test_entries_need_ids() {
    let mut raw = export();
    raw["journeys"][0].as_object_mut().unwrap().remove("id");
    let err = Bundle::from_value(&raw).unwrap_err();
    assert!(err.to_string().contains("'id'"));
}

#[test]
fn test_unknown_section() {
    let mut raw = export();
    raw["webhooks"] = json!([]);
    let err = Bundle::from_value(&raw).unwrap_err();
    assert!(err.to_string().contains("unknown section 'webhooks'"));
}

#[test]
fn test_duplicate_root_in_bundle() {
    let mut raw = export();
    raw["formFields"][1]["previousFields"] = json!([{ "type": "root" }]);
    let bundle = Bundle::from_value(&raw).unwrap();
    assert!(matches!(
        bundle.validate_all(&ValidatorConfig::default()),
        Err(ValidationError::DuplicateRoot { .. })
    ));
}

#[test]
fn test_journey_without_steps_fails() {
    let mut raw = export();
    raw["journeys"]
        .as_array_mut()
        .unwrap()
        .push(json!({ "id": "journey_2", "title": "Empty" }));
    let bundle = Bundle::from_value(&raw).unwrap();
    assert_eq!(
        bundle.validate_all(&ValidatorConfig::default()).unwrap_err(),
        ValidationError::MissingEntryStep {
            journey_id: "journey_2".to_string()
        }
    );
}

#[test]
fn test_form_without_fields_fails() {
    let mut raw = export();
    raw["forms"]
        .as_array_mut()
        .unwrap()
        .push(json!({ "id": "form_2", "title": "Empty" }));
    let bundle = Bundle::from_value(&raw).unwrap();
    assert_eq!(
        bundle.validate_all(&ValidatorConfig::default()).unwrap_err(),
        ValidationError::MissingRoot {
            form_id: "form_2".to_string()
        }
    );
}

#[test]
fn test_misplaced_trigger_in_bundle() {
    let mut raw = export();
    raw["automationTriggers"][1]["journeyId"] = json!("journey_1");
    let bundle = Bundle::from_value(&raw).unwrap();
    assert!(matches!(
        bundle.validate_all(&ValidatorConfig::default()),
        Err(ValidationError::UnexpectedJourneyIdOnGlobalTrigger { .. })
    ));
}

#[test]
fn test_step_of_unknown_journey() {
    let mut raw = export();
    raw["automationSteps"][1]["journeyId"] = json!("journey_9");
    let bundle = Bundle::from_value(&raw).unwrap();
    assert!(matches!(
        bundle.validate_all(&ValidatorConfig::default()),
        Err(ValidationError::DanglingReference { ref target, .. }) if target == "journey_9"
    ));
}
