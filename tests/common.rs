//! Common test utilities for building resources and workspaces.
use kousei::prelude::*;
use serde_json::{Value, json};

/// Decodes a typed resource from JSON, panicking on malformed fixtures.
#[allow(dead_code)]
pub fn decode<T: serde::de::DeserializeOwned>(value: Value) -> T {
    serde_json::from_value(value).expect("fixture should decode")
}

/// A stored form field with the given links.
#[allow(dead_code)]
pub fn field(id: &str, form_id: &str, links: Value) -> FormField {
    decode(json!({
        "id": id,
        "formId": form_id,
        "title": format!("Question {id}"),
        "type": "string",
        "previousFields": links,
    }))
}

#[allow(dead_code)]
pub fn root_field(id: &str, form_id: &str) -> FormField {
    field(id, form_id, json!([{ "type": "root", "info": {} }]))
}

#[allow(dead_code)]
pub fn after_field(id: &str, form_id: &str, after: &str) -> FormField {
    field(id, form_id, json!([{ "type": "after", "info": { "fieldId": after } }]))
}

/// A stored automation step sending an email, activated by `events`.
#[allow(dead_code)]
pub fn step(id: &str, journey_id: &str, events: Value) -> AutomationStep {
    decode(json!({
        "id": id,
        "journeyId": journey_id,
        "events": events,
        "action": {
            "type": "sendEmail",
            "info": { "templateId": "tmpl_1", "senderId": "user_1" }
        },
    }))
}

#[allow(dead_code)]
pub fn entry_step(id: &str, journey_id: &str) -> AutomationStep {
    step(id, journey_id, json!([{ "type": "onJourneyStart", "info": {} }]))
}

#[allow(dead_code)]
pub fn after_step(id: &str, journey_id: &str, after: &str) -> AutomationStep {
    step(
        id,
        journey_id,
        json!([{
            "type": "afterAction",
            "info": { "automationStepId": after, "delayInMS": 86_400_000 }
        }]),
    )
}

#[allow(dead_code)]
pub fn trigger(action: Value, journey_id: Option<&str>) -> AutomationTrigger {
    let mut raw = json!({
        "title": "Intake submitted",
        "event": { "type": "Form Submitted", "info": { "formId": "form_1" } },
        "action": action,
    });
    if let Some(journey_id) = journey_id {
        raw["journeyId"] = json!(journey_id);
    }
    decode(raw)
}

/// A workspace over an empty in-memory platform with default configuration.
#[allow(dead_code)]
pub fn workspace() -> Workspace<InMemoryPlatform> {
    Workspace::new(InMemoryPlatform::new())
}

/// Runs `operation` and returns the id the platform assigned.
#[allow(dead_code)]
pub fn create(workspace: &mut Workspace<InMemoryPlatform>, operation: &str, input: Value) -> String {
    let created = workspace
        .invoke(operation, &input)
        .unwrap_or_else(|e| panic!("{operation} failed: {e}"));
    created["id"]
        .as_str()
        .expect("created resource should carry an id")
        .to_string()
}

#[allow(dead_code)]
pub fn field_input(form_id: &str, title: &str, links: Value) -> Value {
    json!({
        "formId": form_id,
        "title": title,
        "type": "string",
        "previousFields": links,
    })
}

#[allow(dead_code)]
pub fn step_input(journey_id: &str, events: Value) -> Value {
    json!({
        "journeyId": journey_id,
        "events": events,
        "action": { "type": "addEnduserTags", "info": { "tags": ["engaged"] } },
    })
}
