//! Tests for `{type, info}` decoding and the variant tables.
mod common;
use kousei::codec::{self, TaggedUnion, describe_union};
use kousei::model::{ActionClass, ReminderKind};
use kousei::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_decode_known_variant() {
    let raw = json!({
        "type": "afterAction",
        "info": { "automationStepId": "step_1", "delayInMS": 3_600_000, "unit": "Hours", "delay": 1 }
    });
    let event = StepEvent::decode(&raw, "events[0]").expect("afterAction should decode");
    assert_eq!(event.tag(), "afterAction");
    assert_eq!(event.referenced_step(), Some("step_1"));
    assert!(event.chains());
}

#[test]
fn test_missing_info_is_empty_object() {
    let event: StepEvent = codec::decode(&json!({ "type": "onJourneyStart" }), "events[0]")
        .expect("info defaults to {}");
    assert!(event.is_entry());
    assert_eq!(event.encode().unwrap(), json!({ "type": "onJourneyStart", "info": {} }));
}

#[test]
fn test_unknown_type_lists_known_tags() {
    let err = StepEvent::decode(&json!({ "type": "onFullMoon", "info": {} }), "events[2]")
        .expect_err("unknown tag must fail");
    match err {
        ValidationError::InvalidVariant { path, expected, message } => {
            assert_eq!(path, "events[2]");
            assert!(expected.contains("\"onJourneyStart\""));
            assert!(message.contains("onFullMoon"));
        }
        other => panic!("expected InvalidVariant, got {other:?}"),
    }
}

#[test]
fn test_missing_required_info_key() {
    let err = StepAction::decode(
        &json!({ "type": "sendEmail", "info": { "templateId": "tmpl_1" } }),
        "action",
    )
    .expect_err("senderId is required");
    assert_eq!(err.path(), "action");
    assert_eq!(
        err.expected(),
        "{type: \"sendEmail\", info: {templateId, senderId, hiddenFromTimeline?}}"
    );
    assert!(err.to_string().contains("senderId"));
}

#[test]
fn test_unpermitted_info_key() {
    let err = PreviousFieldLink::decode(
        &json!({ "type": "root", "info": { "fieldId": "field_1" } }),
        "previousFields[0]",
    )
    .expect_err("root takes no info keys");
    assert!(matches!(err, ValidationError::InvalidVariant { .. }));
    assert!(err.to_string().contains("'fieldId' is not permitted"));
}

#[test]
fn test_wrong_info_value_type() {
    let err = StepEvent::decode(
        &json!({ "type": "afterAction", "info": { "automationStepId": "s", "delayInMS": "soon" } }),
        "events[0]",
    )
    .expect_err("delayInMS must be a number");
    assert!(matches!(err, ValidationError::InvalidVariant { .. }));
}

#[test]
fn test_non_object_variant() {
    let err = TriggerAction::decode(&json!("Add To Journey"), "action").unwrap_err();
    assert!(err.to_string().contains("expected an object, found string"));
}

#[test]
fn test_trigger_action_classes() {
    let global = [
        json!({ "type": "Add To Journey", "info": { "journeyId": "j" } }),
        json!({ "type": "Remove From Journey", "info": { "journeyId": "j" } }),
        json!({ "type": "Remove From All Journeys", "info": {} }),
        json!({ "type": "Add Tags", "info": { "tags": ["vip"] } }),
        json!({ "type": "Remove Tags", "info": { "tags": ["vip"] } }),
        json!({ "type": "Set Fields", "info": { "fields": { "risk": "high" } } }),
    ];
    for raw in &global {
        let action = TriggerAction::decode(raw, "action").unwrap();
        assert_eq!(action.class(), ActionClass::GlobalMembership, "{raw}");
    }
    let step = TriggerAction::decode(&json!({ "type": "Move To Step" }), "action").unwrap();
    assert_eq!(step.class(), ActionClass::StepActivation);
}

#[test]
fn test_reminder_flattens_next_to_timing() {
    let template: CalendarEventTemplate = common::decode(json!({
        "id": "cal_1",
        "title": "Initial consult",
        "durationInMinutes": 30,
        "reminders": [{
            "type": "add-to-journey",
            "info": { "journeyId": "journey_1" },
            "msBeforeStartTime": 86_400_000
        }]
    }));
    let reminder = &template.reminders[0];
    assert_eq!(reminder.ms_before_start_time, 86_400_000);
    assert!(matches!(reminder.kind, ReminderKind::AddToJourney(_)));
    assert_eq!(reminder.kind.referenced_journey(), Some("journey_1"));
}

#[test]
fn test_form_field_type_tags_match_serde() {
    for field_type in FormFieldType::ALL {
        let encoded = serde_json::to_value(field_type).unwrap();
        assert_eq!(encoded, json!(field_type.tag()));
        assert_eq!(FormFieldType::from_tag(field_type.tag()), Some(field_type));
    }
    assert_eq!(FormFieldType::from_tag("checkbox"), None);
}

#[test]
fn test_describe_union_covers_every_variant() {
    let described = describe_union::<PreviousFieldLink>();
    assert_eq!(
        described,
        "{type: \"root\", info: {}} | {type: \"after\", info: {fieldId}} | \
         {type: \"previousEquals\", info: {fieldId, equals}} | \
         {type: \"compoundLogic\", info: {fieldId, priority, label, condition}}"
    );
    assert_eq!(StepEvent::tags().len(), 10);
    assert_eq!(StepAction::tags().len(), 16);
    assert_eq!(TriggerEvent::tags().len(), 13);
}

#[test]
fn test_condition_rejects_malformed_nodes() {
    let bad = json!({ "$and": { "condition": { "age": 3 } } });
    let err = Condition::parse(&bad, "condition").unwrap_err();
    assert_eq!(err.path(), "condition.$and");

    let leaf = Condition::parse(&json!({ "condition": {} }), "c").unwrap_err();
    assert!(leaf.to_string().contains("no keys"));
}

#[test]
fn test_condition_leaf_keys() {
    let condition = Condition::parse(
        &json!({
            "$or": [
                { "condition": { "field_1": "Yes" } },
                { "$and": [{ "condition": { "age": { "$gt": 65 } } }] }
            ]
        }),
        "condition",
    )
    .unwrap();
    let keys: Vec<(String, &str)> = condition.leaf_keys("base");
    assert_eq!(
        keys,
        vec![
            ("base.$or[0].condition.field_1".to_string(), "field_1"),
            ("base.$or[1].$and[0].condition.age".to_string(), "age"),
        ]
    );
}

#[test]
fn test_plain_serde_decode_uses_shape_table() {
    let action: TriggerAction =
        serde_json::from_value(json!({ "type": "Remove From All Journeys" })).expect("info defaults to {}");
    assert_eq!(action.tag(), "Remove From All Journeys");

    let err = serde_json::from_value::<StepAction>(json!({
        "type": "sendEmail",
        "info": { "templateId": "tmpl_1", "senderId": "u1", "bogus": 1 }
    }))
    .unwrap_err();
    assert!(err.to_string().contains("key 'bogus' is not permitted"));
}
