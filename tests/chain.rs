//! Tests for automation step chain validation.
mod common;
use common::*;
use kousei::prelude::*;
use kousei::validator::StepArena;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_linear_journey_is_valid() {
    let steps = vec![
        entry_step("s1", "journey_1"),
        after_step("s2", "journey_1", "s1"),
        after_step("s3", "journey_1", "s2"),
    ];
    let graph = validate_journey_steps("journey_1", &steps).unwrap();
    assert_eq!(graph.entry_steps(), &["s1".to_string()]);
    assert_eq!(graph.activation_order(), vec!["s1", "s2", "s3"]);
    assert!(graph.unreachable().is_empty());
}

#[test]
fn test_journey_with_only_delayed_step_has_no_entry() {
    let steps = vec![after_step("s1", "journey_1", "s1")];
    let err = validate_journey_steps("journey_1", &steps).unwrap_err();
    assert_eq!(
        err,
        ValidationError::MissingEntryStep {
            journey_id: "journey_1".to_string()
        }
    );
}

#[test]
fn test_empty_journey_has_no_entry() {
    let err = validate_journey_steps("journey_1", &[]).unwrap_err();
    assert!(matches!(err, ValidationError::MissingEntryStep { .. }));
}

#[test]
fn test_archived_entry_step_does_not_count() {
    let mut entry = entry_step("s1", "journey_1");
    entry.archived_at = Some("2024-05-01T12:00:00.000Z".to_string());
    let err = validate_journey_steps("journey_1", &[entry]).unwrap_err();
    assert!(matches!(err, ValidationError::MissingEntryStep { .. }));
}

#[test]
fn test_dangling_step_reference() {
    let steps = vec![entry_step("s1", "journey_1"), after_step("s2", "journey_1", "s7")];
    let err = validate_journey_steps("journey_1", &steps).unwrap_err();
    assert_eq!(
        err,
        ValidationError::DanglingStepReference {
            step_id: "s2".to_string(),
            target: "s7".to_string(),
            path: "steps.s2.events[0].info.automationStepId".to_string(),
        }
    );
}

#[test]
fn test_every_referencing_event_is_resolved() {
    let events = [
        json!({ "type": "formResponse", "info": { "automationStepId": "missing" } }),
        json!({ "type": "formResponses", "info": { "automationStepId": "missing" } }),
        json!({ "type": "onError", "info": { "automationStepId": "missing" } }),
        json!({ "type": "ticketCompleted", "info": { "automationStepId": "missing" } }),
        json!({ "type": "onCallOutcome", "info": { "automationStepId": "missing", "outcome": "Answered" } }),
        json!({ "type": "onAIDecision", "info": { "automationStepId": "missing", "outcomes": ["yes"] } }),
        json!({ "type": "waitForTrigger", "info": { "automationStepId": "missing", "triggerId": "t1" } }),
    ];
    for event in events {
        let steps = vec![entry_step("s1", "journey_1"), step("s2", "journey_1", json!([event]))];
        let err = validate_journey_steps("journey_1", &steps).unwrap_err();
        assert!(
            matches!(err, ValidationError::DanglingStepReference { .. }),
            "{event} should be checked"
        );
    }
}

#[test]
fn test_after_action_cycle() {
    let steps = vec![
        entry_step("s1", "journey_1"),
        step(
            "s2",
            "journey_1",
            json!([{ "type": "afterAction", "info": { "automationStepId": "s3", "delayInMS": 0 } }]),
        ),
        after_step("s3", "journey_1", "s2"),
    ];
    let err = validate_journey_steps("journey_1", &steps).unwrap_err();
    assert_eq!(
        err,
        ValidationError::CyclicStepChain {
            journey_id: "journey_1".to_string(),
            cycle: vec!["s2".to_string(), "s3".to_string(), "s2".to_string()],
        }
    );
}

#[test]
fn test_self_reference_is_a_cycle() {
    let steps = vec![entry_step("s1", "journey_1"), after_step("s2", "journey_1", "s2")];
    let err = validate_journey_steps("journey_1", &steps).unwrap_err();
    assert!(err.to_string().contains("s2 -> s2"));
}

#[test]
fn test_on_error_loop_is_not_a_cycle() {
    let steps = vec![
        entry_step("s1", "journey_1"),
        step(
            "s2",
            "journey_1",
            json!([
                { "type": "afterAction", "info": { "automationStepId": "s1", "delayInMS": 0 } },
                { "type": "onError", "info": { "automationStepId": "s3" } }
            ]),
        ),
        step(
            "s3",
            "journey_1",
            json!([{ "type": "onError", "info": { "automationStepId": "s2" } }]),
        ),
    ];
    let graph = validate_journey_steps("journey_1", &steps).unwrap();
    assert_eq!(graph.reachable(), vec!["s1", "s2", "s3"]);
}

#[test]
fn test_unreachable_steps_are_reported() {
    let steps = vec![
        entry_step("s1", "journey_1"),
        step(
            "s2",
            "journey_1",
            json!([{ "type": "waitForTrigger", "info": { "automationStepId": "s3", "triggerId": "t1" } }]),
        ),
        step(
            "s3",
            "journey_1",
            json!([{ "type": "formResponse", "info": { "automationStepId": "s2" } }]),
        ),
    ];
    let graph = validate_journey_steps("journey_1", &steps).unwrap();
    assert_eq!(graph.unreachable(), vec!["s2", "s3"]);
    assert_eq!(graph.dependents("s2"), &["s3".to_string()]);
}

#[test]
fn test_arena_builds_chain_in_creation_order() {
    let mut arena = StepArena::new("journey_1");
    arena.insert(entry_step("s1", "journey_1")).unwrap();
    arena.insert(after_step("s2", "journey_1", "s1")).unwrap();

    let err = arena.insert(after_step("s4", "journey_1", "s3")).unwrap_err();
    assert!(matches!(err, ValidationError::DanglingStepReference { .. }));
    assert_eq!(arena.len(), 2);
    assert_eq!(arena.finish().unwrap().len(), 2);
}

#[test]
fn test_arena_update_closing_a_loop_is_rejected() {
    let mut arena = StepArena::new("journey_1");
    arena.insert(entry_step("s1", "journey_1")).unwrap();
    arena.insert(after_step("s2", "journey_1", "s1")).unwrap();
    arena.insert(after_step("s3", "journey_1", "s2")).unwrap();

    // Re-point s2 at s3, which already waits on s2.
    let err = arena.check(&after_step("s2", "journey_1", "s3")).unwrap_err();
    assert!(matches!(err, ValidationError::CyclicStepChain { .. }));
}

#[test]
fn test_arena_first_step_may_not_reference_itself() {
    let arena = StepArena::new("journey_1");
    let err = arena.check(&after_step("s1", "journey_1", "s1")).unwrap_err();
    assert!(matches!(err, ValidationError::DanglingStepReference { .. }));
}
