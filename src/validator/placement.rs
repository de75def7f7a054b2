use crate::codec::TaggedUnion;
use crate::error::ValidationError;
use crate::model::{ActionClass, AutomationTrigger, Resource};
use tracing::debug;

/// Checks that the top-level `journeyId` of `trigger` matches its action class.
///
/// Global-membership actions carry their target journey in `action.info` and must leave the
/// top-level field unset; `Move To Step` activates a waiting step in the top-level journey and
/// requires it. An empty string counts as unset.
pub fn validate_trigger_placement(
    trigger: &AutomationTrigger,
) -> Result<ActionClass, ValidationError> {
    let class = trigger.action.class();
    let name = trigger.id().unwrap_or(&trigger.title).to_string();
    debug!(trigger = %name, action = trigger.action.tag(), ?class, "Checking trigger placement");

    match (class, trigger.placed_journey()) {
        (ActionClass::GlobalMembership, Some(journey_id)) => {
            Err(ValidationError::UnexpectedJourneyIdOnGlobalTrigger {
                trigger: name,
                action: trigger.action.tag().to_string(),
                journey_id: journey_id.to_string(),
            })
        }
        (ActionClass::StepActivation, None) => {
            Err(ValidationError::MissingJourneyIdForStepActivation {
                trigger: name,
                action: trigger.action.tag().to_string(),
            })
        }
        _ => Ok(class),
    }
}
