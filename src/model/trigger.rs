use crate::codec::{define_variants, variant_info};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A platform-wide listener that changes journey membership or activates a waiting step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationTrigger {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub status: TriggerStatus,
    pub event: TriggerEvent,
    pub action: TriggerAction,
    /// Journey whose waiting step is activated; only meaningful for step activation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journey_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enduser_condition: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub once_per_enduser: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<String>,
}

impl AutomationTrigger {
    /// Top-level journey id, with the empty string treated as absent.
    pub fn placed_journey(&self) -> Option<&str> {
        self.journey_id.as_deref().filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerStatus {
    #[default]
    Active,
    Inactive,
}

variant_info! {
    pub struct FormSubmittedInfo {
        required { form_id: String = "formId" }
        optional { public_identifier: String = "publicIdentifier" }
    }
}

variant_info! {
    pub struct AppointmentInfo {
        required {}
        optional {
            titles: Vec<String> = "titles",
            template_ids: Vec<String> = "templateIds",
        }
    }
}

variant_info! {
    pub struct FieldEqualsInfo {
        required {
            field: String = "field",
            value: Value = "value",
        }
        optional {}
    }
}

variant_info! {
    pub struct FieldsChangedInfo {
        required { fields: Vec<String> = "fields" }
        optional {}
    }
}

variant_info! {
    pub struct TagAddedInfo {
        required { tag: String = "tag" }
        optional {}
    }
}

variant_info! {
    pub struct ContactCreatedInfo {
        required {}
        optional { entity_types: Vec<String> = "entityTypes" }
    }
}

variant_info! {
    pub struct NoRecentAppointmentInfo {
        required { interval_in_ms: u64 = "intervalInMS" }
        optional { template_ids: Vec<String> = "templateIds" }
    }
}

variant_info! {
    pub struct PurchaseMadeInfo {
        required {}
        optional { titles: Vec<String> = "titles" }
    }
}

variant_info! {
    pub struct SmsReplyInfo {
        required {}
        optional {
            template_ids: Vec<String> = "templateIds",
            reply_keywords: Vec<String> = "replyKeywords",
        }
    }
}

variant_info! {
    pub struct NoInfo {
        required {}
        optional {}
    }
}

define_variants! {
    pub enum TriggerEvent as "event" {
        FormSubmitted = "Form Submitted" => FormSubmittedInfo,
        AppointmentCreated = "Appointment Created" => AppointmentInfo,
        AppointmentCompleted = "Appointment Completed" => AppointmentInfo,
        AppointmentCancelled = "Appointment Cancelled" => AppointmentInfo,
        FieldEquals = "Field Equals" => FieldEqualsInfo,
        FieldsChanged = "Fields Changed" => FieldsChangedInfo,
        TagAdded = "Tag Added" => TagAddedInfo,
        ContactCreated = "Contact Created" => ContactCreatedInfo,
        NoRecentAppointment = "No Recent Appointment" => NoRecentAppointmentInfo,
        PurchaseMade = "Purchase Made" => PurchaseMadeInfo,
        SmsReply = "SMS Reply" => SmsReplyInfo,
        MissedCall = "Missed Call" => NoInfo,
        MessageDeliveryFailure = "Message Delivery Failure" => NoInfo,
    }
}

impl TriggerEvent {
    pub fn referenced_form(&self) -> Option<&str> {
        match self {
            TriggerEvent::FormSubmitted(info) => Some(info.form_id.as_str()),
            _ => None,
        }
    }

    pub fn referenced_templates(&self) -> Vec<&str> {
        let ids = match self {
            TriggerEvent::AppointmentCreated(info)
            | TriggerEvent::AppointmentCompleted(info)
            | TriggerEvent::AppointmentCancelled(info) => info.template_ids.as_ref(),
            TriggerEvent::NoRecentAppointment(info) => info.template_ids.as_ref(),
            TriggerEvent::SmsReply(info) => info.template_ids.as_ref(),
            _ => None,
        };
        ids.into_iter().flatten().map(String::as_str).collect()
    }
}

variant_info! {
    pub struct TriggerJourneyInfo {
        required { journey_id: String = "journeyId" }
        optional {}
    }
}

variant_info! {
    pub struct TriggerTagsInfo {
        required { tags: Vec<String> = "tags" }
        optional {}
    }
}

variant_info! {
    pub struct TriggerFieldsInfo {
        required { fields: Map<String, Value> = "fields" }
        optional {}
    }
}

define_variants! {
    pub enum TriggerAction as "action" {
        AddToJourney = "Add To Journey" => TriggerJourneyInfo,
        RemoveFromJourney = "Remove From Journey" => TriggerJourneyInfo,
        RemoveFromAllJourneys = "Remove From All Journeys" => NoInfo,
        AddTags = "Add Tags" => TriggerTagsInfo,
        RemoveTags = "Remove Tags" => TriggerTagsInfo,
        SetFields = "Set Fields" => TriggerFieldsInfo,
        MoveToStep = "Move To Step" => NoInfo,
    }
}

/// How the platform resolves the target of a trigger action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionClass {
    /// Changes enduser membership or data; targets live in `info`.
    GlobalMembership,
    /// Activates a `waitForTrigger` step of the journey named at top level.
    StepActivation,
}

impl TriggerAction {
    pub fn class(&self) -> ActionClass {
        match self {
            TriggerAction::MoveToStep(_) => ActionClass::StepActivation,
            TriggerAction::AddToJourney(_)
            | TriggerAction::RemoveFromJourney(_)
            | TriggerAction::RemoveFromAllJourneys(_)
            | TriggerAction::AddTags(_)
            | TriggerAction::RemoveTags(_)
            | TriggerAction::SetFields(_) => ActionClass::GlobalMembership,
        }
    }

    pub fn referenced_journey(&self) -> Option<&str> {
        match self {
            TriggerAction::AddToJourney(info) | TriggerAction::RemoveFromJourney(info) => {
                Some(info.journey_id.as_str())
            }
            _ => None,
        }
    }
}
