use crate::codec::{define_variants, variant_info};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Journey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub states: Vec<JourneyState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_state: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<String>,
}

impl Journey {
    pub fn has_state(&self, name: &str) -> bool {
        self.states.iter().any(|s| s.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyState {
    pub name: String,
    pub priority: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One action of a [`Journey`], activated by any of its events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub journey_id: String,
    pub events: Vec<StepEvent>,
    pub action: StepAction,
    /// Opaque enduser filter, passed through unevaluated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enduser_conditions: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continue_on_error: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<String>,
}

impl AutomationStep {
    pub fn is_entry(&self) -> bool {
        self.events.iter().any(StepEvent::is_entry)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DelayUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

variant_info! {
    pub struct JourneyStartInfo {
        required {}
        optional {}
    }
}

variant_info! {
    /// Fires `delayInMS` after the referenced step's action completed.
    pub struct AfterActionInfo {
        required {
            automation_step_id: String = "automationStepId",
            delay_in_ms: u64 = "delayInMS",
        }
        optional {
            delay: u64 = "delay",
            unit: DelayUnit = "unit",
            office_hours_only: bool = "officeHoursOnly",
            use_enduser_timezone: bool = "useEnduserTimezone",
            cancel_conditions: Vec<Value> = "cancelConditions",
            ab_test_condition: String = "abTestCondition",
        }
    }
}

variant_info! {
    pub struct FormResponseInfo {
        required { automation_step_id: String = "automationStepId" }
        optional {}
    }
}

variant_info! {
    pub struct FormUnsubmittedInfo {
        required {
            automation_step_id: String = "automationStepId",
            delay_in_ms: u64 = "delayInMS",
        }
        optional {
            delay: u64 = "delay",
            unit: DelayUnit = "unit",
            cancel_conditions: Vec<Value> = "cancelConditions",
        }
    }
}

variant_info! {
    /// Parks the enduser after the referenced step until `triggerId` moves them on.
    pub struct WaitForTriggerInfo {
        required {
            automation_step_id: String = "automationStepId",
            trigger_id: String = "triggerId",
        }
        optional {}
    }
}

variant_info! {
    pub struct StepReferenceInfo {
        required { automation_step_id: String = "automationStepId" }
        optional {}
    }
}

variant_info! {
    pub struct TicketCompletedInfo {
        required { automation_step_id: String = "automationStepId" }
        optional { closed_for_reason: String = "closedForReason" }
    }
}

variant_info! {
    pub struct CallOutcomeInfo {
        required {
            automation_step_id: String = "automationStepId",
            outcome: String = "outcome",
        }
        optional {}
    }
}

variant_info! {
    pub struct AiDecisionOutcomeInfo {
        required {
            automation_step_id: String = "automationStepId",
            outcomes: Vec<String> = "outcomes",
        }
        optional {}
    }
}

define_variants! {
    pub enum StepEvent as "events" {
        OnJourneyStart = "onJourneyStart" => JourneyStartInfo,
        AfterAction = "afterAction" => AfterActionInfo,
        FormResponse = "formResponse" => FormResponseInfo,
        FormResponses = "formResponses" => FormResponseInfo,
        FormUnsubmitted = "formUnsubmitted" => FormUnsubmittedInfo,
        WaitForTrigger = "waitForTrigger" => WaitForTriggerInfo,
        OnError = "onError" => StepReferenceInfo,
        TicketCompleted = "ticketCompleted" => TicketCompletedInfo,
        OnCallOutcome = "onCallOutcome" => CallOutcomeInfo,
        OnAiDecision = "onAIDecision" => AiDecisionOutcomeInfo,
    }
}

impl StepEvent {
    /// The step this event waits on, `None` for `onJourneyStart`.
    pub fn referenced_step(&self) -> Option<&str> {
        match self {
            StepEvent::OnJourneyStart(_) => None,
            StepEvent::AfterAction(info) => Some(info.automation_step_id.as_str()),
            StepEvent::FormResponse(info) | StepEvent::FormResponses(info) => {
                Some(info.automation_step_id.as_str())
            }
            StepEvent::FormUnsubmitted(info) => Some(info.automation_step_id.as_str()),
            StepEvent::WaitForTrigger(info) => Some(info.automation_step_id.as_str()),
            StepEvent::OnError(info) => Some(info.automation_step_id.as_str()),
            StepEvent::TicketCompleted(info) => Some(info.automation_step_id.as_str()),
            StepEvent::OnCallOutcome(info) => Some(info.automation_step_id.as_str()),
            StepEvent::OnAiDecision(info) => Some(info.automation_step_id.as_str()),
        }
    }

    pub fn is_entry(&self) -> bool {
        matches!(self, StepEvent::OnJourneyStart(_))
    }

    /// Whether the back-reference of this event takes part in cycle detection.
    pub fn chains(&self) -> bool {
        matches!(self, StepEvent::AfterAction(_) | StepEvent::WaitForTrigger(_))
    }

    pub fn trigger_id(&self) -> Option<&str> {
        match self {
            StepEvent::WaitForTrigger(info) => Some(info.trigger_id.as_str()),
            _ => None,
        }
    }
}

variant_info! {
    pub struct SendMessageInfo {
        required {
            template_id: String = "templateId",
            sender_id: String = "senderId",
        }
        optional { hidden_from_timeline: bool = "hiddenFromTimeline" }
    }
}

variant_info! {
    pub struct SendFormInfo {
        required {
            form_id: String = "formId",
            sender_id: String = "senderId",
        }
        optional { channel: String = "channel" }
    }
}

variant_info! {
    pub struct NotifyTeamInfo {
        required { template_id: String = "templateId" }
        optional {
            for_assigned: bool = "forAssigned",
            roles: Vec<String> = "roles",
        }
    }
}

variant_info! {
    pub struct CreateTicketInfo {
        required { title: String = "title" }
        optional {
            description: String = "description",
            priority: u32 = "priority",
            due_date_offset_in_ms: u64 = "dueDateOffsetInMS",
            close_reasons: Vec<String> = "closeReasons",
        }
    }
}

variant_info! {
    pub struct EnduserTagsInfo {
        required { tags: Vec<String> = "tags" }
        optional {}
    }
}

variant_info! {
    pub struct EnduserStatusInfo {
        required { status: String = "status" }
        optional {}
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnduserFieldUpdate {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: Value,
}

variant_info! {
    pub struct EnduserFieldsInfo {
        required { fields: Vec<EnduserFieldUpdate> = "fields" }
        optional {}
    }
}

variant_info! {
    pub struct WebhookInfo {
        required { message: String = "message" }
        optional { url: String = "url" }
    }
}

variant_info! {
    pub struct JourneyTargetInfo {
        required { journey_id: String = "journeyId" }
        optional {}
    }
}

variant_info! {
    pub struct EmptyActionInfo {
        required {}
        optional {}
    }
}

variant_info! {
    pub struct PushFormsInfo {
        required { form_ids: Vec<String> = "formIds" }
        optional {}
    }
}

variant_info! {
    pub struct AiDecisionInfo {
        required {
            prompt: String = "prompt",
            outcomes: Vec<String> = "outcomes",
        }
        optional { sources: Vec<String> = "sources" }
    }
}

variant_info! {
    pub struct CancelAppointmentsInfo {
        required {}
        optional { template_ids: Vec<String> = "templateIds" }
    }
}

define_variants! {
    pub enum StepAction as "action" {
        SendEmail = "sendEmail" => SendMessageInfo,
        SendSms = "sendSMS" => SendMessageInfo,
        SendForm = "sendForm" => SendFormInfo,
        NotifyTeam = "notifyTeam" => NotifyTeamInfo,
        CreateTicket = "createTicket" => CreateTicketInfo,
        AddEnduserTags = "addEnduserTags" => EnduserTagsInfo,
        RemoveEnduserTags = "removeEnduserTags" => EnduserTagsInfo,
        SetEnduserStatus = "setEnduserStatus" => EnduserStatusInfo,
        SetEnduserFields = "setEnduserFields" => EnduserFieldsInfo,
        SendWebhook = "sendWebhook" => WebhookInfo,
        AddToJourney = "addToJourney" => JourneyTargetInfo,
        RemoveFromJourney = "removeFromJourney" => JourneyTargetInfo,
        RemoveFromAllJourneys = "removeFromAllJourneys" => EmptyActionInfo,
        PushFormsToPortal = "pushFormsToPortal" => PushFormsInfo,
        AiDecision = "aiDecision" => AiDecisionInfo,
        CancelFutureAppointments = "cancelFutureAppointments" => CancelAppointmentsInfo,
    }
}

impl StepAction {
    pub fn referenced_templates(&self) -> Vec<&str> {
        match self {
            StepAction::SendEmail(info) | StepAction::SendSms(info) => vec![info.template_id.as_str()],
            StepAction::NotifyTeam(info) => vec![info.template_id.as_str()],
            _ => Vec::new(),
        }
    }

    pub fn referenced_calendar_templates(&self) -> Vec<&str> {
        match self {
            StepAction::CancelFutureAppointments(info) => info
                .template_ids
                .iter()
                .flatten()
                .map(String::as_str)
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn referenced_forms(&self) -> Vec<&str> {
        match self {
            StepAction::SendForm(info) => vec![info.form_id.as_str()],
            StepAction::PushFormsToPortal(info) => {
                info.form_ids.iter().map(String::as_str).collect()
            }
            _ => Vec::new(),
        }
    }

    pub fn referenced_journey(&self) -> Option<&str> {
        match self {
            StepAction::AddToJourney(info) | StepAction::RemoveFromJourney(info) => {
                Some(info.journey_id.as_str())
            }
            _ => None,
        }
    }
}
