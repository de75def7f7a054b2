use crate::codec::{define_variants, variant_info};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub subject: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default)]
    pub mode: TemplateMode,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateMode {
    #[default]
    Richtext,
    Html,
}

/// A scheduling template that appointments are booked against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub duration_in_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reminders: Vec<CalendarEventReminder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<String>,
}

/// A reminder fired `msBeforeStartTime` before an appointment starts.
///
/// `msBeforeStartTime` sits next to `type`/`info` on the same object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventReminder {
    #[serde(flatten)]
    pub kind: ReminderKind,
    pub ms_before_start_time: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub did_remind: Option<bool>,
}

variant_info! {
    pub struct ReminderWebhookInfo {
        required {}
        optional {}
    }
}

variant_info! {
    pub struct ReminderJourneyInfo {
        required { journey_id: String = "journeyId" }
        optional {}
    }
}

variant_info! {
    pub struct ReminderNotificationInfo {
        required {}
        optional {
            template_id: String = "templateId",
            message: String = "message",
        }
    }
}

variant_info! {
    pub struct ReminderTicketInfo {
        required { title: String = "title" }
        optional { description: String = "description" }
    }
}

variant_info! {
    pub struct ReminderTagsInfo {
        required { tags: Vec<String> = "tags" }
        optional {}
    }
}

variant_info! {
    pub struct ReminderEnduserNotificationInfo {
        required {}
        optional {
            template_id: String = "templateId",
            message: String = "message",
            channel: String = "channel",
            fields: Map<String, Value> = "fields",
        }
    }
}

define_variants! {
    pub enum ReminderKind as "reminders" {
        Webhook = "webhook" => ReminderWebhookInfo,
        AddToJourney = "add-to-journey" => ReminderJourneyInfo,
        RemoveFromJourney = "Remove From Journey" => ReminderJourneyInfo,
        UserNotification = "user-notification" => ReminderNotificationInfo,
        EnduserNotification = "enduser-notification" => ReminderEnduserNotificationInfo,
        CreateTicket = "create-ticket" => ReminderTicketInfo,
        AddTags = "Add Tags" => ReminderTagsInfo,
    }
}

impl ReminderKind {
    pub fn referenced_journey(&self) -> Option<&str> {
        match self {
            ReminderKind::AddToJourney(info) | ReminderKind::RemoveFromJourney(info) => {
                Some(info.journey_id.as_str())
            }
            _ => None,
        }
    }

    pub fn referenced_template(&self) -> Option<&str> {
        match self {
            ReminderKind::UserNotification(info) => info.template_id.as_deref(),
            ReminderKind::EnduserNotification(info) => info.template_id.as_deref(),
            _ => None,
        }
    }
}
