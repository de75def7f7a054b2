use super::condition::Condition;
use crate::codec::{InfoKey, define_variants, variant_info};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A form: the container for an ordered set of [`FormField`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Enduser properties captured by the form's intake section.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub intake_fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scoring: Vec<ScoringRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<String>,
}

/// Adds `score` to the score named `title` when `fieldId` is answered with `response`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringRule {
    pub title: String,
    pub field_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    pub score: f64,
}

/// A single question of a [`Form`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub form_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub field_type: FormFieldType,
    #[serde(default)]
    pub options: FieldOptions,
    #[serde(default)]
    pub previous_fields: Vec<PreviousFieldLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_optional: Option<bool>,
    /// Enduser property the answer is written back to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intake_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<String>,
}

impl FormField {
    pub fn has_root_link(&self) -> bool {
        self.previous_fields
            .iter()
            .any(|link| matches!(link, PreviousFieldLink::Root(_)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormFieldType {
    #[serde(rename = "string")]
    String,
    #[serde(rename = "stringLong")]
    StringLong,
    #[serde(rename = "Rich Text")]
    RichText,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "phone")]
    Phone,
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "dateString")]
    DateString,
    #[serde(rename = "Time")]
    Time,
    #[serde(rename = "Timezone")]
    Timezone,
    #[serde(rename = "rating")]
    Rating,
    #[serde(rename = "ranking")]
    Ranking,
    #[serde(rename = "multiple_choice")]
    MultipleChoice,
    #[serde(rename = "Dropdown")]
    Dropdown,
    #[serde(rename = "Database Select")]
    DatabaseSelect,
    #[serde(rename = "file")]
    File,
    #[serde(rename = "files")]
    Files,
    #[serde(rename = "signature")]
    Signature,
    #[serde(rename = "Address")]
    Address,
    #[serde(rename = "Height")]
    Height,
    #[serde(rename = "Insurance")]
    Insurance,
    #[serde(rename = "Allergies")]
    Allergies,
    #[serde(rename = "Conditions")]
    Conditions,
    #[serde(rename = "Medications")]
    Medications,
    #[serde(rename = "Related Contacts")]
    RelatedContacts,
    #[serde(rename = "Appointment Booking")]
    AppointmentBooking,
    #[serde(rename = "Table Input")]
    TableInput,
    #[serde(rename = "Question Group")]
    QuestionGroup,
    #[serde(rename = "Hidden Value")]
    HiddenValue,
    #[serde(rename = "Redirect")]
    Redirect,
    #[serde(rename = "description")]
    Description,
    #[serde(rename = "Stripe")]
    Stripe,
    #[serde(rename = "Emotii")]
    Emotii,
}

const TEXT_OPTIONS: &[InfoKey] = &[
    InfoKey::optional("placeholder"),
    InfoKey::optional("minLength"),
    InfoKey::optional("maxLength"),
];
const CHOICE_OPTIONS: &[InfoKey] = &[
    InfoKey::required("choices"),
    InfoKey::optional("radio"),
    InfoKey::optional("other"),
];
const FILE_OPTIONS: &[InfoKey] = &[
    InfoKey::optional("validFileTypes"),
    InfoKey::optional("maxFileSize"),
];
const RANGE_OPTIONS: &[InfoKey] = &[InfoKey::optional("from"), InfoKey::optional("to")];
const RANKING_OPTIONS: &[InfoKey] = &[InfoKey::required("choices")];
const DROPDOWN_OPTIONS: &[InfoKey] = &[InfoKey::required("choices"), InfoKey::optional("other")];
const DATABASE_OPTIONS: &[InfoKey] = &[
    InfoKey::required("databaseId"),
    InfoKey::optional("databaseLabel"),
    InfoKey::optional("other"),
];
const SIGNATURE_OPTIONS: &[InfoKey] = &[InfoKey::optional("prefillSignature")];
const ADDRESS_OPTIONS: &[InfoKey] = &[InfoKey::optional("addressFields")];
const TABLE_OPTIONS: &[InfoKey] = &[InfoKey::required("tableChoices")];
const GROUP_OPTIONS: &[InfoKey] = &[InfoKey::required("subFields")];
const HIDDEN_OPTIONS: &[InfoKey] = &[InfoKey::optional("hiddenValue")];
const REDIRECT_OPTIONS: &[InfoKey] = &[InfoKey::required("redirectUrl")];
const STRIPE_OPTIONS: &[InfoKey] = &[InfoKey::required("productIds")];
const BOOKING_OPTIONS: &[InfoKey] = &[InfoKey::required("bookingPageId")];

impl FormFieldType {
    pub const ALL: [FormFieldType; 33] = [
        FormFieldType::String,
        FormFieldType::StringLong,
        FormFieldType::RichText,
        FormFieldType::Number,
        FormFieldType::Email,
        FormFieldType::Phone,
        FormFieldType::Date,
        FormFieldType::DateString,
        FormFieldType::Time,
        FormFieldType::Timezone,
        FormFieldType::Rating,
        FormFieldType::Ranking,
        FormFieldType::MultipleChoice,
        FormFieldType::Dropdown,
        FormFieldType::DatabaseSelect,
        FormFieldType::File,
        FormFieldType::Files,
        FormFieldType::Signature,
        FormFieldType::Address,
        FormFieldType::Height,
        FormFieldType::Insurance,
        FormFieldType::Allergies,
        FormFieldType::Conditions,
        FormFieldType::Medications,
        FormFieldType::RelatedContacts,
        FormFieldType::AppointmentBooking,
        FormFieldType::TableInput,
        FormFieldType::QuestionGroup,
        FormFieldType::HiddenValue,
        FormFieldType::Redirect,
        FormFieldType::Description,
        FormFieldType::Stripe,
        FormFieldType::Emotii,
    ];

    /// JSON tags, indexed like [`ALL`](Self::ALL).
    pub const TAGS: [&'static str; 33] = [
        "string",
        "stringLong",
        "Rich Text",
        "number",
        "email",
        "phone",
        "date",
        "dateString",
        "Time",
        "Timezone",
        "rating",
        "ranking",
        "multiple_choice",
        "Dropdown",
        "Database Select",
        "file",
        "files",
        "signature",
        "Address",
        "Height",
        "Insurance",
        "Allergies",
        "Conditions",
        "Medications",
        "Related Contacts",
        "Appointment Booking",
        "Table Input",
        "Question Group",
        "Hidden Value",
        "Redirect",
        "description",
        "Stripe",
        "Emotii",
    ];

    /// The `options` keys accepted for this field type.
    pub fn option_keys(self) -> &'static [InfoKey] {
        match self {
            FormFieldType::String
            | FormFieldType::StringLong
            | FormFieldType::RichText
            | FormFieldType::Email
            | FormFieldType::Phone => TEXT_OPTIONS,
            FormFieldType::Number | FormFieldType::Rating => RANGE_OPTIONS,
            FormFieldType::Ranking => RANKING_OPTIONS,
            FormFieldType::MultipleChoice => CHOICE_OPTIONS,
            FormFieldType::Dropdown => DROPDOWN_OPTIONS,
            FormFieldType::DatabaseSelect => DATABASE_OPTIONS,
            FormFieldType::File | FormFieldType::Files => FILE_OPTIONS,
            FormFieldType::Signature => SIGNATURE_OPTIONS,
            FormFieldType::Address => ADDRESS_OPTIONS,
            FormFieldType::TableInput => TABLE_OPTIONS,
            FormFieldType::QuestionGroup => GROUP_OPTIONS,
            FormFieldType::HiddenValue => HIDDEN_OPTIONS,
            FormFieldType::Redirect => REDIRECT_OPTIONS,
            FormFieldType::Stripe => STRIPE_OPTIONS,
            FormFieldType::AppointmentBooking => BOOKING_OPTIONS,
            FormFieldType::Date
            | FormFieldType::DateString
            | FormFieldType::Time
            | FormFieldType::Timezone
            | FormFieldType::Height
            | FormFieldType::Insurance
            | FormFieldType::Allergies
            | FormFieldType::Conditions
            | FormFieldType::Medications
            | FormFieldType::RelatedContacts
            | FormFieldType::Description
            | FormFieldType::Emotii => &[],
        }
    }

    /// The JSON tag of this type.
    pub fn tag(self) -> &'static str {
        Self::TAGS[self as usize]
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::TAGS
            .iter()
            .position(|t| *t == tag)
            .map(|i| Self::ALL[i])
    }
}

/// Type-dependent settings of a [`FormField`].
///
/// Which keys may be set is decided by [`FormFieldType::option_keys`]. Keys the struct does
/// not model are collected in `extra` so they can be reported instead of silently dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radio: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_file_types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_file_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefill_signature: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_fields: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_choices: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_fields: Option<Vec<SubField>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_page_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A field nested inside a `Question Group`; `id` names another field of the same form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubField {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_optional: Option<bool>,
}

variant_info! {
    pub struct RootLink {
        required {}
        optional {}
    }
}

variant_info! {
    pub struct AfterLink {
        required { field_id: String = "fieldId" }
        optional {}
    }
}

variant_info! {
    pub struct PreviousEqualsLink {
        required { field_id: String = "fieldId", equals: String = "equals" }
        optional {}
    }
}

variant_info! {
    /// Shows the field when `condition` holds; `priority` orders competing links.
    pub struct CompoundLogicLink {
        required {
            field_id: String = "fieldId",
            priority: i64 = "priority",
            label: String = "label",
            condition: Condition = "condition",
        }
        optional {}
    }
}

define_variants! {
    /// How a field is reached from the fields before it.
    pub enum PreviousFieldLink as "previousFields" {
        Root = "root" => RootLink,
        After = "after" => AfterLink,
        PreviousEquals = "previousEquals" => PreviousEqualsLink,
        CompoundLogic = "compoundLogic" => CompoundLogicLink,
    }
}

impl PreviousFieldLink {
    /// The field this link points at, `None` for `root`.
    pub fn target(&self) -> Option<&str> {
        match self {
            PreviousFieldLink::Root(_) => None,
            PreviousFieldLink::After(info) => Some(info.field_id.as_str()),
            PreviousFieldLink::PreviousEquals(info) => Some(info.field_id.as_str()),
            PreviousFieldLink::CompoundLogic(info) => Some(info.field_id.as_str()),
        }
    }

    pub fn root() -> Self {
        PreviousFieldLink::Root(RootLink {})
    }

    pub fn after(field_id: impl Into<String>) -> Self {
        PreviousFieldLink::After(AfterLink {
            field_id: field_id.into(),
        })
    }
}
