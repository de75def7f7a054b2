use super::schema::{FieldKind as K, FieldSpec as F, ResourceSchema, VariantKind as V};
use super::{Invocation, OperationDescriptor, OperationHandler, OperationKind, ResourceDraft};
use crate::codec::kind_of;
use crate::error::OperationError;
use crate::model::{FormFieldType, ResourceKind, UpdateOptions, UpdateRequest};
use ahash::AHashMap;
use serde_json::{Map, Value};

const STATUSES: &[&str] = &["Active", "Inactive"];
const TEMPLATE_MODES: &[&str] = &["richtext", "html"];

pub static FORM: ResourceSchema = ResourceSchema {
    kind: ResourceKind::Form,
    description: "A form; container for an ordered set of form fields.",
    fields: &[
        F::generated("id"),
        F::required("title", K::String),
        F::optional("description", K::String),
        F::optional("intakeFields", K::StringList)
            .with_doc("Enduser properties captured by the form."),
        F::optional("scoring", K::ObjectList)
            .with_doc("Scoring rules {title, fieldId, response?, score}; titles become condition keys."),
        F::optional("tags", K::StringList),
        F::optional("archivedAt", K::Timestamp),
    ],
};

pub static FORM_FIELD: ResourceSchema = ResourceSchema {
    kind: ResourceKind::FormField,
    description: "A single question of a form. Exactly one field per form carries a root link.",
    fields: &[
        F::generated("id"),
        F::required("formId", K::String)
            .create_only()
            .with_doc("Id returned by createForm."),
        F::required("title", K::String),
        F::required("type", K::Enum(&FormFieldType::TAGS)),
        F::optional("options", K::Object).with_doc("Keys permitted depend on type."),
        F::required("previousFields", K::VariantList(V::FieldLink)).with_doc(
            "Links to fields created earlier; use [{type: \"root\"}] for the first question.",
        ),
        F::optional("description", K::String),
        F::optional("isOptional", K::Bool),
        F::optional("intakeField", K::String),
        F::optional("archivedAt", K::Timestamp),
    ],
};

pub static MESSAGE_TEMPLATE: ResourceSchema = ResourceSchema {
    kind: ResourceKind::MessageTemplate,
    description: "An email/SMS message template.",
    fields: &[
        F::generated("id"),
        F::required("title", K::String),
        F::required("subject", K::String),
        F::required("message", K::String).with_doc("Plain-text body."),
        F::optional("html", K::String),
        F::optional("mode", K::Enum(TEMPLATE_MODES)),
        F::optional("tags", K::StringList),
        F::optional("archivedAt", K::Timestamp),
    ],
};

pub static CALENDAR_EVENT_TEMPLATE: ResourceSchema = ResourceSchema {
    kind: ResourceKind::CalendarEventTemplate,
    description: "A scheduling template appointments are booked against.",
    fields: &[
        F::generated("id"),
        F::required("title", K::String),
        F::required("durationInMinutes", K::Integer),
        F::optional("description", K::String),
        F::optional("reminders", K::VariantList(V::Reminder))
            .with_doc("Each reminder also carries msBeforeStartTime."),
        F::optional("archivedAt", K::Timestamp),
    ],
};

pub static JOURNEY: ResourceSchema = ResourceSchema {
    kind: ResourceKind::Journey,
    description: "A workflow holding automation steps. Needs at least one onJourneyStart step.",
    fields: &[
        F::generated("id"),
        F::required("title", K::String),
        F::optional("description", K::String),
        F::optional("states", K::ObjectList).with_doc("[{name, priority, description?}]"),
        F::optional("defaultState", K::String),
        F::optional("tags", K::StringList),
        F::optional("archivedAt", K::Timestamp),
    ],
};

pub static AUTOMATION_STEP: ResourceSchema = ResourceSchema {
    kind: ResourceKind::AutomationStep,
    description: "One action of a journey, activated by any of its events.",
    fields: &[
        F::generated("id"),
        F::required("journeyId", K::String)
            .create_only()
            .with_doc("Id returned by createJourney."),
        F::required("events", K::VariantList(V::StepEvent))
            .non_empty()
            .with_doc("automationStepId values must be ids of steps created earlier."),
        F::required("action", K::Variant(V::StepAction)),
        F::optional("enduserConditions", K::Any).with_doc("Opaque enduser filter."),
        F::optional("continueOnError", K::Bool),
        F::optional("tags", K::StringList),
        F::optional("archivedAt", K::Timestamp),
    ],
};

pub static AUTOMATION_TRIGGER: ResourceSchema = ResourceSchema {
    kind: ResourceKind::AutomationTrigger,
    description: "A platform-wide listener that changes journey membership or activates a waiting step.",
    fields: &[
        F::generated("id"),
        F::required("title", K::String),
        F::optional("status", K::Enum(STATUSES)),
        F::required("event", K::Variant(V::TriggerEvent)),
        F::required("action", K::Variant(V::TriggerAction)),
        F::optional("journeyId", K::String).with_doc(
            "Only for \"Move To Step\"; global actions carry their journey in action.info.",
        ),
        F::optional("enduserCondition", K::Any),
        F::optional("oncePerEnduser", K::Bool),
        F::optional("tags", K::StringList),
        F::optional("archivedAt", K::Timestamp),
    ],
};

pub fn schema_for(kind: ResourceKind) -> &'static ResourceSchema {
    match kind {
        ResourceKind::Form => &FORM,
        ResourceKind::FormField => &FORM_FIELD,
        ResourceKind::MessageTemplate => &MESSAGE_TEMPLATE,
        ResourceKind::CalendarEventTemplate => &CALENDAR_EVENT_TEMPLATE,
        ResourceKind::Journey => &JOURNEY,
        ResourceKind::AutomationStep => &AUTOMATION_STEP,
        ResourceKind::AutomationTrigger => &AUTOMATION_TRIGGER,
    }
}

fn prepare_create(schema: &ResourceSchema, input: &Value) -> Result<Invocation, OperationError> {
    let data = schema.validate_create(input)?;
    let draft = ResourceDraft::from_value(schema.kind, Value::Object(data))?;
    draft.check()?;
    Ok(Invocation::Create(draft))
}

fn prepare_update(
    name: &str,
    schema: &ResourceSchema,
    input: &Value,
) -> Result<Invocation, OperationError> {
    let malformed = |message: String| OperationError::MalformedInput {
        operation: name.to_string(),
        message,
    };
    let obj = input
        .as_object()
        .ok_or_else(|| malformed(format!("expected {{id, updates, options?}}, found {}", kind_of(input))))?;
    if let Some(extra) = obj
        .keys()
        .find(|k| !matches!(k.as_str(), "id" | "updates" | "options"))
    {
        return Err(malformed(format!("unexpected key '{extra}'")));
    }
    let id = match obj.get("id") {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        _ => return Err(malformed("'id' must be a non-empty string".to_string())),
    };
    let updates = obj
        .get("updates")
        .ok_or_else(|| malformed("missing 'updates'".to_string()))?;
    let updates: Map<String, Value> = schema.validate_update(updates)?;
    let options = match obj.get("options") {
        None | Some(Value::Null) => None,
        Some(raw) => Some(
            serde_json::from_value::<UpdateOptions>(raw.clone())
                .map_err(|e| malformed(format!("invalid 'options': {e}")))?,
        ),
    };
    Ok(Invocation::Update {
        resource: schema.kind,
        request: UpdateRequest { id, updates, options },
    })
}

/// Defines the create/update operation pair of every resource, their registration, and their
/// creation by name.
macro_rules! define_operations {
    ( $( ($create:ident, $create_name:literal, $update:ident, $update_name:literal, $schema:ident) ),* $(,)? ) => {
        $(
            struct $create;
            impl OperationHandler for $create {
                fn name(&self) -> &str { $create_name }
                fn descriptor(&self) -> OperationDescriptor {
                    OperationDescriptor {
                        name: $create_name.to_string(),
                        kind: OperationKind::Create,
                        resource: $schema.kind,
                        description: format!("Creates a {}. {}", $schema.kind, $schema.description),
                        schema: &$schema,
                        output: format!("The created {} including its generated id.", $schema.kind),
                    }
                }
                fn prepare(&self, input: &Value) -> Result<Invocation, OperationError> {
                    prepare_create(&$schema, input)
                }
            }

            struct $update;
            impl OperationHandler for $update {
                fn name(&self) -> &str { $update_name }
                fn descriptor(&self) -> OperationDescriptor {
                    OperationDescriptor {
                        name: $update_name.to_string(),
                        kind: OperationKind::Update,
                        resource: $schema.kind,
                        description: format!(
                            "Updates a {}. Objects merge, arrays append and scalars overwrite unless options.replaceObjectFields is true.",
                            $schema.kind
                        ),
                        schema: &$schema,
                        output: format!("The {} after the update was applied.", $schema.kind),
                    }
                }
                fn prepare(&self, input: &Value) -> Result<Invocation, OperationError> {
                    prepare_update($update_name, &$schema, input)
                }
            }
        )*

        pub(super) fn register_default_operations(registry: &mut AHashMap<String, Box<dyn OperationHandler>>) {
            $(
                registry.insert($create_name.to_string(), Box::new($create));
                registry.insert($update_name.to_string(), Box::new($update));
            )*
        }

        pub(super) fn create_operation_by_name(name: &str) -> Option<Box<dyn OperationHandler>> {
            match name {
                $(
                    $create_name => Some(Box::new($create)),
                    $update_name => Some(Box::new($update)),
                )*
                _ => None,
            }
        }
    };
}

define_operations! {
    (CreateForm, "createForm", UpdateForm, "updateForm", FORM),
    (CreateFormField, "createFormField", UpdateFormField, "updateFormField", FORM_FIELD),
    (CreateMessageTemplate, "createMessageTemplate", UpdateMessageTemplate, "updateMessageTemplate", MESSAGE_TEMPLATE),
    (CreateCalendarEventTemplate, "createCalendarEventTemplate", UpdateCalendarEventTemplate, "updateCalendarEventTemplate", CALENDAR_EVENT_TEMPLATE),
    (CreateJourney, "createJourney", UpdateJourney, "updateJourney", JOURNEY),
    (CreateAutomationStep, "createAutomationStep", UpdateAutomationStep, "updateAutomationStep", AUTOMATION_STEP),
    (CreateAutomationTrigger, "createAutomationTrigger", UpdateAutomationTrigger, "updateAutomationTrigger", AUTOMATION_TRIGGER),
}

/// Name of the built-in operation of `kind` for `resource`.
pub fn operation_name(kind: OperationKind, resource: ResourceKind) -> String {
    match kind {
        OperationKind::Create => format!("create{}", resource.name()),
        OperationKind::Update => format!("update{}", resource.name()),
    }
}
