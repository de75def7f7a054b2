//! Offline validation of a complete configuration export.
//!
//! A bundle lists already-created resources (all with ids) grouped by type:
//!
//! ```json
//! {
//!   "forms": [...], "formFields": [...],
//!   "messageTemplates": [...], "calendarEventTemplates": [...],
//!   "journeys": [...], "automationSteps": [...], "automationTriggers": [...]
//! }
//! ```

use crate::config::ValidatorConfig;
use crate::error::{OperationError, ValidationError};
use crate::model::{
    AutomationStep, AutomationTrigger, CalendarEventTemplate, Form, FormField, Journey,
    MessageTemplate, Resource, ResourceKind,
};
use crate::registry::{ResourceDraft, schema_for};
use crate::validator::{
    ConditionKeys, FieldGraph, StepGraph, validate_field_options, validate_form_fields,
    validate_journey_steps, validate_trigger_placement,
};
use ahash::AHashSet;
use itertools::Itertools;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bundle {
    pub forms: Vec<Form>,
    pub form_fields: Vec<FormField>,
    pub message_templates: Vec<MessageTemplate>,
    pub calendar_event_templates: Vec<CalendarEventTemplate>,
    pub journeys: Vec<Journey>,
    pub automation_steps: Vec<AutomationStep>,
    pub automation_triggers: Vec<AutomationTrigger>,
}

/// Summary of a bundle that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct BundleReport {
    pub forms: Vec<FieldGraph>,
    pub journeys: Vec<StepGraph>,
    pub triggers: usize,
    pub templates: usize,
}

const SECTIONS: [(&str, ResourceKind); 7] = [
    ("forms", ResourceKind::Form),
    ("formFields", ResourceKind::FormField),
    ("messageTemplates", ResourceKind::MessageTemplate),
    ("calendarEventTemplates", ResourceKind::CalendarEventTemplate),
    ("journeys", ResourceKind::Journey),
    ("automationSteps", ResourceKind::AutomationStep),
    ("automationTriggers", ResourceKind::AutomationTrigger),
];

impl Bundle {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, OperationError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| OperationError::Decode {
            resource: "bundle".to_string(),
            message: format!("{}: {e}", path.display()),
        })?;
        let value: Value = serde_json::from_str(&content).map_err(|e| OperationError::Decode {
            resource: "bundle".to_string(),
            message: format!("{}: {e}", path.display()),
        })?;
        Self::from_value(&value)
    }

    /// Checks every entry against its field catalog and decodes it.
    pub fn from_value(value: &Value) -> Result<Self, OperationError> {
        let obj = value.as_object().ok_or_else(|| OperationError::Decode {
            resource: "bundle".to_string(),
            message: "expected an object of resource lists".to_string(),
        })?;
        if let Some(unknown) = obj.keys().find(|k| !SECTIONS.iter().any(|(s, _)| *s == k.as_str())) {
            return Err(OperationError::Decode {
                resource: "bundle".to_string(),
                message: format!(
                    "unknown section '{unknown}', expected one of {}",
                    SECTIONS.iter().map(|(s, _)| *s).join(", ")
                ),
            });
        }

        let mut bundle = Bundle::default();
        for (section, kind) in SECTIONS {
            let Some(entries) = obj.get(section) else {
                continue;
            };
            let entries = entries.as_array().ok_or_else(|| OperationError::Decode {
                resource: "bundle".to_string(),
                message: format!("'{section}' must be an array"),
            })?;
            for entry in entries {
                let data = schema_for(kind).validate_stored(entry)?;
                bundle.push(ResourceDraft::from_value(kind, Value::Object(data))?);
            }
        }
        Ok(bundle)
    }

    pub fn push(&mut self, draft: ResourceDraft) {
        match draft {
            ResourceDraft::Form(r) => self.forms.push(r),
            ResourceDraft::FormField(r) => self.form_fields.push(r),
            ResourceDraft::MessageTemplate(r) => self.message_templates.push(r),
            ResourceDraft::CalendarEventTemplate(r) => self.calendar_event_templates.push(r),
            ResourceDraft::Journey(r) => self.journeys.push(r),
            ResourceDraft::AutomationStep(r) => self.automation_steps.push(r),
            ResourceDraft::AutomationTrigger(r) => self.automation_triggers.push(r),
        }
    }

    /// Runs every validator over the bundle and stops at the first failure.
    ///
    /// Fields and steps are grouped by their owning form and journey; owners that are not
    /// part of the bundle are dangling references. A form without fields fails `MissingRoot`
    /// just as a journey without steps fails `MissingEntryStep`.
    pub fn validate_all(&self, config: &ValidatorConfig) -> Result<BundleReport, ValidationError> {
        debug!(
            forms = self.forms.len(),
            journeys = self.journeys.len(),
            triggers = self.automation_triggers.len(),
            "Validating bundle"
        );

        let form_ids: AHashSet<&str> = self.forms.iter().filter_map(Resource::id).collect();
        for field in &self.form_fields {
            validate_field_options(field)?;
            if !form_ids.contains(field.form_id.as_str()) {
                return Err(ValidationError::DanglingReference {
                    node_id: field.label(),
                    target: field.form_id.clone(),
                    path: format!("fields.{}.formId", field.label()),
                });
            }
        }

        let mut forms = Vec::with_capacity(self.forms.len());
        for form in &self.forms {
            let form_id = form.label();
            let fields: Vec<FormField> = self
                .form_fields
                .iter()
                .filter(|f| f.form_id == form_id)
                .cloned()
                .collect();
            let keys = ConditionKeys::from_config(config).with_form(form);
            forms.push(validate_form_fields(&form_id, &fields, &keys)?);
        }

        let journey_ids: AHashSet<&str> = self.journeys.iter().filter_map(Resource::id).collect();
        if let Some(step) = self
            .automation_steps
            .iter()
            .find(|s| !journey_ids.contains(s.journey_id.as_str()))
        {
            return Err(ValidationError::DanglingReference {
                node_id: step.label(),
                target: step.journey_id.clone(),
                path: format!("steps.{}.journeyId", step.label()),
            });
        }

        let mut journeys = Vec::with_capacity(self.journeys.len());
        for journey in &self.journeys {
            let journey_id = journey.label();
            let steps: Vec<AutomationStep> = self
                .automation_steps
                .iter()
                .filter(|s| s.journey_id == journey_id)
                .cloned()
                .collect();
            journeys.push(validate_journey_steps(&journey_id, &steps)?);
        }

        for trigger in &self.automation_triggers {
            validate_trigger_placement(trigger)?;
            let journey = trigger
                .placed_journey()
                .map(|j| (j, "journeyId"))
                .into_iter()
                .chain(trigger.action.referenced_journey().map(|j| (j, "action.info.journeyId")));
            for (target, path) in journey {
                if !journey_ids.contains(target) {
                    return Err(ValidationError::DanglingReference {
                        node_id: trigger.id().unwrap_or(&trigger.title).to_string(),
                        target: target.to_string(),
                        path: path.to_string(),
                    });
                }
            }
        }

        Ok(BundleReport {
            forms,
            journeys,
            triggers: self.automation_triggers.len(),
            templates: self.message_templates.len() + self.calendar_event_templates.len(),
        })
    }
}
