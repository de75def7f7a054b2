//! A single-owner session against a [`RemotePlatform`].
//!
//! The workspace validates every operation locally before it is dispatched and records what
//! the platform returns, so later operations can reference the generated ids. Field and step
//! graphs are kept in per-form and per-journey arenas, populated strictly in creation order.

use crate::codec::TaggedUnion;
use crate::config::ValidatorConfig;
use crate::error::{DestructiveUpdateWarning, OperationError, SchemaError, ValidationError};
use crate::merge::{self, UpdatePreview};
use crate::model::{
    AutomationStep, AutomationTrigger, CalendarEventTemplate, Form, FormField, Resource,
    ResourceKind, UpdateRequest, archive_request, unarchive_request,
};
use crate::platform::RemotePlatform;
use crate::registry::{Invocation, Registry, ResourceDraft, schema_for};
use crate::validator::{ConditionKeys, FieldArena, FieldGraph, StepArena, StepGraph};
use ahash::{AHashMap, AHashSet};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{info, warn};

pub struct Workspace<P: RemotePlatform> {
    platform: P,
    registry: Registry,
    config: ValidatorConfig,
    snapshots: AHashMap<ResourceKind, AHashMap<String, Value>>,
    forms: AHashMap<String, Form>,
    fields: AHashMap<String, FieldArena>,
    steps: AHashMap<String, StepArena>,
    reads: AHashSet<(ResourceKind, String)>,
    warnings: Vec<DestructiveUpdateWarning>,
}

pub struct WorkspaceBuilder<P: RemotePlatform> {
    platform: P,
    registry: Option<Registry>,
    config: ValidatorConfig,
}

impl<P: RemotePlatform> WorkspaceBuilder<P> {
    pub fn new(platform: P) -> Self {
        Self {
            platform,
            registry: None,
            config: ValidatorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> Workspace<P> {
        Workspace {
            platform: self.platform,
            registry: self.registry.unwrap_or_default(),
            config: self.config,
            snapshots: AHashMap::new(),
            forms: AHashMap::new(),
            fields: AHashMap::new(),
            steps: AHashMap::new(),
            reads: AHashSet::new(),
            warnings: Vec::new(),
        }
    }
}

impl<P: RemotePlatform> Workspace<P> {
    pub fn new(platform: P) -> Self {
        WorkspaceBuilder::new(platform).build()
    }

    pub fn builder(platform: P) -> WorkspaceBuilder<P> {
        WorkspaceBuilder::new(platform)
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Last known state of a resource.
    pub fn snapshot(&self, resource: ResourceKind, id: &str) -> Option<&Value> {
        self.snapshots.get(&resource).and_then(|m| m.get(id))
    }

    pub fn knows(&self, resource: ResourceKind, id: &str) -> bool {
        self.snapshot(resource, id).is_some()
    }

    pub fn field_arena(&self, form_id: &str) -> Option<&FieldArena> {
        self.fields.get(form_id)
    }

    pub fn step_arena(&self, journey_id: &str) -> Option<&StepArena> {
        self.steps.get(journey_id)
    }

    pub fn warnings(&self) -> &[DestructiveUpdateWarning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<DestructiveUpdateWarning> {
        std::mem::take(&mut self.warnings)
    }

    /// Runs the named operation: validates the input, dispatches it and returns the
    /// platform's result.
    pub fn invoke(&mut self, operation: &str, input: &Value) -> Result<Value, OperationError> {
        match self.registry.invoke(operation, input)? {
            Invocation::Create(draft) => self.create(draft),
            Invocation::Update { resource, request } => self.update(resource, &request),
        }
    }

    pub fn create(&mut self, draft: ResourceDraft) -> Result<Value, OperationError> {
        let kind = draft.kind();
        draft.check()?;
        self.check_cross_references(&draft)?;

        let payload = draft.to_value()?;
        let stored = self.platform.create(kind, payload)?;
        let created = ResourceDraft::from_value(kind, stored.clone())?;
        info!(resource = %kind, id = created.id().unwrap_or_default(), "Created resource");
        self.record(created, stored.clone())?;
        Ok(stored)
    }

    /// Applies `request` locally, validates the merged resource, and dispatches the update.
    ///
    /// A replace on a resource that was not [`read`](Self::read) first records a
    /// [`DestructiveUpdateWarning`]; the update still goes out.
    pub fn update(
        &mut self,
        resource: ResourceKind,
        request: &UpdateRequest,
    ) -> Result<Value, OperationError> {
        let preview = self.preview_update(resource, request)?;
        let key = (resource, request.id.clone());

        if request.is_replace() && self.config.warn_on_unread_replace && !self.reads.contains(&key)
        {
            let warning = DestructiveUpdateWarning {
                resource: resource.to_string(),
                id: request.id.clone(),
                discarded_paths: preview.discarded.clone(),
            };
            warn!(%warning, "Destructive update without prior read");
            self.warnings.push(warning);
        }

        // A merge can leave `info` keys behind that the resulting variant does not permit.
        schema_for(resource)
            .validate_stored(&preview.result)
            .map_err(|e| match e {
                SchemaError::Variant(invalid) => OperationError::Validation(invalid),
                other => OperationError::Schema(other),
            })?;
        let merged = ResourceDraft::from_value(resource, preview.result)?;
        merged.check()?;
        self.check_cross_references(&merged)?;

        let stored = self.platform.update(resource, request)?;
        let updated = ResourceDraft::from_value(resource, stored.clone())?;
        info!(resource = %resource, id = %request.id, policy = ?request.policy(), "Updated resource");
        self.record(updated, stored.clone())?;
        self.reads.remove(&key);
        Ok(stored)
    }

    /// What `request` would do to the current state of the resource, without dispatching it.
    pub fn preview_update(
        &self,
        resource: ResourceKind,
        request: &UpdateRequest,
    ) -> Result<UpdatePreview, OperationError> {
        let current = match self.snapshot(resource, &request.id) {
            Some(current) => current.clone(),
            None => self.platform.read(resource, &request.id)?,
        };
        Ok(merge::preview(
            &current,
            &request.updates_value(),
            request.policy(),
        ))
    }

    /// Reads the current state from the platform and marks the resource as read, which
    /// clears the way for one replace update without a warning.
    pub fn read(&mut self, resource: ResourceKind, id: &str) -> Result<Value, OperationError> {
        let current = self.platform.read(resource, id)?;
        let draft = ResourceDraft::from_value(resource, current.clone())?;
        self.record(draft, current.clone())?;
        self.reads.insert((resource, id.to_string()));
        Ok(current)
    }

    /// Declares a resource that exists on the platform but was not created in this workspace.
    pub fn register_existing(
        &mut self,
        resource: ResourceKind,
        data: Value,
    ) -> Result<(), OperationError> {
        let draft = ResourceDraft::from_value(resource, data.clone())?;
        if draft.id().is_none() {
            return Err(ValidationError::MissingId {
                path: format!("{resource}.id"),
            }
            .into());
        }
        self.record(draft, data)
    }

    pub fn archive(
        &mut self,
        resource: ResourceKind,
        id: &str,
        at: DateTime<Utc>,
    ) -> Result<Value, OperationError> {
        self.update(resource, &archive_request(id, at))
    }

    pub fn unarchive(&mut self, resource: ResourceKind, id: &str) -> Result<Value, OperationError> {
        self.update(resource, &unarchive_request(id))
    }

    /// Validates the complete field set of a form, including the single-root requirement.
    pub fn complete_form(&self, form_id: &str) -> Result<FieldGraph, ValidationError> {
        match self.fields.get(form_id) {
            Some(arena) => arena.finish(),
            None => Err(ValidationError::MissingRoot {
                form_id: form_id.to_string(),
            }),
        }
    }

    /// Validates the complete step chain of a journey, including the entry-step requirement.
    pub fn complete_journey(&self, journey_id: &str) -> Result<StepGraph, ValidationError> {
        match self.steps.get(journey_id) {
            Some(arena) => arena.finish(),
            None => Err(ValidationError::MissingEntryStep {
                journey_id: journey_id.to_string(),
            }),
        }
    }

    fn condition_keys(&self, form_id: &str) -> ConditionKeys {
        let keys = ConditionKeys::from_config(&self.config);
        match self.forms.get(form_id) {
            Some(form) => keys.with_form(form),
            None => keys,
        }
    }

    fn check_cross_references(&self, draft: &ResourceDraft) -> Result<(), ValidationError> {
        match draft {
            ResourceDraft::FormField(field) => self.check_field(field),
            ResourceDraft::AutomationStep(step) => self.check_step(step),
            ResourceDraft::AutomationTrigger(trigger) => self.check_trigger(trigger),
            ResourceDraft::CalendarEventTemplate(template) => self.check_calendar(template),
            ResourceDraft::Form(_) | ResourceDraft::MessageTemplate(_) | ResourceDraft::Journey(_) => {
                Ok(())
            }
        }
    }

    fn check_field(&self, field: &FormField) -> Result<(), ValidationError> {
        let node = field.id().unwrap_or(&field.title);
        self.require(ResourceKind::Form, &field.form_id, node, "formId")?;
        match self.fields.get(&field.form_id) {
            Some(arena) => arena.check(field),
            None => FieldArena::new(&field.form_id, self.condition_keys(&field.form_id)).check(field),
        }
    }

    fn check_step(&self, step: &AutomationStep) -> Result<(), ValidationError> {
        let node = step.id().unwrap_or(step.action.tag());
        self.require(ResourceKind::Journey, &step.journey_id, node, "journeyId")?;
        match self.steps.get(&step.journey_id) {
            Some(arena) => arena.check(step)?,
            None => StepArena::new(&step.journey_id).check(step)?,
        }

        for (i, template) in step.action.referenced_templates().into_iter().enumerate() {
            self.require(
                ResourceKind::MessageTemplate,
                template,
                node,
                &format!("action.info.templateId[{i}]"),
            )?;
        }
        for (i, template) in step.action.referenced_calendar_templates().into_iter().enumerate() {
            self.require(
                ResourceKind::CalendarEventTemplate,
                template,
                node,
                &format!("action.info.templateIds[{i}]"),
            )?;
        }
        for (i, form) in step.action.referenced_forms().into_iter().enumerate() {
            self.require(ResourceKind::Form, form, node, &format!("action.info.formIds[{i}]"))?;
        }
        if let Some(journey) = step.action.referenced_journey() {
            self.require(ResourceKind::Journey, journey, node, "action.info.journeyId")?;
        }
        if self.config.require_known_triggers {
            for (j, event) in step.events.iter().enumerate() {
                if let Some(trigger) = event.trigger_id()
                    && !self.knows(ResourceKind::AutomationTrigger, trigger)
                {
                    return Err(dangling(node, trigger, format!("events[{j}].info.triggerId")));
                }
            }
        }
        Ok(())
    }

    fn check_trigger(&self, trigger: &AutomationTrigger) -> Result<(), ValidationError> {
        let node = trigger.id().unwrap_or(&trigger.title);
        if let Some(journey) = trigger.placed_journey() {
            self.require(ResourceKind::Journey, journey, node, "journeyId")?;
        }
        if let Some(journey) = trigger.action.referenced_journey() {
            self.require(ResourceKind::Journey, journey, node, "action.info.journeyId")?;
        }
        if let Some(form) = trigger.event.referenced_form() {
            self.require(ResourceKind::Form, form, node, "event.info.formId")?;
        }
        for (i, template) in trigger.event.referenced_templates().into_iter().enumerate() {
            self.require(
                ResourceKind::CalendarEventTemplate,
                template,
                node,
                &format!("event.info.templateIds[{i}]"),
            )?;
        }
        Ok(())
    }

    fn check_calendar(&self, template: &CalendarEventTemplate) -> Result<(), ValidationError> {
        let node = template.id().unwrap_or(&template.title);
        for (i, reminder) in template.reminders.iter().enumerate() {
            if let Some(journey) = reminder.kind.referenced_journey() {
                self.require(
                    ResourceKind::Journey,
                    journey,
                    node,
                    &format!("reminders[{i}].info.journeyId"),
                )?;
            }
            if let Some(message) = reminder.kind.referenced_template() {
                self.require(
                    ResourceKind::MessageTemplate,
                    message,
                    node,
                    &format!("reminders[{i}].info.templateId"),
                )?;
            }
        }
        Ok(())
    }

    /// Rejects a reference to an unknown resource when strict references are on.
    fn require(
        &self,
        resource: ResourceKind,
        id: &str,
        node: &str,
        path: &str,
    ) -> Result<(), ValidationError> {
        if !self.config.strict_references || self.knows(resource, id) {
            return Ok(());
        }
        Err(dangling(node, id, path.to_string()))
    }

    fn record(&mut self, draft: ResourceDraft, raw: Value) -> Result<(), OperationError> {
        let kind = draft.kind();
        let id = draft
            .id()
            .map(str::to_string)
            .ok_or_else(|| ValidationError::MissingId {
                path: format!("{kind}.id"),
            })?;

        match draft {
            ResourceDraft::Form(form) => {
                self.forms.insert(id.clone(), form);
                let keys = self.condition_keys(&id);
                self.fields
                    .entry(id.clone())
                    .or_insert_with(|| FieldArena::new(&id, keys.clone()))
                    .set_keys(keys);
            }
            ResourceDraft::FormField(field) => {
                let keys = self.condition_keys(&field.form_id);
                self.fields
                    .entry(field.form_id.clone())
                    .or_insert_with(|| FieldArena::new(&field.form_id, keys))
                    .commit(field)?;
            }
            ResourceDraft::Journey(_) => {
                self.steps
                    .entry(id.clone())
                    .or_insert_with(|| StepArena::new(&id));
            }
            ResourceDraft::AutomationStep(step) => {
                self.steps
                    .entry(step.journey_id.clone())
                    .or_insert_with(|| StepArena::new(&step.journey_id))
                    .commit(step)?;
            }
            ResourceDraft::MessageTemplate(_)
            | ResourceDraft::CalendarEventTemplate(_)
            | ResourceDraft::AutomationTrigger(_) => {}
        }

        self.snapshots.entry(kind).or_default().insert(id, raw);
        Ok(())
    }
}

fn dangling(node: &str, target: &str, path: String) -> ValidationError {
    ValidationError::DanglingReference {
        node_id: node.to_string(),
        target: target.to_string(),
        path,
    }
}
