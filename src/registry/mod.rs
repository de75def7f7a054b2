//! Named, independently invocable operations.
//!
//! Every resource type has a `create<Resource>` and an `update<Resource>` operation. Each
//! operation checks its raw JSON input against the resource's field catalog, decodes it into
//! the typed model and runs the checks that only need the single resource (field options,
//! trigger placement). Checks that need other resources (ordering, chains, references) run
//! in the [`Workspace`](crate::workspace::Workspace).

pub mod catalog;
pub mod describe;
pub mod schema;

pub use catalog::schema_for;
pub use describe::OperationFormatter;
pub use schema::{Access, FieldKind, FieldSpec, ResourceSchema, VariantKind};

use crate::error::{OperationError, ValidationError};
use crate::model::{
    AutomationStep, AutomationTrigger, CalendarEventTemplate, Form, FormField, Journey,
    MessageTemplate, Resource, ResourceKind, UpdateRequest,
};
use crate::validator::{validate_field_options, validate_trigger_placement};
use ahash::AHashMap;
use catalog::{create_operation_by_name, register_default_operations};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Create,
    Update,
}

/// Input and output contract of one operation.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDescriptor {
    pub name: String,
    pub kind: OperationKind,
    pub resource: ResourceKind,
    pub description: String,
    pub schema: &'static ResourceSchema,
    pub output: String,
}

impl OperationDescriptor {
    pub fn input_schema(&self) -> Value {
        match self.kind {
            OperationKind::Create => self.schema.create_input_schema(),
            OperationKind::Update => self.schema.update_input_schema(),
        }
    }
}

/// A typed resource, ready to be sent to the platform.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceDraft {
    Form(Form),
    FormField(FormField),
    MessageTemplate(MessageTemplate),
    CalendarEventTemplate(CalendarEventTemplate),
    Journey(Journey),
    AutomationStep(AutomationStep),
    AutomationTrigger(AutomationTrigger),
}

impl ResourceDraft {
    /// Decodes a full resource of `kind` from JSON.
    pub fn from_value(kind: ResourceKind, value: Value) -> Result<Self, OperationError> {
        let decode_error = |e: serde_json::Error| OperationError::Decode {
            resource: kind.to_string(),
            message: e.to_string(),
        };
        Ok(match kind {
            ResourceKind::Form => Self::Form(serde_json::from_value(value).map_err(decode_error)?),
            ResourceKind::FormField => {
                Self::FormField(serde_json::from_value(value).map_err(decode_error)?)
            }
            ResourceKind::MessageTemplate => {
                Self::MessageTemplate(serde_json::from_value(value).map_err(decode_error)?)
            }
            ResourceKind::CalendarEventTemplate => {
                Self::CalendarEventTemplate(serde_json::from_value(value).map_err(decode_error)?)
            }
            ResourceKind::Journey => {
                Self::Journey(serde_json::from_value(value).map_err(decode_error)?)
            }
            ResourceKind::AutomationStep => {
                Self::AutomationStep(serde_json::from_value(value).map_err(decode_error)?)
            }
            ResourceKind::AutomationTrigger => {
                Self::AutomationTrigger(serde_json::from_value(value).map_err(decode_error)?)
            }
        })
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Form(_) => ResourceKind::Form,
            Self::FormField(_) => ResourceKind::FormField,
            Self::MessageTemplate(_) => ResourceKind::MessageTemplate,
            Self::CalendarEventTemplate(_) => ResourceKind::CalendarEventTemplate,
            Self::Journey(_) => ResourceKind::Journey,
            Self::AutomationStep(_) => ResourceKind::AutomationStep,
            Self::AutomationTrigger(_) => ResourceKind::AutomationTrigger,
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Form(r) => r.id(),
            Self::FormField(r) => r.id(),
            Self::MessageTemplate(r) => r.id(),
            Self::CalendarEventTemplate(r) => r.id(),
            Self::Journey(r) => r.id(),
            Self::AutomationStep(r) => r.id(),
            Self::AutomationTrigger(r) => r.id(),
        }
    }

    pub fn to_value(&self) -> Result<Value, OperationError> {
        let result = match self {
            Self::Form(r) => serde_json::to_value(r),
            Self::FormField(r) => serde_json::to_value(r),
            Self::MessageTemplate(r) => serde_json::to_value(r),
            Self::CalendarEventTemplate(r) => serde_json::to_value(r),
            Self::Journey(r) => serde_json::to_value(r),
            Self::AutomationStep(r) => serde_json::to_value(r),
            Self::AutomationTrigger(r) => serde_json::to_value(r),
        };
        result.map_err(|e| OperationError::Decode {
            resource: self.kind().to_string(),
            message: e.to_string(),
        })
    }

    /// Checks that only need this resource.
    pub fn check(&self) -> Result<(), ValidationError> {
        match self {
            Self::FormField(field) => validate_field_options(field),
            Self::AutomationTrigger(trigger) => validate_trigger_placement(trigger).map(drop),
            Self::Journey(journey) => match &journey.default_state {
                Some(state) if !journey.states.is_empty() && !journey.has_state(state) => {
                    Err(ValidationError::DanglingReference {
                        node_id: journey.label(),
                        target: state.clone(),
                        path: "defaultState".to_string(),
                    })
                }
                _ => Ok(()),
            },
            _ => Ok(()),
        }
    }
}

/// The validated outcome of invoking an operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    Create(ResourceDraft),
    Update {
        resource: ResourceKind,
        request: UpdateRequest,
    },
}

impl Invocation {
    pub fn resource(&self) -> ResourceKind {
        match self {
            Invocation::Create(draft) => draft.kind(),
            Invocation::Update { resource, .. } => *resource,
        }
    }
}

/// Defines the contract for one named operation.
pub trait OperationHandler: Send + Sync {
    fn name(&self) -> &str;
    fn descriptor(&self) -> OperationDescriptor;
    fn prepare(&self, input: &Value) -> Result<Invocation, OperationError>;
}

pub struct Registry {
    operations: AHashMap<String, Box<dyn OperationHandler>>,
}

pub struct RegistryBuilder {
    operations: AHashMap<String, Box<dyn OperationHandler>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        let mut operations: AHashMap<String, Box<dyn OperationHandler>> = AHashMap::new();
        register_default_operations(&mut operations);
        Self { operations }
    }

    /// Exposes a built-in operation under another name as well.
    pub fn with_alias(mut self, alias: &str, operation: &str) -> Self {
        if let Some(handler) = create_operation_by_name(operation) {
            self.operations.insert(alias.to_string(), handler);
        }
        self
    }

    pub fn with_operation(mut self, handler: Box<dyn OperationHandler>) -> Self {
        self.operations.insert(handler.name().to_string(), handler);
        self
    }

    pub fn build(self) -> Registry {
        Registry {
            operations: self.operations,
        }
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    /// Operation names, sorted.
    pub fn operation_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.operations.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn describe(&self, name: &str) -> Option<OperationDescriptor> {
        self.operations.get(name).map(|handler| {
            let mut descriptor = handler.descriptor();
            descriptor.name = name.to_string();
            descriptor
        })
    }

    /// Every descriptor, sorted by name.
    pub fn descriptors(&self) -> Vec<OperationDescriptor> {
        self.operation_names()
            .into_iter()
            .filter_map(|name| self.describe(name))
            .collect()
    }

    /// Validates `input` for the operation `name` and returns the typed request.
    pub fn invoke(&self, name: &str, input: &Value) -> Result<Invocation, OperationError> {
        let handler = self
            .operations
            .get(name)
            .ok_or_else(|| OperationError::UnknownOperation(name.to_string()))?;
        debug!(operation = name, "Preparing operation");
        handler.prepare(input)
    }
}

impl Default for Registry {
    fn default() -> Self {
        RegistryBuilder::new().build()
    }
}
