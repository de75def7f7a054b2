use thiserror::Error;

/// Errors raised by the local validators before anything is dispatched to the platform.
///
/// Every variant is fatal to the single operation it was raised for. The `path` carried by
/// each variant names the offending field (e.g. `fields.f2.previousFields[0].info.fieldId`).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid variant at '{path}': {message} (expected {expected})")]
    InvalidVariant {
        path: String,
        expected: String,
        message: String,
    },

    #[error("Form '{form_id}' has no field with a root link")]
    MissingRoot { form_id: String },

    #[error(
        "Form '{form_id}' has {} fields with a root link ({}), exactly one is allowed",
        field_ids.len(),
        field_ids.join(", ")
    )]
    DuplicateRoot {
        form_id: String,
        field_ids: Vec<String>,
    },

    #[error("'{node_id}' references unknown id '{target}' at '{path}'")]
    DanglingReference {
        node_id: String,
        target: String,
        path: String,
    },

    #[error("Step '{step_id}' references unknown step '{target}' at '{path}'")]
    DanglingStepReference {
        step_id: String,
        target: String,
        path: String,
    },

    #[error("Journey '{journey_id}' has no step activated by an onJourneyStart event")]
    MissingEntryStep { journey_id: String },

    #[error("Journey '{journey_id}' contains a step reference cycle: {}", cycle.join(" -> "))]
    CyclicStepChain {
        journey_id: String,
        cycle: Vec<String>,
    },

    #[error(
        "Trigger '{trigger}' uses the global action '{action}' and must not set a top-level journeyId (found '{journey_id}')"
    )]
    UnexpectedJourneyIdOnGlobalTrigger {
        trigger: String,
        action: String,
        journey_id: String,
    },

    #[error(
        "Trigger '{trigger}' uses the step-activation action '{action}' and requires a top-level journeyId"
    )]
    MissingJourneyIdForStepActivation { trigger: String, action: String },

    #[error("Invalid condition at '{path}': {message}")]
    InvalidCondition { path: String, message: String },

    #[error("Invalid options for field '{field}' of type '{field_type}': {message}")]
    InvalidOptions {
        field: String,
        field_type: String,
        message: String,
    },

    #[error("Resource at '{path}' has no id; only created resources can be validated as a set")]
    MissingId { path: String },
}

impl ValidationError {
    /// The field path the error points at.
    pub fn path(&self) -> String {
        match self {
            ValidationError::InvalidVariant { path, .. }
            | ValidationError::DanglingReference { path, .. }
            | ValidationError::DanglingStepReference { path, .. }
            | ValidationError::InvalidCondition { path, .. }
            | ValidationError::MissingId { path } => path.clone(),
            ValidationError::MissingRoot { form_id }
            | ValidationError::DuplicateRoot { form_id, .. } => {
                format!("forms.{form_id}.fields[].previousFields")
            }
            ValidationError::MissingEntryStep { journey_id }
            | ValidationError::CyclicStepChain { journey_id, .. } => {
                format!("journeys.{journey_id}.steps[].events")
            }
            ValidationError::UnexpectedJourneyIdOnGlobalTrigger { .. }
            | ValidationError::MissingJourneyIdForStepActivation { .. } => "journeyId".to_string(),
            ValidationError::InvalidOptions { field, .. } => format!("{field}.options"),
        }
    }

    /// The shape the caller has to supply to fix the error.
    pub fn expected(&self) -> String {
        match self {
            ValidationError::InvalidVariant { expected, .. } => expected.clone(),
            ValidationError::MissingRoot { .. } | ValidationError::DuplicateRoot { .. } => {
                "exactly one field with a {type: \"root\"} link".to_string()
            }
            ValidationError::DanglingReference { .. }
            | ValidationError::DanglingStepReference { .. } => {
                "an id returned by a previous create operation".to_string()
            }
            ValidationError::MissingEntryStep { .. } => {
                "at least one step with a {type: \"onJourneyStart\"} event".to_string()
            }
            ValidationError::CyclicStepChain { .. } => {
                "afterAction/waitForTrigger references that never lead back to the same step"
                    .to_string()
            }
            ValidationError::UnexpectedJourneyIdOnGlobalTrigger { .. } => {
                "no top-level journeyId; the journey belongs in action.info".to_string()
            }
            ValidationError::MissingJourneyIdForStepActivation { .. } => {
                "a top-level journeyId naming the journey with the waiting step".to_string()
            }
            ValidationError::InvalidCondition { .. } => {
                "{\"$and\": [...]} | {\"$or\": [...]} | {\"condition\": {<key>: <value>}}"
                    .to_string()
            }
            ValidationError::InvalidOptions { .. } => "options permitted for the field type".to_string(),
            ValidationError::MissingId { .. } => "a resource returned by the platform".to_string(),
        }
    }
}

/// Advisory raised when a destructive update is issued without reading the resource first.
///
/// Not fatal: the update is still dispatched.
#[derive(Error, Debug, Clone, PartialEq)]
#[error(
    "replaceObjectFields=true on {resource} '{id}' without a prior read; data at [{}] would be discarded",
    discarded_paths.join(", ")
)]
pub struct DestructiveUpdateWarning {
    pub resource: String,
    pub id: String,
    pub discarded_paths: Vec<String>,
}

/// Errors produced by the resource schema catalogs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("{resource} input must be a JSON object, found {found}")]
    NotAnObject { resource: String, found: String },

    #[error("{resource} is missing required field '{field}'")]
    MissingField { resource: String, field: String },

    #[error("{resource} has no field named '{field}'")]
    UnknownField { resource: String, field: String },

    #[error("{resource} field '{field}' expects {expected}, found {found}")]
    WrongType {
        resource: String,
        field: String,
        expected: String,
        found: String,
    },

    #[error("{resource} field '{field}' cannot be set by this operation")]
    ReadOnlyField { resource: String, field: String },

    #[error("Update for {resource} contains no changes")]
    EmptyUpdate { resource: String },

    #[error(transparent)]
    Variant(#[from] ValidationError),
}

/// Errors reported by a [`RemotePlatform`](crate::platform::RemotePlatform) implementation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlatformError {
    #[error("Platform rejected {operation} on {resource}: {message}")]
    Rejected {
        operation: String,
        resource: String,
        message: String,
    },

    #[error("Platform has no {resource} with id '{id}'")]
    NotFound { resource: String, id: String },
}

/// Errors that can occur when invoking a named operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OperationError {
    #[error("Operation '{0}' is not registered")]
    UnknownOperation(String),

    #[error("Malformed input for '{operation}': {message}")]
    MalformedInput { operation: String, message: String },

    #[error("Failed to decode {resource}: {message}")]
    Decode { resource: String, message: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Errors that can occur while loading a [`ValidatorConfig`](crate::config::ValidatorConfig).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {message}")]
    Read { path: String, message: String },

    #[error("Failed to parse config '{source_label}': {message}")]
    Parse {
        source_label: String,
        message: String,
    },
}
