//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the kousei crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use kousei::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let config = ValidatorConfig::from_env()?;
//! let bundle = Bundle::from_file("path/to/export.json")?;
//! let report = bundle.validate_all(&config)?;
//! println!("{} forms, {} journeys", report.forms.len(), report.journeys.len());
//! # Ok(())
//! # }
//! ```

// Session and dispatch
pub use crate::platform::{InMemoryPlatform, RemotePlatform};
pub use crate::registry::{Invocation, OperationFormatter, Registry, ResourceDraft};
pub use crate::workspace::{Workspace, WorkspaceBuilder};

// Resources
pub use crate::model::{
    AutomationStep, AutomationTrigger, CalendarEventTemplate, Condition, Form, FormField,
    FormFieldType, Journey, MessageTemplate, PreviousFieldLink, Resource, ResourceKind,
    StepAction, StepEvent, TriggerAction, TriggerEvent, UpdateOptions, UpdateRequest,
};

// Validation
pub use crate::bundle::{Bundle, BundleReport};
pub use crate::config::ValidatorConfig;
pub use crate::merge::{MergePolicy, UpdatePreview};
pub use crate::validator::{
    ConditionKeys, FieldGraph, StepGraph, validate_field_options, validate_form_fields,
    validate_journey_steps, validate_trigger_placement,
};

// Error types
pub use crate::error::{
    ConfigError, DestructiveUpdateWarning, OperationError, SchemaError, ValidationError,
};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
