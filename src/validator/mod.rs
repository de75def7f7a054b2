//! Pre-dispatch validators.
//!
//! - [`ordering`]: the `previousFields` graph of a form's fields.
//! - [`chain`]: the event references of a journey's automation steps.
//! - [`placement`]: top-level `journeyId` placement on automation triggers.
//! - [`options`]: per-type `options` of a single form field.
//!
//! All validators are pure and fail fast on the first problem found.

pub mod chain;
pub mod options;
pub mod ordering;
pub mod placement;

pub use chain::{StepArena, StepGraph, validate_journey_steps};
pub use options::validate_field_options;
pub use ordering::{FieldArena, FieldGraph, validate_form_fields};
pub use placement::validate_trigger_placement;

use crate::config::ValidatorConfig;
use crate::model::Form;

/// The non-field keys a `compoundLogic` leaf may test.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionKeys {
    derived: Vec<String>,
    enduser: Vec<String>,
    allow_custom_fields: bool,
}

impl ConditionKeys {
    pub fn from_config(config: &ValidatorConfig) -> Self {
        Self {
            derived: config.derived_condition_keys.clone(),
            enduser: config.enduser_properties.clone(),
            allow_custom_fields: config.allow_custom_enduser_fields,
        }
    }

    /// Adds the form's scoring titles as derived keys and its intake fields as enduser keys.
    pub fn with_form(mut self, form: &Form) -> Self {
        for rule in &form.scoring {
            if !self.is_derived(&rule.title) {
                self.derived.push(rule.title.clone());
            }
        }
        for field in &form.intake_fields {
            if !self.enduser.contains(field) {
                self.enduser.push(field.clone());
            }
        }
        self
    }

    /// Derived keys compare case-insensitively.
    pub fn is_derived(&self, key: &str) -> bool {
        self.derived.iter().any(|k| k.eq_ignore_ascii_case(key))
    }

    pub fn is_enduser_property(&self, key: &str) -> bool {
        if self.enduser.iter().any(|p| p == key) {
            return true;
        }
        self.allow_custom_fields
            && key
                .strip_prefix("fields.")
                .is_some_and(|name| !name.is_empty())
    }

    /// Whether `key` names a field (per `is_field`), a derived value or an enduser property.
    pub fn resolves(&self, key: &str, is_field: impl Fn(&str) -> bool) -> bool {
        is_field(key) || self.is_derived(key) || self.is_enduser_property(key)
    }
}

impl Default for ConditionKeys {
    fn default() -> Self {
        Self::from_config(&ValidatorConfig::default())
    }
}
