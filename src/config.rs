//! Validator configuration
//!
//! Loaded from YAML, either from an explicit path or from the file named by `KOUSEI_CONFIG`.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Environment variable naming the config file read by [`ValidatorConfig::from_env`].
pub const CONFIG_ENV_VAR: &str = "KOUSEI_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Computed values a `compoundLogic` leaf may test besides field ids.
    pub derived_condition_keys: Vec<String>,
    /// Built-in enduser properties a `compoundLogic` leaf may test.
    pub enduser_properties: Vec<String>,
    /// Accept `fields.<name>` leaf keys addressing custom enduser fields.
    pub allow_custom_enduser_fields: bool,
    /// Reject references to forms, templates and journeys the workspace does not know.
    pub strict_references: bool,
    /// Also reject `waitForTrigger` events naming triggers the workspace does not know.
    pub require_known_triggers: bool,
    /// Emit a [`DestructiveUpdateWarning`](crate::error::DestructiveUpdateWarning) for replace
    /// updates on resources that were not read first.
    pub warn_on_unread_replace: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            derived_condition_keys: ["age", "score", "bmi"].map(String::from).to_vec(),
            enduser_properties: [
                "fname",
                "lname",
                "email",
                "phone",
                "dateOfBirth",
                "gender",
                "state",
                "timezone",
                "tags",
                "journeys",
                "assignedTo",
                "height",
                "weight",
                "insurance",
            ]
            .map(String::from)
            .to_vec(),
            allow_custom_enduser_fields: true,
            strict_references: true,
            require_known_triggers: false,
            warn_on_unread_replace: true,
        }
    }
}

impl ValidatorConfig {
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        Self::parse(source, "<inline>")
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("Loading validator configuration from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Loads the file named by `KOUSEI_CONFIG`, or the defaults when the variable is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.is_empty() => Self::from_file(path),
            _ => Ok(Self::default()),
        }
    }

    fn parse(source: &str, label: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to an empty mapping.
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(source).map_err(|e| ConfigError::Parse {
            source_label: label.to_string(),
            message: e.to_string(),
        })
    }
}
