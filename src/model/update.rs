use crate::merge::MergePolicy;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Value of `archivedAt` that clears a previous archive.
pub const ARCHIVE_CLEAR_SENTINEL: &str = "";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOptions {
    /// Replace every subtree named in `updates` instead of merging into it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replace_object_fields: Option<bool>,
}

/// `{id, updates, options?}` as sent to the platform's update operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub id: String,
    pub updates: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<UpdateOptions>,
}

impl UpdateRequest {
    pub fn merge(id: impl Into<String>, updates: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            updates,
            options: None,
        }
    }

    pub fn replace(id: impl Into<String>, updates: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            updates,
            options: Some(UpdateOptions {
                replace_object_fields: Some(true),
            }),
        }
    }

    pub fn policy(&self) -> MergePolicy {
        let replace = self
            .options
            .and_then(|o| o.replace_object_fields)
            .unwrap_or(false);
        MergePolicy::from_replace_flag(replace)
    }

    pub fn is_replace(&self) -> bool {
        self.policy() == MergePolicy::Replace
    }

    pub fn updates_value(&self) -> Value {
        Value::Object(self.updates.clone())
    }
}

/// Builds the update that archives `id` at `at`.
pub fn archive_request(id: impl Into<String>, at: DateTime<Utc>) -> UpdateRequest {
    let mut updates = Map::new();
    updates.insert(
        "archivedAt".to_string(),
        json!(at.to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    UpdateRequest::merge(id, updates)
}

/// Builds the update that clears `archivedAt` on `id`.
pub fn unarchive_request(id: impl Into<String>) -> UpdateRequest {
    let mut updates = Map::new();
    updates.insert("archivedAt".to_string(), json!(ARCHIVE_CLEAR_SENTINEL));
    UpdateRequest::merge(id, updates)
}
