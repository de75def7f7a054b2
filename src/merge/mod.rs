//! Merge and replace semantics for partial updates.
//!
//! A single recursive walk over [`serde_json::Value`] trees, parameterized by [`MergePolicy`].
//! The engine knows nothing about resource types; the platform applies the same rules to
//! every update it receives.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How `updates` are combined with the current resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergePolicy {
    /// Objects merge key-wise, arrays append, scalars overwrite.
    #[default]
    Merge,
    /// Every key named in the patch replaces the whole subtree under it.
    Replace,
}

impl MergePolicy {
    pub fn from_replace_flag(replace: bool) -> Self {
        if replace {
            MergePolicy::Replace
        } else {
            MergePolicy::Merge
        }
    }
}

/// Applies `patch` to `current` and returns the updated value.
pub fn apply(current: &Value, patch: &Value, replace: bool) -> Value {
    apply_with(current, patch, MergePolicy::from_replace_flag(replace))
}

pub fn apply_with(current: &Value, patch: &Value, policy: MergePolicy) -> Value {
    match policy {
        MergePolicy::Merge => merge_value(current, patch),
        MergePolicy::Replace => replace_top_level(current, patch),
    }
}

fn merge_value(current: &Value, patch: &Value) -> Value {
    match (current, patch) {
        (Value::Object(current), Value::Object(patch)) => {
            let mut merged = current.clone();
            for (key, incoming) in patch {
                let next = match current.get(key) {
                    Some(existing) => merge_value(existing, incoming),
                    None => incoming.clone(),
                };
                merged.insert(key.clone(), next);
            }
            Value::Object(merged)
        }
        (Value::Array(current), Value::Array(patch)) => {
            Value::Array(current.iter().chain(patch).cloned().collect())
        }
        (_, patch) => patch.clone(),
    }
}

fn replace_top_level(current: &Value, patch: &Value) -> Value {
    match (current, patch) {
        (Value::Object(current), Value::Object(patch)) => {
            let mut replaced = current.clone();
            for (key, incoming) in patch {
                replaced.insert(key.clone(), incoming.clone());
            }
            Value::Object(replaced)
        }
        (_, patch) => patch.clone(),
    }
}

/// Paths of the data a replace of `current` by `patch` would throw away.
///
/// Only subtrees named by the patch are inspected. Object keys the patch omits, array items
/// the patch array does not carry, and containers overwritten by a non-container are
/// reported. Paths use dots for keys and `[i]` for array positions in `current`.
pub fn discarded_paths(current: &Value, patch: &Value) -> Vec<String> {
    let mut lost = Vec::new();
    if let (Value::Object(current), Value::Object(patch)) = (current, patch) {
        for (key, incoming) in patch {
            if let Some(existing) = current.get(key) {
                collect_lost(existing, incoming, key, &mut lost);
            }
        }
    }
    lost
}

fn collect_lost(current: &Value, patch: &Value, path: &str, lost: &mut Vec<String>) {
    match (current, patch) {
        (Value::Object(current), Value::Object(patch)) => {
            for (key, existing) in current {
                let child = format!("{path}.{key}");
                match patch.get(key) {
                    Some(incoming) => collect_lost(existing, incoming, &child, lost),
                    None => lost.push(child),
                }
            }
        }
        (Value::Array(current), Value::Array(patch)) => {
            lost.extend(
                current
                    .iter()
                    .enumerate()
                    .filter(|(_, item)| !patch.contains(item))
                    .map(|(i, _)| format!("{path}[{i}]")),
            );
        }
        (Value::Object(map), _) if !map.is_empty() => lost.push(path.to_string()),
        (Value::Array(items), _) if !items.is_empty() => lost.push(path.to_string()),
        _ => {}
    }
}

/// Outcome of applying an update without dispatching it.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdatePreview {
    pub policy: MergePolicy,
    pub result: Value,
    /// Data lost to the update; always empty under [`MergePolicy::Merge`].
    pub discarded: Vec<String>,
}

impl UpdatePreview {
    pub fn is_destructive(&self) -> bool {
        !self.discarded.is_empty()
    }
}

pub fn preview(current: &Value, patch: &Value, policy: MergePolicy) -> UpdatePreview {
    let discarded = match policy {
        MergePolicy::Merge => Vec::new(),
        MergePolicy::Replace => discarded_paths(current, patch),
    };
    UpdatePreview {
        policy,
        result: apply_with(current, patch, policy),
        discarded,
    }
}

/// Merges `patch` into an object map in place; used where the caller already holds a map.
pub fn apply_to_map(current: &mut Map<String, Value>, patch: &Map<String, Value>, policy: MergePolicy) {
    let merged = apply_with(
        &Value::Object(std::mem::take(current)),
        &Value::Object(patch.clone()),
        policy,
    );
    if let Value::Object(map) = merged {
        *current = map;
    }
}
