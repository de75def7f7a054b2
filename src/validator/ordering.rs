//! Validation of a form's `previousFields` graph.
//!
//! [`validate_form_fields`] checks a complete field set. [`FieldArena`] holds the fields of
//! one form in creation order and checks each new field against the fields created before
//! it, so a link to a field that does not exist yet is caught before dispatch.

use super::ConditionKeys;
use crate::error::ValidationError;
use crate::model::{FormField, PreviousFieldLink, Resource};
use ahash::{AHashMap, AHashSet};
use std::collections::VecDeque;
use tracing::debug;

/// A validated field graph: one root and the fields shown after each field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldGraph {
    form_id: String,
    root: String,
    ids: Vec<String>,
    successors: AHashMap<String, Vec<String>>,
}

impl FieldGraph {
    pub fn form_id(&self) -> &str {
        &self.form_id
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Fields linked directly after `id`.
    pub fn successors(&self, id: &str) -> &[String] {
        self.successors.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Breadth-first order starting at the root. Fields not reachable from the root are left out.
    pub fn display_order(&self) -> Vec<String> {
        let mut seen = AHashSet::new();
        let mut order = Vec::new();
        let mut queue = VecDeque::from([self.root.clone()]);
        while let Some(id) = queue.pop_front() {
            if !seen.insert(id.clone()) {
                continue;
            }
            queue.extend(self.successors(&id).iter().cloned());
            order.push(id);
        }
        order
    }
}

/// Validates the complete field set of `form_id`.
///
/// Checks run in order: every field has an id, exactly one active field has a root link, every
/// link target is a field of the set, every `compoundLogic` leaf key resolves, and every
/// `Question Group` sub-field exists. Archived fields remain valid link targets but never
/// count as the root.
pub fn validate_form_fields(
    form_id: &str,
    fields: &[FormField],
    keys: &ConditionKeys,
) -> Result<FieldGraph, ValidationError> {
    debug!(form_id, fields = fields.len(), "Validating form field ordering");

    let mut ids = Vec::with_capacity(fields.len());
    for (i, field) in fields.iter().enumerate() {
        match field.id() {
            Some(id) => ids.push(id.to_string()),
            None => {
                return Err(ValidationError::MissingId {
                    path: format!("fields[{i}].id"),
                });
            }
        }
    }
    let known: AHashSet<&str> = ids.iter().map(String::as_str).collect();

    let roots: Vec<String> = fields
        .iter()
        .filter(|f| !f.is_archived() && f.has_root_link())
        .map(|f| f.label())
        .collect();
    let root = match roots.as_slice() {
        [] => {
            return Err(ValidationError::MissingRoot {
                form_id: form_id.to_string(),
            });
        }
        [root] => root.clone(),
        _ => {
            return Err(ValidationError::DuplicateRoot {
                form_id: form_id.to_string(),
                field_ids: roots,
            });
        }
    };

    let mut successors: AHashMap<String, Vec<String>> = AHashMap::new();
    for field in fields {
        check_links(field, keys, |id| known.contains(id))?;
        let id = field.label();
        for target in field.previous_fields.iter().filter_map(PreviousFieldLink::target) {
            let next = successors.entry(target.to_string()).or_default();
            if !next.contains(&id) {
                next.push(id.clone());
            }
        }
    }

    Ok(FieldGraph {
        form_id: form_id.to_string(),
        root,
        ids,
        successors,
    })
}

/// Resolves every reference held by `field` through `is_field`.
fn check_links(
    field: &FormField,
    keys: &ConditionKeys,
    is_field: impl Fn(&str) -> bool,
) -> Result<(), ValidationError> {
    let node_id = field.label();
    let dangling = |target: &str, path: String| ValidationError::DanglingReference {
        node_id: node_id.clone(),
        target: target.to_string(),
        path,
    };

    for (i, link) in field.previous_fields.iter().enumerate() {
        let base = format!("fields.{node_id}.previousFields[{i}].info");
        if let Some(target) = link.target()
            && !is_field(target)
        {
            return Err(dangling(target, format!("{base}.fieldId")));
        }
        if let PreviousFieldLink::CompoundLogic(info) = link {
            for (path, key) in info.condition.leaf_keys(&format!("{base}.condition")) {
                if !keys.resolves(key, &is_field) {
                    return Err(dangling(key, path));
                }
            }
        }
    }

    if let Some(sub_fields) = &field.options.sub_fields {
        for (j, sub) in sub_fields.iter().enumerate() {
            if !is_field(&sub.id) {
                return Err(dangling(
                    &sub.id,
                    format!("fields.{node_id}.options.subFields[{j}].id"),
                ));
            }
        }
    }
    Ok(())
}

/// The fields of one form, held in creation order.
#[derive(Debug, Clone)]
pub struct FieldArena {
    form_id: String,
    keys: ConditionKeys,
    fields: Vec<FormField>,
    index: AHashMap<String, usize>,
}

impl FieldArena {
    pub fn new(form_id: impl Into<String>, keys: ConditionKeys) -> Self {
        Self {
            form_id: form_id.into(),
            keys,
            fields: Vec::new(),
            index: AHashMap::new(),
        }
    }

    pub fn form_id(&self) -> &str {
        &self.form_id
    }

    pub fn keys(&self) -> &ConditionKeys {
        &self.keys
    }

    pub fn set_keys(&mut self, keys: ConditionKeys) {
        self.keys = keys;
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&FormField> {
        self.index.get(id).map(|&i| &self.fields[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Checks a field before it is created or updated.
    ///
    /// Links may only point at fields already in the arena (or at the field itself when it
    /// is being updated). A second active root is rejected here; a missing root is only
    /// reported by [`finish`](Self::finish).
    pub fn check(&self, field: &FormField) -> Result<(), ValidationError> {
        let own_id = field.id();
        check_links(field, &self.keys, |id| {
            self.index.contains_key(id) || own_id == Some(id)
        })?;

        if !field.is_archived() && field.has_root_link() {
            let mut roots: Vec<String> = self
                .fields
                .iter()
                .filter(|f| f.id() != own_id && !f.is_archived() && f.has_root_link())
                .map(|f| f.label())
                .collect();
            if !roots.is_empty() {
                roots.push(field.label());
                return Err(ValidationError::DuplicateRoot {
                    form_id: self.form_id.clone(),
                    field_ids: roots,
                });
            }
        }
        Ok(())
    }

    /// Records a field returned by the platform, replacing any earlier version with the same id.
    pub fn commit(&mut self, field: FormField) -> Result<(), ValidationError> {
        let id = field
            .id()
            .map(str::to_string)
            .ok_or_else(|| ValidationError::MissingId {
                path: format!("forms.{}.fields[{}].id", self.form_id, self.fields.len()),
            })?;
        match self.index.get(&id) {
            Some(&i) => self.fields[i] = field,
            None => {
                self.index.insert(id, self.fields.len());
                self.fields.push(field);
            }
        }
        Ok(())
    }

    /// [`check`](Self::check) followed by [`commit`](Self::commit).
    pub fn insert(&mut self, field: FormField) -> Result<(), ValidationError> {
        self.check(&field)?;
        self.commit(field)
    }

    /// Validates the complete set; called once the caller considers the form done.
    pub fn finish(&self) -> Result<FieldGraph, ValidationError> {
        validate_form_fields(&self.form_id, &self.fields, &self.keys)
    }
}
