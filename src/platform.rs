//! Boundary with the remote configuration platform.

use crate::error::PlatformError;
use crate::merge;
use crate::model::{ResourceKind, UpdateRequest};
use ahash::AHashMap;
use serde_json::{Value, json};
use tracing::debug;

/// The platform that persists resources.
///
/// `create` returns the stored resource including its generated id; `update` returns the
/// resource after the merge/replace policy was applied. The platform is authoritative: the
/// returned values replace whatever the caller held locally.
pub trait RemotePlatform {
    fn create(&mut self, resource: ResourceKind, data: Value) -> Result<Value, PlatformError>;

    fn update(
        &mut self,
        resource: ResourceKind,
        request: &UpdateRequest,
    ) -> Result<Value, PlatformError>;

    fn read(&self, resource: ResourceKind, id: &str) -> Result<Value, PlatformError>;
}

/// A platform held in memory, for tests and dry runs.
///
/// Ids are assigned as `<prefix>_<n>` per resource type, starting at 1.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPlatform {
    store: AHashMap<ResourceKind, Vec<Value>>,
    counters: AHashMap<ResourceKind, u64>,
}

impl InMemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a resource that already carries an id, as if it had been created earlier.
    pub fn seed(&mut self, resource: ResourceKind, data: Value) -> Result<(), PlatformError> {
        let Some(id) = data.get("id").and_then(Value::as_str) else {
            return Err(PlatformError::Rejected {
                operation: "seed".to_string(),
                resource: resource.to_string(),
                message: "seeded resources need an id".to_string(),
            });
        };
        if self.position(resource, id).is_some() {
            return Err(PlatformError::Rejected {
                operation: "seed".to_string(),
                resource: resource.to_string(),
                message: format!("id '{id}' is already taken"),
            });
        }
        self.store.entry(resource).or_default().push(data);
        Ok(())
    }

    /// Stored resources of `resource`, in creation order.
    pub fn resources(&self, resource: ResourceKind) -> &[Value] {
        self.store.get(&resource).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.store.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn position(&self, resource: ResourceKind, id: &str) -> Option<usize> {
        self.resources(resource)
            .iter()
            .position(|r| r.get("id").and_then(Value::as_str) == Some(id))
    }

    fn not_found(resource: ResourceKind, id: &str) -> PlatformError {
        PlatformError::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }
}

impl RemotePlatform for InMemoryPlatform {
    fn create(&mut self, resource: ResourceKind, data: Value) -> Result<Value, PlatformError> {
        let Value::Object(mut data) = data else {
            return Err(PlatformError::Rejected {
                operation: "create".to_string(),
                resource: resource.to_string(),
                message: "payload is not an object".to_string(),
            });
        };
        if data.contains_key("id") {
            return Err(PlatformError::Rejected {
                operation: "create".to_string(),
                resource: resource.to_string(),
                message: "ids are assigned by the platform".to_string(),
            });
        }

        let mut next = self.counters.get(&resource).copied().unwrap_or(0);
        let id = loop {
            next += 1;
            let candidate = format!("{}_{}", resource.id_prefix(), next);
            if self.position(resource, &candidate).is_none() {
                break candidate;
            }
        };
        self.counters.insert(resource, next);
        data.insert("id".to_string(), json!(id));
        debug!(%resource, %id, "Stored new resource");

        let stored = Value::Object(data);
        self.store.entry(resource).or_default().push(stored.clone());
        Ok(stored)
    }

    fn update(
        &mut self,
        resource: ResourceKind,
        request: &UpdateRequest,
    ) -> Result<Value, PlatformError> {
        let index = self
            .position(resource, &request.id)
            .ok_or_else(|| Self::not_found(resource, &request.id))?;
        let items = self.store.entry(resource).or_default();
        let updated = merge::apply_with(&items[index], &request.updates_value(), request.policy());
        items[index] = updated.clone();
        Ok(updated)
    }

    fn read(&self, resource: ResourceKind, id: &str) -> Result<Value, PlatformError> {
        self.position(resource, id)
            .map(|i| self.resources(resource)[i].clone())
            .ok_or_else(|| Self::not_found(resource, id))
    }
}
