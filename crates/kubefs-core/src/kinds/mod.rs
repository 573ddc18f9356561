//! Built-in specializations.

mod configmap;
mod secret;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::NodeError;
use crate::registry::SpecializationRegistry;
use crate::types::{GroupVersionKind, ObjectRecord};

pub use configmap::{configmap_dir, ConfigMap};
pub use secret::{secret_dir, Secret};

/// Object metadata: name and namespace typed, everything else kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub fn configmap_gvk() -> GroupVersionKind {
    GroupVersionKind::new("", "v1", "ConfigMap")
}

pub fn secret_gvk() -> GroupVersionKind {
    GroupVersionKind::new("", "v1", "Secret")
}

/// Registry with every built-in specialization.
pub fn default_registry() -> SpecializationRegistry {
    SpecializationRegistry::new()
        .with(configmap_gvk(), configmap_dir)
        .with(secret_gvk(), secret_dir)
}

/// Convert a generic record into a typed projection.
fn project<T>(record: &ObjectRecord, kind: &str) -> Result<T, NodeError>
where
    T: for<'de> Deserialize<'de>,
{
    serde_json::from_value(record.document().clone()).map_err(|e| {
        NodeError::Serialization(format!("{} {:?}: {}", kind, record.name(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_kinds() {
        let registry = default_registry();
        assert_eq!(registry.len(), 2);
        assert!(registry.contains(&configmap_gvk()));
        assert!(registry.contains(&secret_gvk()));
        assert!(!registry.contains(&GroupVersionKind::new("", "v1", "Pod")));
    }
}
