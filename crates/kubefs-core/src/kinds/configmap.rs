use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{project, ObjectMeta};
use crate::error::NodeError;
use crate::registry::{KeyValueDir, SpecializedDir};
use crate::types::ObjectRecord;

/// Typed ConfigMap. Fields not named here ride along in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMap {
    pub metadata: ObjectMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<BTreeMap<String, String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `data/<key>` holds the raw value string.
pub fn configmap_dir(record: &ObjectRecord) -> Result<Box<dyn SpecializedDir>, NodeError> {
    let configmap: ConfigMap = project(record, "ConfigMap")?;
    let data = configmap
        .data
        .iter()
        .flatten()
        .map(|(k, v)| (k.clone(), v.clone().into_bytes()))
        .collect();
    Ok(Box::new(KeyValueDir::new("configmap dir", configmap, data)))
}
