use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{project, ObjectMeta};
use crate::error::NodeError;
use crate::registry::{KeyValueDir, SpecializedDir};
use crate::types::ObjectRecord;

/// Typed Secret. `data` values are base64 on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Secret {
    pub metadata: ObjectMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<BTreeMap<String, String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Secret {
    /// Decoded values, keyed like `data`.
    pub fn decoded(&self) -> Result<BTreeMap<String, Vec<u8>>, NodeError> {
        self.data
            .iter()
            .flatten()
            .map(|(key, value)| {
                STANDARD
                    .decode(value)
                    .map(|bytes| (key.clone(), bytes))
                    .map_err(|e| {
                        NodeError::Serialization(format!(
                            "secret {:?} key {:?} is not valid base64: {}",
                            self.metadata.name, key, e
                        ))
                    })
            })
            .collect()
    }
}

/// `data/<key>` holds the decoded bytes. `yaml`/`json` keep the encoded form.
pub fn secret_dir(record: &ObjectRecord) -> Result<Box<dyn SpecializedDir>, NodeError> {
    let secret: Secret = project(record, "Secret")?;
    let data = secret.decoded()?;
    Ok(Box::new(KeyValueDir::new("secret dir", secret, data)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use serde_json::json;

    fn record(doc: Value) -> ObjectRecord {
        ObjectRecord::from_value(doc).unwrap()
    }

    #[test]
    fn test_data_is_decoded() {
        let secret = record(json!({
            "apiVersion": "v1",
            "kind": "Secret",
            "type": "Opaque",
            "metadata": {"name": "db", "namespace": "prod"},
            "data": {"password": "aHVudGVyMg==", "user": "YWRtaW4="}
        }));
        let dir = secret_dir(&secret).unwrap();
        let Node::Map(data) = dir.resolve("data").unwrap() else {
            panic!("expected data dir");
        };
        let password = data.resolve("password").unwrap();
        assert_eq!(password.read_content(0, 64).unwrap(), b"hunter2");
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn test_json_keeps_encoded_values() {
        let doc = json!({
            "kind": "Secret",
            "metadata": {"name": "db"},
            "data": {"password": "aHVudGVyMg=="}
        });
        let dir = secret_dir(&record(doc.clone())).unwrap();
        let node = dir.resolve("json").unwrap();
        let bytes = node.read_content(0, node.stat().size).unwrap();
        let back: Value = serde_json::from_slice(bytes).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_bad_base64_fails_construction() {
        let secret = record(json!({
            "kind": "Secret",
            "metadata": {"name": "db"},
            "data": {"password": "not base64!"}
        }));
        let err = secret_dir(&secret).unwrap_err();
        match err {
            NodeError::Serialization(msg) => assert!(msg.contains("password")),
            other => panic!("expected serialization failure, got {:?}", other),
        }
    }
}
