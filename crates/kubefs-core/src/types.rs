use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::ClusterError;
use crate::names;

/// Group/Version/Kind: identifies a resource type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupVersionKind {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl GroupVersionKind {
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        GroupVersionKind {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
        }
    }

    /// Build from an object's `apiVersion` and `kind` fields.
    pub fn from_api_version(api_version: &str, kind: impl Into<String>) -> Self {
        let (group, version) = names::split_group_version(api_version);
        GroupVersionKind::new(group, version, kind)
    }

    /// The `apiVersion` string (`apps/v1`, or `v1` for the core group).
    pub fn api_version(&self) -> String {
        names::join_group_version(&self.group, &self.version)
    }
}

impl fmt::Display for GroupVersionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, Kind={}", self.api_version(), self.kind)
    }
}

/// One resource kind served by a group/version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    /// Plural resource name, e.g. `pods` or `pods/log`.
    pub name: String,
    pub kind: String,
    pub namespaced: bool,
}

impl ResourceDescriptor {
    pub fn new(name: impl Into<String>, kind: impl Into<String>, namespaced: bool) -> Self {
        ResourceDescriptor {
            name: name.into(),
            kind: kind.into(),
            namespaced,
        }
    }

    pub fn is_subresource(&self) -> bool {
        names::is_subresource(&self.name)
    }
}

/// Discovery result for a single group/version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupVersionListing {
    pub group_version: String,
    pub resources: Vec<ResourceDescriptor>,
}

impl GroupVersionListing {
    pub fn new(group_version: impl Into<String>, resources: Vec<ResourceDescriptor>) -> Self {
        GroupVersionListing {
            group_version: group_version.into(),
            resources,
        }
    }

    pub fn group(&self) -> &str {
        names::split_group_version(&self.group_version).0
    }

    pub fn version(&self) -> &str {
        names::split_group_version(&self.group_version).1
    }

    /// Directory label under the groups directory.
    pub fn label(&self) -> &str {
        let (group, version) = names::split_group_version(&self.group_version);
        names::group_label(group, version)
    }

    /// Resource kinds that can become directories: everything except subresources.
    ///
    /// This is the only place subresources are filtered; every level that
    /// counts or lists kinds goes through it.
    pub fn kinds(&self) -> impl Iterator<Item = &ResourceDescriptor> + '_ {
        self.resources.iter().filter(|r| !r.is_subresource())
    }

    pub fn has_kinds(&self) -> bool {
        self.kinds().next().is_some()
    }
}

/// A live object as returned by a list call.
///
/// Holds the full document; `name` and `namespace` are extracted once from
/// `metadata`. The namespace is empty for cluster-scoped objects.
#[derive(Debug, Clone)]
pub struct ObjectRecord {
    document: Value,
    name: String,
    namespace: String,
}

impl ObjectRecord {
    /// Wrap a document, extracting `metadata.name` and `metadata.namespace`.
    pub fn from_value(document: Value) -> Result<Self, ClusterError> {
        let metadata = document
            .get("metadata")
            .and_then(Value::as_object)
            .ok_or_else(|| ClusterError::Decode("object has no metadata".to_string()))?;

        let name = metadata
            .get("name")
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ClusterError::Decode("object has no metadata.name".to_string()))?
            .to_string();

        let namespace = metadata
            .get("namespace")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(ObjectRecord {
            document,
            name,
            namespace,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn into_document(self) -> Value {
        self.document
    }

    /// The object's own type, when it carries `apiVersion` and `kind`.
    pub fn gvk(&self) -> Option<GroupVersionKind> {
        let api_version = self.document.get("apiVersion")?.as_str()?;
        let kind = self.document.get("kind")?.as_str()?;
        if kind.is_empty() {
            return None;
        }
        Some(GroupVersionKind::from_api_version(api_version, kind))
    }

    /// Fill in `apiVersion`/`kind` from `gvk` when the document lacks them.
    ///
    /// List responses omit both on every item.
    pub fn with_default_gvk(mut self, gvk: &GroupVersionKind) -> Self {
        if let Some(obj) = self.document.as_object_mut() {
            obj.entry("apiVersion")
                .or_insert_with(|| Value::String(gvk.api_version()));
            obj.entry("kind")
                .or_insert_with(|| Value::String(gvk.kind.clone()));
        }
        self
    }
}

impl PartialEq for ObjectRecord {
    fn eq(&self, other: &Self) -> bool {
        self.document == other.document
    }
}

impl Serialize for ObjectRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.document.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ObjectRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let document = Value::deserialize(deserializer)?;
        ObjectRecord::from_value(document).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_gvk_api_version() {
        assert_eq!(GroupVersionKind::new("", "v1", "Pod").api_version(), "v1");
        assert_eq!(
            GroupVersionKind::new("apps", "v1", "Deployment").api_version(),
            "apps/v1"
        );
    }

    #[test]
    fn test_gvk_from_api_version() {
        let gvk = GroupVersionKind::from_api_version("batch/v1", "Job");
        assert_eq!(gvk, GroupVersionKind::new("batch", "v1", "Job"));
        assert_eq!(gvk.to_string(), "batch/v1, Kind=Job");
    }

    #[test]
    fn test_listing_label_and_kinds() {
        let listing = GroupVersionListing::new(
            "v1",
            vec![
                ResourceDescriptor::new("pods", "Pod", true),
                ResourceDescriptor::new("pods/log", "Pod", true),
                ResourceDescriptor::new("nodes", "Node", false),
            ],
        );
        assert_eq!(listing.group(), "");
        assert_eq!(listing.version(), "v1");
        assert_eq!(listing.label(), "v1");
        let kinds: Vec<_> = listing.kinds().map(|r| r.name.as_str()).collect();
        assert_eq!(kinds, vec!["pods", "nodes"]);
    }

    #[test]
    fn test_listing_with_only_subresources_has_no_kinds() {
        let listing = GroupVersionListing::new(
            "policy/v1",
            vec![ResourceDescriptor::new("pods/eviction", "Eviction", true)],
        );
        assert!(!listing.has_kinds());
        assert_eq!(listing.label(), "policy");
    }

    #[test]
    fn test_record_extracts_name_and_namespace() {
        let record = ObjectRecord::from_value(json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": {"name": "nginx", "namespace": "default"}
        }))
        .unwrap();
        assert_eq!(record.name(), "nginx");
        assert_eq!(record.namespace(), "default");
        assert_eq!(record.gvk(), Some(GroupVersionKind::new("", "v1", "Pod")));
    }

    #[test]
    fn test_record_cluster_scoped_has_empty_namespace() {
        let record = ObjectRecord::from_value(json!({
            "metadata": {"name": "node-1"}
        }))
        .unwrap();
        assert_eq!(record.namespace(), "");
        assert_eq!(record.gvk(), None);
    }

    #[test]
    fn test_record_requires_name() {
        assert!(ObjectRecord::from_value(json!({"metadata": {}})).is_err());
        assert!(ObjectRecord::from_value(json!({"kind": "Pod"})).is_err());
        assert!(ObjectRecord::from_value(json!("just a string")).is_err());
    }

    #[test]
    fn test_with_default_gvk_only_fills_missing() {
        let gvk = GroupVersionKind::new("apps", "v1", "Deployment");
        let bare = ObjectRecord::from_value(json!({"metadata": {"name": "web"}}))
            .unwrap()
            .with_default_gvk(&gvk);
        assert_eq!(bare.gvk(), Some(gvk.clone()));

        let explicit = ObjectRecord::from_value(json!({
            "apiVersion": "apps/v1beta2",
            "kind": "Deployment",
            "metadata": {"name": "web"}
        }))
        .unwrap()
        .with_default_gvk(&gvk);
        assert_eq!(explicit.gvk().unwrap().version, "v1beta2");
    }

    #[test]
    fn test_record_serde_is_transparent() {
        let doc = json!({"metadata": {"name": "a", "namespace": "b"}, "spec": {"x": 1}});
        let record = ObjectRecord::from_value(doc.clone()).unwrap();
        assert_eq!(serde_json::to_value(&record).unwrap(), doc);
        let back: ObjectRecord = serde_json::from_value(doc).unwrap();
        assert_eq!(back, record);
    }
}
