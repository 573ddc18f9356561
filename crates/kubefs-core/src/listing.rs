use std::sync::Arc;

use tracing::debug;

use crate::error::NodeError;
use crate::names;
use crate::node::{DirEntry, Env, Node};
use crate::object::ObjectDir;
use crate::types::{GroupVersionKind, ObjectRecord};

/// Namespaces present in one namespaced listing.
///
/// The listing is captured when the kind is resolved; resolving a namespace
/// filters that same snapshot rather than listing again.
#[derive(Debug, Clone)]
pub struct ResourceNamespacesDir {
    env: Env,
    gvk: GroupVersionKind,
    records: Arc<[ObjectRecord]>,
}

impl ResourceNamespacesDir {
    pub fn new(env: Env, gvk: GroupVersionKind, records: Vec<ObjectRecord>) -> Self {
        ResourceNamespacesDir {
            env,
            gvk,
            records: records.into(),
        }
    }

    fn namespaces(&self) -> Vec<String> {
        names::dedup(
            self.records
                .iter()
                .map(ObjectRecord::namespace)
                .filter(|ns| !ns.is_empty()),
        )
    }

    pub fn list_children(&self) -> Vec<DirEntry> {
        let namespaces = self.namespaces();
        debug!(gvk = %self.gvk, entries = ?namespaces, "readdir on resource namespaces dir");
        DirEntry::dirs(namespaces)
    }

    pub fn resolve(&self, namespace: &str) -> Result<Node, NodeError> {
        if namespace.is_empty() || !self.records.iter().any(|r| r.namespace() == namespace) {
            return Err(NodeError::NotFound(namespace.to_string()));
        }
        Ok(Node::Resource(ResourceDir::new(
            self.env.clone(),
            self.gvk.clone(),
            self.records.clone(),
            namespace.to_string(),
        )))
    }
}

/// Objects of one kind. An empty namespace filter passes every item.
#[derive(Debug, Clone)]
pub struct ResourceDir {
    env: Env,
    gvk: GroupVersionKind,
    records: Arc<[ObjectRecord]>,
    namespace: String,
}

impl ResourceDir {
    pub fn new(
        env: Env,
        gvk: GroupVersionKind,
        records: Arc<[ObjectRecord]>,
        namespace: String,
    ) -> Self {
        ResourceDir {
            env,
            gvk,
            records,
            namespace,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn visible(&self) -> impl Iterator<Item = &ObjectRecord> + '_ {
        self.records
            .iter()
            .filter(|r| self.namespace.is_empty() || r.namespace() == self.namespace)
    }

    pub fn list_children(&self) -> Vec<DirEntry> {
        let names = names::dedup(self.visible().map(ObjectRecord::name));
        debug!(gvk = %self.gvk, namespace = %self.namespace, entries = ?names, "readdir on resource dir");
        DirEntry::dirs(names)
    }

    /// Build the object's node: the registered specialization for its kind,
    /// or the generic yaml/json view.
    pub fn resolve(&self, name: &str) -> Result<Node, NodeError> {
        let record = self
            .visible()
            .find(|r| r.name() == name)
            .ok_or_else(|| NodeError::NotFound(name.to_string()))?;

        let gvk = record.gvk().unwrap_or_else(|| self.gvk.clone());
        match self.env.registry.build(&gvk, record) {
            Some(specialized) => {
                debug!(%gvk, name, "built specialized object dir");
                Ok(Node::Specialized(specialized?))
            }
            None => Ok(Node::Object(ObjectDir::new(record.clone()))),
        }
    }
}
