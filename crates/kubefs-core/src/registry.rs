//! Kind-specific object views.
//!
//! A [`SpecializationRegistry`] maps a GVK to a constructor that turns a
//! generic [`ObjectRecord`] into its own directory node. The registry is built
//! once at startup and handed to the projection; nothing registers into it
//! afterwards.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::NodeError;
use crate::file::FileNode;
use crate::node::{DirEntry, Node};
use crate::object::{resolve_document, JSON_FILE, YAML_FILE};
use crate::types::{GroupVersionKind, ObjectRecord};

/// Name of the key/value sub-directory of a specialized object.
pub const DATA_DIR: &str = "data";

/// A directory node produced by a registered constructor.
pub trait SpecializedDir: fmt::Debug + Send + Sync {
    /// Short name used in logs.
    fn type_name(&self) -> &'static str;

    fn list_children(&self) -> Vec<DirEntry>;

    fn resolve(&self, name: &str) -> Result<Node, NodeError>;
}

/// Converts a generic record into a specialized node. Must fail with
/// `Serialization` when the record does not fit the kind's shape.
pub type Constructor =
    Arc<dyn Fn(&ObjectRecord) -> Result<Box<dyn SpecializedDir>, NodeError> + Send + Sync>;

/// GVK → constructor map.
#[derive(Clone, Default)]
pub struct SpecializationRegistry {
    constructors: HashMap<GroupVersionKind, Constructor>,
}

impl SpecializationRegistry {
    /// An empty registry: every object gets the generic view.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, gvk: GroupVersionKind, constructor: F)
    where
        F: Fn(&ObjectRecord) -> Result<Box<dyn SpecializedDir>, NodeError> + Send + Sync + 'static,
    {
        self.constructors.insert(gvk, Arc::new(constructor));
    }

    /// Builder form of [`register`](Self::register).
    pub fn with<F>(mut self, gvk: GroupVersionKind, constructor: F) -> Self
    where
        F: Fn(&ObjectRecord) -> Result<Box<dyn SpecializedDir>, NodeError> + Send + Sync + 'static,
    {
        self.register(gvk, constructor);
        self
    }

    pub fn lookup(&self, gvk: &GroupVersionKind) -> Option<&Constructor> {
        self.constructors.get(gvk)
    }

    pub fn contains(&self, gvk: &GroupVersionKind) -> bool {
        self.constructors.contains_key(gvk)
    }

    /// Run the constructor registered for `gvk`, if any.
    pub fn build(
        &self,
        gvk: &GroupVersionKind,
        record: &ObjectRecord,
    ) -> Option<Result<Box<dyn SpecializedDir>, NodeError>> {
        self.lookup(gvk).map(|construct| construct.as_ref()(record))
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<&GroupVersionKind> {
        let mut kinds: Vec<_> = self.constructors.keys().collect();
        kinds.sort();
        kinds
    }
}

impl fmt::Debug for SpecializationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecializationRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

/// Key/value map exposed as one file per key. Values are served as-is.
#[derive(Debug, Clone, Default)]
pub struct MapDir {
    entries: BTreeMap<String, FileNode>,
}

impl MapDir {
    pub fn new(entries: BTreeMap<String, Vec<u8>>) -> Self {
        MapDir {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k, FileNode::new(v)))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn list_children(&self) -> Vec<DirEntry> {
        self.entries.keys().map(DirEntry::file).collect()
    }

    pub fn resolve(&self, key: &str) -> Result<Node, NodeError> {
        self.entries
            .get(key)
            .cloned()
            .map(Node::File)
            .ok_or_else(|| NodeError::NotFound(key.to_string()))
    }
}

/// Specialized view shared by key/value-bearing kinds: `yaml` and `json` of
/// the typed object plus a `data` directory.
#[derive(Debug, Clone)]
pub struct KeyValueDir<T> {
    type_name: &'static str,
    object: T,
    data: MapDir,
}

impl<T> KeyValueDir<T>
where
    T: Serialize + fmt::Debug + Send + Sync + 'static,
{
    pub fn new(type_name: &'static str, object: T, data: BTreeMap<String, Vec<u8>>) -> Self {
        KeyValueDir {
            type_name,
            object,
            data: MapDir::new(data),
        }
    }

    pub fn object(&self) -> &T {
        &self.object
    }
}

impl<T> SpecializedDir for KeyValueDir<T>
where
    T: Serialize + fmt::Debug + Send + Sync + 'static,
{
    fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn list_children(&self) -> Vec<DirEntry> {
        vec![
            DirEntry::file(YAML_FILE),
            DirEntry::file(JSON_FILE),
            DirEntry::dir(DATA_DIR),
        ]
    }

    fn resolve(&self, name: &str) -> Result<Node, NodeError> {
        if name == DATA_DIR {
            return Ok(Node::Map(self.data.clone()));
        }
        resolve_document(&self.object, name)
    }
}
