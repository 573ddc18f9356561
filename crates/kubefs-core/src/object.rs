use serde::Serialize;

use crate::error::NodeError;
use crate::file::FileNode;
use crate::node::{DirEntry, Node};
use crate::types::ObjectRecord;

pub const YAML_FILE: &str = "yaml";
pub const JSON_FILE: &str = "json";

/// Serialize to YAML in serde_yaml's default form.
pub fn render_yaml<T: Serialize + ?Sized>(value: &T) -> Result<FileNode, NodeError> {
    let text = serde_yaml::to_string(value)?;
    Ok(FileNode::new(text.into_bytes()))
}

/// Serialize to JSON indented by two spaces, without a trailing newline.
pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<FileNode, NodeError> {
    let bytes = serde_json::to_vec_pretty(value)?;
    Ok(FileNode::new(bytes))
}

/// Resolve `yaml`/`json` against `value`; anything else is absent.
pub(crate) fn resolve_document<T: Serialize + ?Sized>(
    value: &T,
    name: &str,
) -> Result<Node, NodeError> {
    match name {
        YAML_FILE => render_yaml(value).map(Node::File),
        JSON_FILE => render_json(value).map(Node::File),
        _ => Err(NodeError::NotFound(name.to_string())),
    }
}

/// Generic view of an object: the full document as `yaml` and `json`.
#[derive(Debug, Clone)]
pub struct ObjectDir {
    record: ObjectRecord,
}

impl ObjectDir {
    pub fn new(record: ObjectRecord) -> Self {
        ObjectDir { record }
    }

    pub fn record(&self) -> &ObjectRecord {
        &self.record
    }

    pub fn list_children(&self) -> Vec<DirEntry> {
        vec![DirEntry::file(YAML_FILE), DirEntry::file(JSON_FILE)]
    }

    pub fn resolve(&self, name: &str) -> Result<Node, NodeError> {
        resolve_document(&self.record, name)
    }
}
