//! The virtual node contract.
//!
//! Every node answers the same four operations: `stat`, `list_children`,
//! `resolve` and `read_content`. Directories implement the first three, files
//! implement `stat` and `read_content`; calling the wrong one yields
//! `NotADirectory`/`IsADirectory`.
//!
//! Nodes are built fresh by `resolve` and hold only what that resolution
//! produced. Two calls never share a node, and a node is never reused across
//! operations.

use std::fmt;
use std::sync::Arc;

use crate::cancel::CallContext;
use crate::cluster::SharedCluster;
use crate::discovery::{GroupVersionsDir, GroupsDir, ResourcesDir};
use crate::error::NodeError;
use crate::file::FileNode;
use crate::listing::{ResourceDir, ResourceNamespacesDir};
use crate::object::ObjectDir;
use crate::registry::{MapDir, SpecializationRegistry, SpecializedDir};
use crate::root::ViewsDir;

/// File or directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Directory,
}

/// Result of `stat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attr {
    pub kind: NodeKind,
    /// Byte length for files, zero for directories.
    pub size: u64,
}

impl Attr {
    pub fn directory() -> Self {
        Attr {
            kind: NodeKind::Directory,
            size: 0,
        }
    }

    pub fn file(size: u64) -> Self {
        Attr {
            kind: NodeKind::File,
            size,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }
}

/// A name/kind pair returned by `list_children`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: NodeKind,
}

impl DirEntry {
    pub fn dir(name: impl Into<String>) -> Self {
        DirEntry {
            name: name.into(),
            kind: NodeKind::Directory,
        }
    }

    pub fn file(name: impl Into<String>) -> Self {
        DirEntry {
            name: name.into(),
            kind: NodeKind::File,
        }
    }

    /// Directory entries for each name, in order.
    pub fn dirs<I, S>(names: I) -> Vec<DirEntry>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().map(DirEntry::dir).collect()
    }
}

/// Handles every node needs to build its children: the cluster and the
/// specialization registry. Both are read-only and shared for the life of the
/// mount.
#[derive(Clone)]
pub struct Env {
    pub(crate) cluster: SharedCluster,
    pub(crate) registry: Arc<SpecializationRegistry>,
}

impl Env {
    pub fn new(cluster: SharedCluster, registry: Arc<SpecializationRegistry>) -> Self {
        Env { cluster, registry }
    }

    pub fn registry(&self) -> &SpecializationRegistry {
        &self.registry
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Env")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

/// Closed set of node types in the projected tree.
#[derive(Debug)]
pub enum Node {
    /// Top-level choice of projection (`by-gvk`).
    Views(ViewsDir),
    /// One entry per API group label.
    Groups(GroupsDir),
    /// Several group/versions share a label; one entry per version.
    GroupVersions(GroupVersionsDir),
    /// Resource kinds of a single group/version.
    Resources(ResourcesDir),
    /// Namespaces present in a namespaced listing.
    ResourceNamespaces(ResourceNamespacesDir),
    /// Objects of one kind, optionally filtered to a namespace.
    Resource(ResourceDir),
    /// Generic object view (`yaml`, `json`).
    Object(ObjectDir),
    /// Kind-specific object view produced by a registered constructor.
    Specialized(Box<dyn SpecializedDir>),
    /// Key/value map exposed as one file per key.
    Map(MapDir),
    File(FileNode),
}

impl Node {
    /// Short name used in logs.
    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Views(_) => "views dir",
            Node::Groups(_) => "groups dir",
            Node::GroupVersions(_) => "group versions dir",
            Node::Resources(_) => "resources dir",
            Node::ResourceNamespaces(_) => "resource namespaces dir",
            Node::Resource(_) => "resource dir",
            Node::Object(_) => "object dir",
            Node::Specialized(d) => d.type_name(),
            Node::Map(_) => "map dir",
            Node::File(_) => "file",
        }
    }

    pub fn is_dir(&self) -> bool {
        !matches!(self, Node::File(_))
    }

    pub fn stat(&self) -> Attr {
        match self {
            Node::File(f) => Attr::file(f.size()),
            _ => Attr::directory(),
        }
    }

    /// List this directory. Performs its own remote fetch where one is needed.
    pub async fn list_children(&self, cx: &CallContext) -> Result<Vec<DirEntry>, NodeError> {
        cx.check()?;
        match self {
            Node::Views(d) => Ok(d.list_children()),
            Node::Groups(d) => d.list_children(cx).await,
            Node::GroupVersions(d) => Ok(d.list_children()),
            Node::Resources(d) => Ok(d.list_children()),
            Node::ResourceNamespaces(d) => Ok(d.list_children()),
            Node::Resource(d) => Ok(d.list_children()),
            Node::Object(d) => Ok(d.list_children()),
            Node::Specialized(d) => Ok(d.list_children()),
            Node::Map(d) => Ok(d.list_children()),
            Node::File(_) => Err(NodeError::NotADirectory(self.type_name().to_string())),
        }
    }

    /// Resolve one child by name. Performs its own remote fetch where one is
    /// needed, independent of any earlier `list_children`.
    pub async fn resolve(&self, name: &str, cx: &CallContext) -> Result<Node, NodeError> {
        cx.check()?;
        match self {
            Node::Views(d) => d.resolve(name),
            Node::Groups(d) => d.resolve(name, cx).await,
            Node::GroupVersions(d) => d.resolve(name),
            Node::Resources(d) => d.resolve(name, cx).await,
            Node::ResourceNamespaces(d) => d.resolve(name),
            Node::Resource(d) => d.resolve(name),
            Node::Object(d) => d.resolve(name),
            Node::Specialized(d) => d.resolve(name),
            Node::Map(d) => d.resolve(name),
            Node::File(_) => Err(NodeError::NotADirectory(name.to_string())),
        }
    }

    /// Read up to `size` bytes at `offset`; files only.
    pub fn read_content(&self, offset: u64, size: u64) -> Result<&[u8], NodeError> {
        match self {
            Node::File(f) => f.read_content(offset, size),
            _ => Err(NodeError::IsADirectory(self.type_name().to_string())),
        }
    }

    /// The file node, if this is one.
    pub fn as_file(&self) -> Option<&FileNode> {
        match self {
            Node::File(f) => Some(f),
            _ => None,
        }
    }

    pub fn into_file(self) -> Result<FileNode, NodeError> {
        match self {
            Node::File(f) => Ok(f),
            other => Err(NodeError::IsADirectory(other.type_name().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_constructors() {
        assert!(Attr::directory().is_dir());
        assert_eq!(Attr::file(12).size, 12);
        assert!(!Attr::file(12).is_dir());
    }

    #[test]
    fn test_dir_entries() {
        let entries = DirEntry::dirs(["a", "b"]);
        assert_eq!(entries, vec![DirEntry::dir("a"), DirEntry::dir("b")]);
        assert_eq!(DirEntry::file("yaml").kind, NodeKind::File);
    }

    #[tokio::test]
    async fn test_file_node_contract() {
        let node = Node::File(FileNode::new(b"hello".to_vec()));
        assert_eq!(node.stat(), Attr::file(5));
        assert!(!node.is_dir());
        assert_eq!(node.read_content(1, 3).unwrap(), b"ell");

        let cx = CallContext::background();
        assert!(matches!(
            node.list_children(&cx).await,
            Err(NodeError::NotADirectory(_))
        ));
        assert!(matches!(
            node.resolve("x", &cx).await,
            Err(NodeError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_directory_rejects_read() {
        let node = Node::Map(MapDir::new(Default::default()));
        assert!(matches!(
            node.read_content(0, 1),
            Err(NodeError::IsADirectory(_))
        ));
        assert!(node.into_file().is_err());
    }
}
