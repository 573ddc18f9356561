use std::sync::Arc;

use tracing::debug;

use crate::cancel::CallContext;
use crate::cluster::SharedCluster;
use crate::discovery::GroupsDir;
use crate::error::NodeError;
use crate::node::{DirEntry, Env, Node};
use crate::registry::SpecializationRegistry;
use crate::walk::{split_path, walk};

/// The only projection strategy: discovery group, version, kind.
pub const BY_GVK_VIEW: &str = "by-gvk";

/// Top-level choice of projection.
#[derive(Debug, Clone)]
pub struct ViewsDir {
    env: Env,
}

impl ViewsDir {
    pub fn new(env: Env) -> Self {
        ViewsDir { env }
    }

    pub fn list_children(&self) -> Vec<DirEntry> {
        vec![DirEntry::dir(BY_GVK_VIEW)]
    }

    pub fn resolve(&self, name: &str) -> Result<Node, NodeError> {
        match name {
            BY_GVK_VIEW => Ok(Node::Groups(GroupsDir::new(self.env.clone()))),
            _ => Err(NodeError::NotFound(name.to_string())),
        }
    }
}

/// Entry point of the tree.
///
/// Owns the cluster handle and the specialization registry for the life of
/// the mount. Every call to [`root`](Self::root) builds a fresh root node.
#[derive(Debug, Clone)]
pub struct Projection {
    env: Env,
    views: bool,
}

impl Projection {
    pub fn new(cluster: SharedCluster, registry: Arc<SpecializationRegistry>) -> Self {
        Projection {
            env: Env::new(cluster, registry),
            views: true,
        }
    }

    /// Whether the root lists views (`by-gvk/`) or groups directly.
    pub fn with_views(mut self, views: bool) -> Self {
        self.views = views;
        self
    }

    pub fn views_enabled(&self) -> bool {
        self.views
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn root(&self) -> Node {
        if self.views {
            Node::Views(ViewsDir::new(self.env.clone()))
        } else {
            Node::Groups(GroupsDir::new(self.env.clone()))
        }
    }

    /// Resolve a sequence of names from a fresh root.
    pub async fn lookup<S: AsRef<str>>(
        &self,
        segments: &[S],
        cx: &CallContext,
    ) -> Result<Node, NodeError> {
        walk(self.root(), segments, cx).await
    }

    /// Resolve a slash-separated path from a fresh root.
    pub async fn lookup_path(&self, path: &str, cx: &CallContext) -> Result<Node, NodeError> {
        let segments = split_path(path)?;
        debug!(path, depth = segments.len(), "walking path");
        self.lookup(segments.as_slice(), cx).await
    }
}
