//! Cluster connection shared by the inspection commands.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use kubefs_config::KubeFsConfig;
use kubefs_core::{
    default_registry, CallContext, DirEntry, Node, NodeError, Projection, SharedCluster,
};
use kubefs_kube::{kubeconfig, KubeClient};
use tracing::debug;

/// A projection plus the per-operation deadline.
pub struct Session {
    projection: Projection,
    request_timeout: Duration,
}

impl Session {
    pub fn new(projection: Projection, request_timeout: Duration) -> Self {
        Session {
            projection,
            request_timeout,
        }
    }

    /// Connect to the cluster named by the config's kubeconfig and context.
    pub fn connect(config: &KubeFsConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let projection = projection(config)?;
        Ok(Session::new(projection, config.request_timeout()))
    }

    fn context(&self) -> CallContext {
        CallContext::background().with_timeout(self.request_timeout)
    }

    /// Walk `path` from a fresh root.
    pub async fn lookup(&self, path: &str) -> Result<Node, NodeError> {
        debug!(path, "lookup");
        self.projection.lookup_path(path, &self.context()).await
    }

    pub async fn children(&self, node: &Node) -> Result<Vec<DirEntry>, NodeError> {
        node.list_children(&self.context()).await
    }

    pub async fn child(&self, node: &Node, name: &str) -> Result<Node, NodeError> {
        node.resolve(name, &self.context()).await
    }
}

/// Build the projection a mount or an inspection command serves.
pub fn projection(config: &KubeFsConfig) -> Result<Projection, Box<dyn std::error::Error>> {
    config.validate_or_err()?;

    let kubeconfig_path: Option<PathBuf> = config
        .kubeconfig
        .as_deref()
        .map(kubeconfig::expand_home);
    let client = KubeClient::from_kubeconfig(
        kubeconfig_path.as_deref(),
        config.context.as_deref(),
        Some(config.request_timeout()),
    )?;
    debug!(server = client.server(), "connected");

    let cluster: SharedCluster = Arc::new(client);
    Ok(Projection::new(cluster, Arc::new(default_registry())).with_views(config.views_enabled()))
}

/// Join a child name onto a projection path.
pub fn child_path(path: &str, name: &str) -> String {
    let parent = path.trim_end_matches('/');
    format!("{}/{}", parent, name)
}

