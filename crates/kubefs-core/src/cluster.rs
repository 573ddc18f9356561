use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ClusterError;
use crate::types::{GroupVersionKind, GroupVersionListing, ObjectRecord};

/// Read-only access to a cluster's discovery catalog and objects.
///
/// One handle is created at mount time and shared by every traversal, so
/// implementations must be safe for concurrent use. Retries, auth and
/// connection pooling are the implementation's business; the projection
/// engine calls each method at most once per operation and surfaces any
/// failure unchanged.
#[async_trait]
pub trait Cluster: Send + Sync + 'static {
    /// The server's preferred resources, one listing per group/version.
    async fn preferred_resources(&self) -> Result<Vec<GroupVersionListing>, ClusterError>;

    /// List every object of `gvk`, optionally restricted to one namespace.
    ///
    /// Items are returned in server order and carry `apiVersion`/`kind`.
    async fn list(
        &self,
        gvk: &GroupVersionKind,
        namespace: Option<&str>,
    ) -> Result<Vec<ObjectRecord>, ClusterError>;
}

/// Shared, thread-safe cluster handle.
pub type SharedCluster = Arc<dyn Cluster>;
