use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use crate::cluster::Cluster;
use crate::error::ClusterError;
use crate::types::{GroupVersionKind, GroupVersionListing, ObjectRecord, ResourceDescriptor};

#[derive(Debug, Default)]
struct MemoryState {
    listings: Vec<GroupVersionListing>,
    objects: Vec<(GroupVersionKind, ObjectRecord)>,
}

/// In-memory cluster for testing and demos.
///
/// Discovery returns the registered listings in insertion order; `list`
/// returns matching objects in insertion order. Faults and latency can be
/// injected at runtime.
#[derive(Debug, Default)]
pub struct MemoryCluster {
    state: RwLock<MemoryState>,
    fail_discovery: AtomicBool,
    fail_list: AtomicBool,
    list_delay: Mutex<Option<Duration>>,
    discovery_calls: AtomicUsize,
    list_calls: AtomicUsize,
}

impl MemoryCluster {
    /// Create an empty cluster.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group_version(
        self,
        group_version: &str,
        resources: Vec<ResourceDescriptor>,
    ) -> Self {
        self.add_group_version(GroupVersionListing::new(group_version, resources));
        self
    }

    pub fn with_object(self, gvk: GroupVersionKind, record: ObjectRecord) -> Self {
        self.add_object(gvk, record);
        self
    }

    pub fn add_group_version(&self, listing: GroupVersionListing) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.listings.push(listing);
    }

    pub fn add_object(&self, gvk: GroupVersionKind, record: ObjectRecord) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.objects.push((gvk, record));
    }

    /// Remove an object. Returns whether anything was removed.
    pub fn remove_object(&self, gvk: &GroupVersionKind, namespace: &str, name: &str) -> bool {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        let before = state.objects.len();
        state.objects.retain(|(g, r)| {
            !(g == gvk && r.namespace() == namespace && r.name() == name)
        });
        state.objects.len() != before
    }

    /// Make every discovery call fail.
    pub fn fail_discovery(&self, fail: bool) {
        self.fail_discovery.store(fail, Ordering::SeqCst);
    }

    /// Make every list call fail.
    pub fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    /// Delay every list call by `delay`.
    pub fn set_list_delay(&self, delay: Option<Duration>) {
        *self.list_delay.lock().unwrap_or_else(|e| e.into_inner()) = delay;
    }

    pub fn discovery_calls(&self) -> usize {
        self.discovery_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Cluster for MemoryCluster {
    async fn preferred_resources(&self) -> Result<Vec<GroupVersionListing>, ClusterError> {
        self.discovery_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_discovery.load(Ordering::SeqCst) {
            return Err(ClusterError::Status {
                code: 503,
                message: "discovery unavailable".to_string(),
            });
        }
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        Ok(state.listings.clone())
    }

    async fn list(
        &self,
        gvk: &GroupVersionKind,
        namespace: Option<&str>,
    ) -> Result<Vec<ObjectRecord>, ClusterError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        let delay = *self.list_delay.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_list.load(Ordering::SeqCst) {
            return Err(ClusterError::ConnectionFailed {
                endpoint: "memory".to_string(),
                source: format!("list {} refused", gvk).into(),
            });
        }

        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        Ok(state
            .objects
            .iter()
            .filter(|(g, _)| g == gvk)
            .filter(|(_, r)| namespace.map_or(true, |ns| r.namespace() == ns))
            .map(|(_, r)| r.clone().with_default_gvk(gvk))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pods() -> GroupVersionKind {
        GroupVersionKind::new("", "v1", "Pod")
    }

    fn pod(namespace: &str, name: &str) -> ObjectRecord {
        ObjectRecord::from_value(json!({
            "metadata": {"name": name, "namespace": namespace}
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_list_filters_by_namespace() {
        let cluster = MemoryCluster::new()
            .with_object(pods(), pod("default", "a"))
            .with_object(pods(), pod("kube-system", "b"));

        assert_eq!(cluster.list(&pods(), None).await.unwrap().len(), 2);
        let scoped = cluster.list(&pods(), Some("default")).await.unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].name(), "a");
        assert_eq!(scoped[0].gvk(), Some(pods()));
        assert_eq!(cluster.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_remove_object() {
        let cluster = MemoryCluster::new().with_object(pods(), pod("default", "a"));
        assert!(cluster.remove_object(&pods(), "default", "a"));
        assert!(!cluster.remove_object(&pods(), "default", "a"));
        assert!(cluster.list(&pods(), None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fault_injection() {
        let cluster = MemoryCluster::new().with_group_version("v1", vec![]);
        cluster.fail_discovery(true);
        cluster.fail_list(true);
        assert!(cluster.preferred_resources().await.is_err());
        assert!(cluster.list(&pods(), None).await.is_err());

        cluster.fail_discovery(false);
        assert_eq!(cluster.preferred_resources().await.unwrap().len(), 1);
        assert_eq!(cluster.discovery_calls(), 2);
    }
}
