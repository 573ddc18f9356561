//! End-to-end behavior of the projected tree against an in-memory cluster.

use std::sync::Arc;
use std::time::Duration;

use kubefs_core::{
    default_registry, CallContext, CancelSource, ClusterError, GroupVersionKind, MemoryCluster,
    Node, NodeError, NodeKind, ObjectRecord, Projection, ResourceDescriptor,
};
use serde_json::{json, Value};

fn pods_gvk() -> GroupVersionKind {
    GroupVersionKind::new("", "v1", "Pod")
}

fn object(kind: &str, namespace: &str, name: &str) -> ObjectRecord {
    let mut metadata = json!({"name": name});
    if !namespace.is_empty() {
        metadata["namespace"] = json!(namespace);
    }
    ObjectRecord::from_value(json!({
        "apiVersion": "v1",
        "kind": kind,
        "metadata": metadata,
    }))
    .unwrap()
}

/// Core group with pods, nodes and configmaps; `apps` with deployments.
fn sample_cluster() -> MemoryCluster {
    MemoryCluster::new()
        .with_group_version(
            "v1",
            vec![
                ResourceDescriptor::new("pods", "Pod", true),
                ResourceDescriptor::new("pods/log", "Pod", true),
                ResourceDescriptor::new("nodes", "Node", false),
                ResourceDescriptor::new("configmaps", "ConfigMap", true),
            ],
        )
        .with_group_version(
            "apps/v1",
            vec![ResourceDescriptor::new("deployments", "Deployment", true)],
        )
        .with_object(pods_gvk(), object("Pod", "default", "nginx"))
        .with_object(pods_gvk(), object("Pod", "default", "redis"))
        .with_object(pods_gvk(), object("Pod", "kube-system", "coredns"))
        .with_object(
            GroupVersionKind::new("", "v1", "Node"),
            object("Node", "", "node-1"),
        )
        .with_object(
            GroupVersionKind::new("", "v1", "ConfigMap"),
            ObjectRecord::from_value(json!({
                "apiVersion": "v1",
                "kind": "ConfigMap",
                "metadata": {"name": "settings", "namespace": "default"},
                "data": {"mode": "fast"}
            }))
            .unwrap(),
        )
}

fn projection(cluster: Arc<MemoryCluster>) -> Projection {
    Projection::new(cluster, Arc::new(default_registry())).with_views(false)
}

async fn children(node: &Node) -> Vec<String> {
    let cx = CallContext::background();
    let mut names: Vec<String> = node
        .list_children(&cx)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    names.sort();
    names
}

async fn lookup(projection: &Projection, path: &[&str]) -> Result<Node, NodeError> {
    projection.lookup(path, &CallContext::background()).await
}

fn read_all(node: &Node) -> Vec<u8> {
    node.read_content(0, node.stat().size).unwrap().to_vec()
}

#[tokio::test]
async fn test_group_labels_are_deduplicated() {
    let cluster = MemoryCluster::new()
        .with_group_version("apps/v1", vec![ResourceDescriptor::new("deployments", "Deployment", true)])
        .with_group_version("batch/v1", vec![ResourceDescriptor::new("jobs", "Job", true)])
        .with_group_version("/v1", vec![ResourceDescriptor::new("pods", "Pod", true)])
        .with_group_version("apps/v1beta1", vec![ResourceDescriptor::new("deployments", "Deployment", true)]);
    let projection = projection(Arc::new(cluster));

    let names = children(&projection.root()).await;
    assert_eq!(names, vec!["apps", "batch", "v1"]);
}

#[tokio::test]
async fn test_core_group_resolves_straight_to_resources() {
    let projection = projection(Arc::new(sample_cluster()));

    let node = lookup(&projection, &["v1"]).await.unwrap();
    assert!(matches!(node, Node::Resources(_)), "got {}", node.type_name());
    // Subresources never show up as kinds
    assert_eq!(children(&node).await, vec!["configmaps", "nodes", "pods"]);
}

#[tokio::test]
async fn test_colliding_labels_go_through_versions_dir() {
    let cluster = MemoryCluster::new()
        .with_group_version("v1", vec![ResourceDescriptor::new("pods", "Pod", true)])
        .with_group_version("v1/alpha", vec![ResourceDescriptor::new("gadgets", "Gadget", false)])
        .with_group_version(
            "example.com/v1",
            vec![ResourceDescriptor::new("widgets/status", "Widget", true)],
        )
        .with_group_version(
            "example.com/v2",
            vec![ResourceDescriptor::new("widgets", "Widget", true)],
        );
    let projection = projection(Arc::new(cluster));

    let node = lookup(&projection, &["v1"]).await.unwrap();
    assert!(matches!(node, Node::GroupVersions(_)));
    assert_eq!(children(&node).await, vec!["alpha", "v1"]);

    let core = lookup(&projection, &["v1", "v1"]).await.unwrap();
    assert_eq!(children(&core).await, vec!["pods"]);

    // A version with only subresources is dropped
    let node = lookup(&projection, &["example.com"]).await.unwrap();
    assert!(matches!(node, Node::GroupVersions(_)));
    assert_eq!(children(&node).await, vec!["v2"]);
    assert!(lookup(&projection, &["example.com", "v1"])
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn test_namespaces_are_extracted_and_deduplicated() {
    let projection = projection(Arc::new(sample_cluster()));

    let node = lookup(&projection, &["v1", "pods"]).await.unwrap();
    assert!(matches!(node, Node::ResourceNamespaces(_)));
    assert_eq!(children(&node).await, vec!["default", "kube-system"]);

    let default = lookup(&projection, &["v1", "pods", "default"]).await.unwrap();
    assert_eq!(children(&default).await, vec!["nginx", "redis"]);

    let missing = lookup(&projection, &["v1", "pods", "staging"]).await;
    assert!(missing.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_cluster_scoped_kind_lists_objects_directly() {
    let projection = projection(Arc::new(sample_cluster()));

    let node = lookup(&projection, &["v1", "nodes"]).await.unwrap();
    assert!(matches!(node, Node::Resource(_)));
    assert_eq!(children(&node).await, vec!["node-1"]);
}

#[tokio::test]
async fn test_specialization_dispatch() {
    let projection = projection(Arc::new(sample_cluster()));

    let configmap = lookup(&projection, &["v1", "configmaps", "default", "settings"])
        .await
        .unwrap();
    assert_eq!(children(&configmap).await, vec!["data", "json", "yaml"]);
    let value = lookup(
        &projection,
        &["v1", "configmaps", "default", "settings", "data", "mode"],
    )
    .await
    .unwrap();
    assert_eq!(read_all(&value), b"fast");

    let pod = lookup(&projection, &["v1", "pods", "default", "nginx"]).await.unwrap();
    assert!(matches!(pod, Node::Object(_)));
    assert_eq!(children(&pod).await, vec!["json", "yaml"]);
}

#[tokio::test]
async fn test_end_to_end_yaml_path() {
    let cluster = MemoryCluster::new()
        .with_group_version("v1", vec![ResourceDescriptor::new("pods", "Pod", true)])
        .with_object(pods_gvk(), object("Pod", "default", "nginx"));
    let projection = Projection::new(Arc::new(cluster), Arc::new(default_registry()));

    let cx = CallContext::background();
    let node = projection
        .lookup_path("/by-gvk/v1/pods/default/nginx/yaml", &cx)
        .await
        .unwrap();
    assert_eq!(node.stat().kind, NodeKind::File);

    let document: Value = serde_yaml::from_slice(&read_all(&node)).unwrap();
    let record = ObjectRecord::from_value(document).unwrap();
    assert_eq!(record.name(), "nginx");
    assert_eq!(record.namespace(), "default");
}

#[tokio::test]
async fn test_yaml_and_json_round_trip() {
    let cluster = Arc::new(sample_cluster());
    let projection = projection(cluster.clone());
    let records = [
        ("pods", "default", "nginx"),
        ("pods", "kube-system", "coredns"),
        ("configmaps", "default", "settings"),
    ];

    for (kind, namespace, name) in records {
        let dir = lookup(&projection, &["v1", kind, namespace, name]).await.unwrap();
        let cx = CallContext::background();
        let yaml = dir.resolve("yaml", &cx).await.unwrap();
        let json = dir.resolve("json", &cx).await.unwrap();

        let from_yaml: ObjectRecord = serde_yaml::from_slice(&read_all(&yaml)).unwrap();
        let from_json: ObjectRecord = serde_json::from_slice(&read_all(&json)).unwrap();
        assert_eq!(from_yaml, from_json, "{}/{}/{}", kind, namespace, name);
        assert_eq!(from_yaml.name(), name);
    }
}

#[tokio::test]
async fn test_file_range_reads_are_clamped() {
    let projection = projection(Arc::new(sample_cluster()));
    let file = lookup(&projection, &["v1", "pods", "default", "nginx", "json"])
        .await
        .unwrap();
    let n = file.stat().size;

    assert!(file.read_content(n, 0).unwrap().is_empty());
    assert!(file.read_content(n, 4096).unwrap().is_empty());
    assert!(matches!(
        file.read_content(n + 1, 1),
        Err(NodeError::Range { .. })
    ));
    assert_eq!(file.read_content(0, n + 100).unwrap().len() as u64, n);
}

#[tokio::test]
async fn test_unknown_group_is_not_found() {
    let cluster = Arc::new(sample_cluster());
    let projection = projection(cluster.clone());

    let err = lookup(&projection, &["storage.k8s.io"]).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(cluster.list_calls(), 0);

    let err = lookup(&projection, &["v1", "secrets"]).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_remote_failure_is_not_not_found() {
    let cluster = Arc::new(sample_cluster());
    let projection = projection(cluster.clone());

    cluster.fail_list(true);
    let err = lookup(&projection, &["v1", "pods"]).await.unwrap_err();
    assert!(err.is_remote(), "expected remote failure, got {:?}", err);

    cluster.fail_list(false);
    cluster.fail_discovery(true);
    let cx = CallContext::background();
    let err = projection.root().list_children(&cx).await.unwrap_err();
    assert!(matches!(
        err,
        NodeError::Remote(ClusterError::Status { code: 503, .. })
    ));
    let err = lookup(&projection, &["v1"]).await.unwrap_err();
    assert!(err.is_remote());
}

#[tokio::test]
async fn test_empty_listing_is_empty_dir() {
    let projection = projection(Arc::new(sample_cluster()));
    let node = lookup(&projection, &["apps", "deployments"]).await.unwrap();
    assert!(children(&node).await.is_empty());
}

#[tokio::test]
async fn test_list_then_delete_resolves_not_found() {
    let cluster = Arc::new(sample_cluster());
    let projection = projection(cluster.clone());

    let dir = lookup(&projection, &["v1", "pods", "default"]).await.unwrap();
    assert!(children(&dir).await.contains(&"redis".to_string()));

    assert!(cluster.remove_object(&pods_gvk(), "default", "redis"));

    let err = lookup(&projection, &["v1", "pods", "default", "redis"])
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_every_resolve_refetches() {
    let cluster = Arc::new(sample_cluster());
    let projection = projection(cluster.clone());

    lookup(&projection, &["v1", "pods", "default", "nginx"]).await.unwrap();
    lookup(&projection, &["v1", "pods", "default", "nginx"]).await.unwrap();
    assert_eq!(cluster.discovery_calls(), 2);
    assert_eq!(cluster.list_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_aborts_inflight_list() {
    let cluster = Arc::new(sample_cluster());
    cluster.set_list_delay(Some(Duration::from_secs(10)));
    let projection = projection(cluster.clone());

    let source = CancelSource::new();
    let cx = CallContext::with_cancel(source.token());
    let canceller = source.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        canceller.cancel();
    });

    let result = projection.lookup(&["v1", "pods"][..], &cx).await;
    assert!(matches!(result, Err(NodeError::Cancelled)));
}

#[tokio::test(start_paused = true)]
async fn test_deadline_surfaces_as_remote_timeout() {
    let cluster = Arc::new(sample_cluster());
    cluster.set_list_delay(Some(Duration::from_secs(10)));
    let projection = projection(cluster.clone());

    let cx = CallContext::background().with_timeout(Duration::from_secs(1));
    let result = projection.lookup(&["v1", "pods"][..], &cx).await;
    assert!(matches!(
        result,
        Err(NodeError::Remote(ClusterError::Timeout { .. }))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_traversals_share_one_projection() {
    let cluster = Arc::new(sample_cluster());
    // slow listings keep the walks in flight together
    cluster.set_list_delay(Some(Duration::from_millis(20)));
    let projection = projection(cluster.clone());

    let targets: Vec<(Vec<&'static str>, &'static str, &'static str)> = vec![
        (vec!["v1", "pods", "default", "nginx", "yaml"], "default", "nginx"),
        (vec!["v1", "pods", "default", "redis", "json"], "default", "redis"),
        (vec!["v1", "pods", "kube-system", "coredns", "yaml"], "kube-system", "coredns"),
        (vec!["v1", "nodes", "node-1", "json"], "", "node-1"),
        (vec!["v1", "pods", "default", "nginx", "json"], "default", "nginx"),
    ];

    let tasks: Vec<_> = targets
        .iter()
        .cloned()
        .map(|(path, _, _)| {
            let projection = projection.clone();
            tokio::spawn(async move {
                let node = lookup(&projection, &path).await?;
                Ok::<_, NodeError>((path, read_all(&node)))
            })
        })
        .collect();

    let settings = lookup(
        &projection,
        &["v1", "configmaps", "default", "settings", "data", "mode"],
    )
    .await
    .unwrap();
    assert_eq!(read_all(&settings), b"fast");

    for (task, (_, namespace, name)) in tasks.into_iter().zip(&targets) {
        let (path, bytes) = task.await.unwrap().unwrap();
        let record: ObjectRecord = if path.last() == Some(&"json") {
            serde_json::from_slice(&bytes).unwrap()
        } else {
            serde_yaml::from_slice(&bytes).unwrap()
        };
        assert_eq!(record.name(), *name, "{}", path.join("/"));
        assert_eq!(record.namespace(), *namespace, "{}", path.join("/"));
    }

    // each walk resolved on its own, nothing was shared between them
    assert!(cluster.list_calls() >= targets.len());
}
