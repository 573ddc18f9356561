use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::try_join_all;
use reqwest::{Certificate, Client, Identity, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use kubefs_core::{Cluster, ClusterError, GroupVersionKind, GroupVersionListing, ObjectRecord};

use crate::discovery::{
    preferred_listings, ApiGroupList, ApiResource, ApiResourceList, ApiVersions, GroupResources,
};
use crate::kubeconfig::{self, ClusterConfig, Credentials};

/// Page size for list calls.
const LIST_LIMIT: &str = "500";

#[derive(Debug, Deserialize)]
struct ObjectList {
    #[serde(default)]
    items: Vec<Value>,
    #[serde(default)]
    metadata: ListMeta,
}

#[derive(Debug, Default, Deserialize)]
struct ListMeta {
    #[serde(default, rename = "continue")]
    continue_token: Option<String>,
}

/// `Status` body returned with API errors.
#[derive(Debug, Deserialize)]
struct StatusBody {
    #[serde(default)]
    message: String,
}

/// Cluster backed by a live Kubernetes API server.
pub struct KubeClient {
    http: Client,
    server: String,
    credentials: Credentials,
}

impl KubeClient {
    /// Build a client for `config`. `timeout` bounds each HTTP request.
    pub fn new(config: ClusterConfig, timeout: Option<Duration>) -> Result<Self, ClusterError> {
        let mut builder = Client::builder();

        if let Some(pem) = &config.root_certificate {
            for cert in Certificate::from_pem_bundle(pem)
                .map_err(|e| ClusterError::Auth(format!("invalid certificate authority: {}", e)))?
            {
                builder = builder.add_root_certificate(cert);
            }
        }
        if config.insecure {
            warn!(server = %config.server, "TLS verification disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }
        if let Credentials::ClientCertificate { certificate, key } = &config.credentials {
            let identity = Identity::from_pkcs8_pem(certificate, key)
                .map_err(|e| ClusterError::Auth(format!("invalid client certificate: {}", e)))?;
            builder = builder.identity(identity);
        }
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder
            .build()
            .map_err(|e| ClusterError::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(KubeClient {
            http,
            server: config.server,
            credentials: config.credentials,
        })
    }

    /// Load a kubeconfig (default location when `path` is `None`) and connect
    /// to the selected context.
    pub fn from_kubeconfig(
        path: Option<&Path>,
        context: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<Self, ClusterError> {
        let config = kubeconfig::load(path, context)?;
        debug!(server = %config.server, "loaded kubeconfig");
        Self::new(config, timeout)
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    fn request(&self, path: &str) -> RequestBuilder {
        let req = self.http.get(format!("{}{}", self.server, path));
        match &self.credentials {
            Credentials::Bearer(token) => req.bearer_auth(token),
            Credentials::Basic { username, password } => req.basic_auth(username, Some(password)),
            Credentials::Anonymous | Credentials::ClientCertificate { .. } => req,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ClusterError> {
        debug!(path, "GET");
        let response = self
            .request(path)
            .query(query)
            .send()
            .await
            .map_err(|e| self.transport_error(path, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        response
            .json()
            .await
            .map_err(|e| ClusterError::Decode(format!("{}: {}", path, e)))
    }

    fn transport_error(&self, path: &str, err: reqwest::Error) -> ClusterError {
        if err.is_timeout() {
            ClusterError::Timeout {
                operation: format!("GET {}", path),
            }
        } else {
            ClusterError::ConnectionFailed {
                endpoint: self.server.clone(),
                source: Box::new(err),
            }
        }
    }

    async fn resource_list(&self, group_version: &str) -> Result<ApiResourceList, ClusterError> {
        self.get_json(&group_version_path(group_version), &[]).await
    }

    async fn group_resources(
        &self,
        group: String,
        group_versions: Vec<String>,
    ) -> Result<GroupResources, ClusterError> {
        let lists = try_join_all(group_versions.iter().map(|gv| self.resource_list(gv))).await?;
        Ok(GroupResources { group, lists })
    }

    /// Find the collection serving `gvk`.
    async fn find_resource(&self, gvk: &GroupVersionKind) -> Result<ApiResource, ClusterError> {
        let list = self.resource_list(&gvk.api_version()).await?;
        list.resources
            .into_iter()
            .find(|r| r.kind == gvk.kind && !r.is_subresource())
            .ok_or_else(|| ClusterError::Status {
                code: StatusCode::NOT_FOUND.as_u16(),
                message: format!("no resource serves {}", gvk),
            })
    }
}

#[async_trait]
impl Cluster for KubeClient {
    async fn preferred_resources(&self) -> Result<Vec<GroupVersionListing>, ClusterError> {
        let core: ApiVersions = self.get_json("/api", &[]).await?;
        let groups: ApiGroupList = self.get_json("/apis", &[]).await?;

        let mut wanted = Vec::with_capacity(groups.groups.len() + 1);
        wanted.push((String::new(), core.versions));
        for group in &groups.groups {
            wanted.push((group.name.clone(), group.group_versions()));
        }

        let resources =
            try_join_all(wanted.into_iter().map(|(group, gvs)| self.group_resources(group, gvs)))
                .await?;
        let listings = preferred_listings(resources);
        debug!(group_versions = listings.len(), "discovery complete");
        Ok(listings)
    }

    async fn list(
        &self,
        gvk: &GroupVersionKind,
        namespace: Option<&str>,
    ) -> Result<Vec<ObjectRecord>, ClusterError> {
        let resource = self.find_resource(gvk).await?;
        let path = collection_path(gvk, &resource, namespace);

        let mut records = Vec::new();
        let mut continue_token: Option<String> = None;
        loop {
            let mut query = vec![("limit", LIST_LIMIT)];
            if let Some(token) = continue_token.as_deref() {
                query.push(("continue", token));
            }
            let page: ObjectList = self.get_json(&path, &query).await?;

            for item in page.items {
                match ObjectRecord::from_value(item) {
                    Ok(record) => records.push(record.with_default_gvk(gvk)),
                    Err(e) => warn!(%gvk, error = %e, "skipping list item"),
                }
            }

            match page.metadata.continue_token.filter(|t| !t.is_empty()) {
                Some(token) => continue_token = Some(token),
                None => break,
            }
        }

        debug!(%gvk, items = records.len(), "list complete");
        Ok(records)
    }
}

/// `/api/v1` for the core group, `/apis/<group>/<version>` otherwise.
pub fn group_version_path(group_version: &str) -> String {
    if group_version.contains('/') {
        format!("/apis/{}", group_version)
    } else {
        format!("/api/{}", group_version)
    }
}

/// Collection URL path; scoped to `namespace` when the resource is namespaced.
pub fn collection_path(
    gvk: &GroupVersionKind,
    resource: &ApiResource,
    namespace: Option<&str>,
) -> String {
    let base = group_version_path(&gvk.api_version());
    match namespace.filter(|ns| resource.namespaced && !ns.is_empty()) {
        Some(ns) => format!("{}/namespaces/{}/{}", base, ns, resource.name),
        None => format!("{}/{}", base, resource.name),
    }
}

/// Map a failed response to an error, preferring the API `Status` message.
pub fn status_error(status: StatusCode, body: &str) -> ClusterError {
    let message = serde_json::from_str::<StatusBody>(body)
        .ok()
        .map(|s| s.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ClusterError::Auth(message),
        _ => ClusterError::Status {
            code: status.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(name: &str, namespaced: bool) -> ApiResource {
        ApiResource {
            name: name.to_string(),
            kind: "Thing".to_string(),
            namespaced,
        }
    }

    #[test]
    fn test_group_version_path() {
        assert_eq!(group_version_path("v1"), "/api/v1");
        assert_eq!(group_version_path("apps/v1"), "/apis/apps/v1");
    }

    #[test]
    fn test_collection_path() {
        let pods = GroupVersionKind::new("", "v1", "Pod");
        assert_eq!(
            collection_path(&pods, &resource("pods", true), Some("default")),
            "/api/v1/namespaces/default/pods"
        );
        assert_eq!(
            collection_path(&pods, &resource("pods", true), None),
            "/api/v1/pods"
        );

        let nodes = GroupVersionKind::new("", "v1", "Node");
        assert_eq!(
            collection_path(&nodes, &resource("nodes", false), Some("default")),
            "/api/v1/nodes"
        );

        let deploys = GroupVersionKind::new("apps", "v1", "Deployment");
        assert_eq!(
            collection_path(&deploys, &resource("deployments", true), Some("web")),
            "/apis/apps/v1/namespaces/web/deployments"
        );
    }

    #[test]
    fn test_status_error_uses_message() {
        let body = r#"{"kind":"Status","status":"Failure","message":"pods is forbidden","code":403}"#;
        match status_error(StatusCode::FORBIDDEN, body) {
            ClusterError::Auth(msg) => assert_eq!(msg, "pods is forbidden"),
            other => panic!("expected auth error, got {:?}", other),
        }

        let err = status_error(StatusCode::SERVICE_UNAVAILABLE, "upstream down\n");
        assert!(err.is_transient());
        assert!(matches!(err, ClusterError::Status { code: 503, ref message } if message == "upstream down"));
    }

    #[test]
    fn test_object_list_continue() {
        let page: ObjectList = serde_json::from_str(
            r#"{"items": [{"metadata": {"name": "a"}}], "metadata": {"continue": "tok"}}"#,
        )
        .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.metadata.continue_token.as_deref(), Some("tok"));

        let last: ObjectList = serde_json::from_str(r#"{"items": [], "metadata": {}}"#).unwrap();
        assert!(last.metadata.continue_token.is_none());
    }
}
