//! Kubeconfig loading.
//!
//! Only the parts kubefs needs are modelled: clusters, users, contexts and
//! `current-context`. Relative file references are resolved against the
//! directory of the kubeconfig they appear in.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;

use crate::error::KubeconfigError;

/// Parsed kubeconfig file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Kubeconfig {
    #[serde(default)]
    pub clusters: Vec<NamedCluster>,
    #[serde(default)]
    pub users: Vec<NamedUser>,
    #[serde(default)]
    pub contexts: Vec<NamedContext>,
    #[serde(default)]
    pub current_context: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedCluster {
    pub name: String,
    pub cluster: ClusterEntry,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClusterEntry {
    pub server: String,
    #[serde(default)]
    pub certificate_authority: Option<String>,
    #[serde(default)]
    pub certificate_authority_data: Option<String>,
    #[serde(default)]
    pub insecure_skip_tls_verify: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedUser {
    pub name: String,
    #[serde(default)]
    pub user: UserEntry,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UserEntry {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default, rename = "tokenFile")]
    pub token_file: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub client_certificate: Option<String>,
    #[serde(default)]
    pub client_certificate_data: Option<String>,
    #[serde(default)]
    pub client_key: Option<String>,
    #[serde(default)]
    pub client_key_data: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedContext {
    pub name: String,
    pub context: ContextEntry,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContextEntry {
    pub cluster: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
}

/// How requests authenticate.
#[derive(Clone, Default)]
pub enum Credentials {
    #[default]
    Anonymous,
    Bearer(String),
    Basic { username: String, password: String },
    /// PEM certificate chain and PKCS#8 PEM key.
    ClientCertificate { certificate: Vec<u8>, key: Vec<u8> },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Anonymous => write!(f, "Anonymous"),
            Credentials::Bearer(_) => write!(f, "Bearer([REDACTED])"),
            Credentials::Basic { username, .. } => {
                write!(f, "Basic {{ username: {:?}, password: [REDACTED] }}", username)
            }
            Credentials::ClientCertificate { .. } => write!(f, "ClientCertificate([REDACTED])"),
        }
    }
}

/// Everything needed to reach one API server.
#[derive(Debug, Clone)]
pub struct ClusterConfig {
    pub server: String,
    /// PEM bundle to trust in addition to the system roots.
    pub root_certificate: Option<Vec<u8>>,
    pub insecure: bool,
    pub credentials: Credentials,
    pub namespace: Option<String>,
}

impl Kubeconfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, KubeconfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn read(path: &Path) -> Result<Self, KubeconfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| KubeconfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    /// Resolve `context` (or `current-context`) into a cluster config.
    ///
    /// `base_dir` anchors relative `certificate-authority`, `tokenFile`,
    /// `client-certificate` and `client-key` paths.
    pub fn resolve(
        &self,
        context: Option<&str>,
        base_dir: &Path,
    ) -> Result<ClusterConfig, KubeconfigError> {
        let context_name = context
            .or(self.current_context.as_deref())
            .filter(|c| !c.is_empty())
            .ok_or(KubeconfigError::NoContext)?;

        let context = self
            .contexts
            .iter()
            .find(|c| c.name == context_name)
            .map(|c| &c.context)
            .ok_or_else(|| KubeconfigError::UnknownContext(context_name.to_string()))?;

        let cluster = self
            .clusters
            .iter()
            .find(|c| c.name == context.cluster)
            .map(|c| &c.cluster)
            .ok_or_else(|| KubeconfigError::UnknownCluster(context.cluster.clone()))?;

        if cluster.server.is_empty() {
            return Err(KubeconfigError::Invalid(format!(
                "cluster '{}' has no server",
                context.cluster
            )));
        }

        let user = match &context.user {
            Some(name) if !name.is_empty() => Some(
                self.users
                    .iter()
                    .find(|u| &u.name == name)
                    .map(|u| &u.user)
                    .ok_or_else(|| KubeconfigError::UnknownUser(name.clone()))?,
            ),
            _ => None,
        };

        let root_certificate = inline_or_file(
            cluster.certificate_authority_data.as_deref(),
            cluster.certificate_authority.as_deref(),
            base_dir,
            "certificate-authority",
        )?;

        let credentials = match user {
            Some(user) => credentials(user, base_dir)?,
            None => Credentials::Anonymous,
        };

        Ok(ClusterConfig {
            server: cluster.server.trim_end_matches('/').to_string(),
            root_certificate,
            insecure: cluster.insecure_skip_tls_verify,
            credentials,
            namespace: context.namespace.clone(),
        })
    }
}

fn credentials(user: &UserEntry, base_dir: &Path) -> Result<Credentials, KubeconfigError> {
    let certificate = inline_or_file(
        user.client_certificate_data.as_deref(),
        user.client_certificate.as_deref(),
        base_dir,
        "client-certificate",
    )?;
    let key = inline_or_file(
        user.client_key_data.as_deref(),
        user.client_key.as_deref(),
        base_dir,
        "client-key",
    )?;
    match (certificate, key) {
        (Some(certificate), Some(key)) => {
            return Ok(Credentials::ClientCertificate { certificate, key })
        }
        (Some(_), None) | (None, Some(_)) => {
            return Err(KubeconfigError::Invalid(
                "client certificate and key must be given together".to_string(),
            ))
        }
        (None, None) => {}
    }

    if let Some(token) = user.token.as_deref().filter(|t| !t.is_empty()) {
        return Ok(Credentials::Bearer(token.to_string()));
    }
    if let Some(file) = user.token_file.as_deref().filter(|f| !f.is_empty()) {
        let path = anchored(file, base_dir);
        let token = std::fs::read_to_string(&path)
            .map_err(|source| KubeconfigError::Io { path, source })?;
        return Ok(Credentials::Bearer(token.trim().to_string()));
    }
    if let (Some(username), Some(password)) = (&user.username, &user.password) {
        return Ok(Credentials::Basic {
            username: username.clone(),
            password: password.clone(),
        });
    }
    Ok(Credentials::Anonymous)
}

/// Inline base64 data wins over a file reference.
fn inline_or_file(
    data: Option<&str>,
    file: Option<&str>,
    base_dir: &Path,
    field: &'static str,
) -> Result<Option<Vec<u8>>, KubeconfigError> {
    if let Some(data) = data.filter(|d| !d.is_empty()) {
        let bytes = STANDARD
            .decode(data.trim())
            .map_err(|e| KubeconfigError::Invalid(format!("{}-data: {}", field, e)))?;
        return Ok(Some(bytes));
    }
    if let Some(file) = file.filter(|f| !f.is_empty()) {
        let path = anchored(file, base_dir);
        let bytes = std::fs::read(&path).map_err(|source| KubeconfigError::Io { path, source })?;
        return Ok(Some(bytes));
    }
    Ok(None)
}

fn anchored(file: &str, base_dir: &Path) -> PathBuf {
    let path = Path::new(file);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// `$KUBECONFIG` (first entry) or `~/.kube/config`.
pub fn default_path() -> Option<PathBuf> {
    if let Ok(value) = std::env::var("KUBECONFIG") {
        if let Some(first) = std::env::split_paths(&value).find(|p| !p.as_os_str().is_empty()) {
            return Some(first);
        }
    }
    dirs_next::home_dir().map(|home| home.join(".kube").join("config"))
}

/// Expand a leading `~/` against the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs_next::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

/// Load the kubeconfig at `path` (or the default location) and resolve
/// `context` against it.
pub fn load(path: Option<&Path>, context: Option<&str>) -> Result<ClusterConfig, KubeconfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => default_path().ok_or(KubeconfigError::NotFound)?,
    };
    let config = Kubeconfig::read(&path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    config.resolve(context, base_dir)
}
