use std::path::PathBuf;

use kubefs_core::ClusterError;

/// Errors loading or resolving a kubeconfig.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum KubeconfigError {
    #[error("No kubeconfig found (set KUBECONFIG or create ~/.kube/config)")]
    NotFound,

    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid kubeconfig YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("No context selected and no current-context set")]
    NoContext,

    #[error("Context '{0}' not found in kubeconfig")]
    UnknownContext(String),

    #[error("Cluster '{0}' not found in kubeconfig")]
    UnknownCluster(String),

    #[error("User '{0}' not found in kubeconfig")]
    UnknownUser(String),

    #[error("Invalid kubeconfig: {0}")]
    Invalid(String),
}

impl From<KubeconfigError> for ClusterError {
    fn from(err: KubeconfigError) -> Self {
        ClusterError::Auth(err.to_string())
    }
}
