/// Errors reported by a [`Cluster`](crate::Cluster) implementation.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ClusterError {
    /// Connection to the API server failed.
    #[error("Connection to cluster at '{endpoint}' failed")]
    ConnectionFailed {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Operation timed out.
    #[error("Operation '{operation}' timed out")]
    Timeout { operation: String },

    /// The API server answered with a non-success status.
    #[error("API server returned {code}: {message}")]
    Status { code: u16, message: String },

    /// Credentials were missing, unreadable, or rejected.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// A response could not be decoded into the expected shape.
    #[error("Failed to decode API response: {0}")]
    Decode(String),

    /// Other client-specific error.
    #[error("Cluster error: {0}")]
    Other(String),
}

impl ClusterError {
    /// Returns true if this error is transient and the operation may succeed on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            ClusterError::ConnectionFailed { .. } => true,
            ClusterError::Timeout { .. } => true,
            ClusterError::Status { code, .. } => *code == 429 || *code >= 500,
            _ => false,
        }
    }
}

/// Errors produced by the virtual node operations.
///
/// `NotFound` is reserved for a name that genuinely does not exist; a failed
/// remote fetch is always `Remote`, so callers can tell an empty directory
/// apart from one whose listing failed.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum NodeError {
    /// No child of that name.
    #[error("No such entry: {0}")]
    NotFound(String),

    /// A discovery or list call failed.
    #[error("Remote fetch failed: {0}")]
    Remote(#[from] ClusterError),

    /// A record could not be marshaled or converted to a specialized shape.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Read offset beyond the end of the file.
    #[error("Read offset {offset} is past the end of the file ({len} bytes)")]
    Range { offset: u64, len: u64 },

    /// The call was cancelled before it completed.
    #[error("Operation cancelled")]
    Cancelled,

    /// Directory operation on a file.
    #[error("Not a directory: {0}")]
    NotADirectory(String),

    /// File operation on a directory.
    #[error("Is a directory: {0}")]
    IsADirectory(String),
}

impl NodeError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, NodeError::NotFound(_))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, NodeError::Remote(_))
    }
}

impl From<serde_json::Error> for NodeError {
    fn from(e: serde_json::Error) -> Self {
        NodeError::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for NodeError {
    fn from(e: serde_yaml::Error) -> Self {
        NodeError::Serialization(e.to_string())
    }
}
