use kubefs_core::NodeError;

/// Result type for FUSE operations.
pub type FuseResult<T> = Result<T, FuseError>;

/// Errors returned by filesystem operations.
#[derive(Debug, thiserror::Error)]
pub enum FuseError {
    #[error("not found")]
    NotFound,
    #[error("is a directory")]
    IsDir,
    #[error("not a directory")]
    NotDir,
    /// Any write-type operation.
    #[error("read-only filesystem")]
    ReadOnly,
    /// Bad offset or undecodable name.
    #[error("invalid argument")]
    InvalidArg,
    #[error("interrupted")]
    Interrupted,
    /// Remote or serialization failure.
    #[error("I/O error: {0}")]
    Io(String),
    #[error("{0}")]
    Runtime(String),
}

#[cfg(unix)]
impl FuseError {
    /// Convert to a libc errno.
    pub fn to_errno(&self) -> i32 {
        match self {
            FuseError::NotFound => libc::ENOENT,
            FuseError::IsDir => libc::EISDIR,
            FuseError::NotDir => libc::ENOTDIR,
            FuseError::ReadOnly => libc::EROFS,
            FuseError::InvalidArg => libc::EINVAL,
            FuseError::Interrupted => libc::EINTR,
            FuseError::Io(_) => libc::EIO,
            FuseError::Runtime(_) => libc::EIO,
        }
    }
}

impl From<NodeError> for FuseError {
    fn from(e: NodeError) -> Self {
        match e {
            NodeError::NotFound(_) => FuseError::NotFound,
            NodeError::Range { .. } => FuseError::InvalidArg,
            NodeError::Cancelled => FuseError::Interrupted,
            NodeError::NotADirectory(_) => FuseError::NotDir,
            NodeError::IsADirectory(_) => FuseError::IsDir,
            NodeError::Remote(_) | NodeError::Serialization(_) => FuseError::Io(e.to_string()),
            _ => FuseError::Io(e.to_string()),
        }
    }
}
