use std::fmt;
use std::sync::Arc;

use crate::error::NodeError;

/// Immutable byte buffer materialized at resolve time.
#[derive(Clone)]
pub struct FileNode {
    contents: Arc<[u8]>,
}

impl FileNode {
    pub fn new(contents: impl Into<Arc<[u8]>>) -> Self {
        FileNode {
            contents: contents.into(),
        }
    }

    /// Always the buffer length.
    pub fn size(&self) -> u64 {
        self.contents.len() as u64
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    /// Read up to `size` bytes starting at `offset`, clamped to the buffer.
    ///
    /// `offset == len` yields an empty slice; `offset > len` is a range error;
    /// a request running past the end is truncated to the tail.
    pub fn read_content(&self, offset: u64, size: u64) -> Result<&[u8], NodeError> {
        let len = self.size();
        if offset > len {
            return Err(NodeError::Range { offset, len });
        }
        let end = offset.saturating_add(size).min(len);
        Ok(&self.contents[offset as usize..end as usize])
    }
}

impl fmt::Debug for FileNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileNode").field("size", &self.size()).finish()
    }
}
