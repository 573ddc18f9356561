use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use kubefs_core::FileNode;
use parking_lot::RwLock;

/// Open files: each handle pins the buffer materialized at `open`, so
/// repeated reads see one consistent document.
pub struct HandleTable {
    next: AtomicU64,
    open: RwLock<HashMap<u64, FileNode>>,
}

impl Default for HandleTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HandleTable {
    pub fn new() -> Self {
        HandleTable {
            next: AtomicU64::new(1),
            open: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert(&self, file: FileNode) -> u64 {
        let fh = self.next.fetch_add(1, Ordering::Relaxed);
        self.open.write().insert(fh, file);
        fh
    }

    pub fn get(&self, fh: u64) -> Option<FileNode> {
        self.open.read().get(&fh).cloned()
    }

    /// Drop a handle. Returns whether it was open.
    pub fn release(&self, fh: u64) -> bool {
        self.open.write().remove(&fh).is_some()
    }

    pub fn len(&self) -> usize {
        self.open.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get_release() {
        let table = HandleTable::new();
        let a = table.insert(FileNode::new(b"abc".to_vec()));
        let b = table.insert(FileNode::new(b"de".to_vec()));
        assert_ne!(a, b);
        assert_eq!(table.get(a).unwrap().contents(), b"abc");
        assert_eq!(table.len(), 2);

        assert!(table.release(a));
        assert!(!table.release(a));
        assert!(table.get(a).is_none());
        assert_eq!(table.len(), 1);
    }
}
