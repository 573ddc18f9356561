//! Inode management for the FUSE filesystem.
//!
//! Maps inode numbers to projection paths and back. Only names are kept;
//! attributes are recomputed from a fresh walk on every request. Mappings
//! live only as long as the kernel holds a reference to them.

use std::collections::{HashMap, HashSet};
use std::time::SystemTime;

use kubefs_core::{Attr, NodeKind};
use parking_lot::RwLock;

/// Reserved inode for the root directory.
pub const ROOT_INO: u64 = 1;

/// Inode attributes matching FUSE requirements.
#[derive(Debug, Clone)]
pub struct InodeAttr {
    pub ino: u64,
    pub size: u64,
    /// Number of 512-byte blocks.
    pub blocks: u64,
    pub atime: SystemTime,
    pub mtime: SystemTime,
    pub ctime: SystemTime,
    pub crtime: SystemTime,
    pub kind: NodeKind,
    pub perm: u16,
    pub nlink: u32,
    pub uid: u32,
    pub gid: u32,
}

#[cfg(unix)]
fn owner() -> (u32, u32) {
    unsafe { (libc::getuid(), libc::getgid()) }
}

#[cfg(not(unix))]
fn owner() -> (u32, u32) {
    (0, 0)
}

impl InodeAttr {
    /// Read-only directory.
    pub fn directory(ino: u64) -> Self {
        Self::build(ino, NodeKind::Directory, 0, 0o555, 2)
    }

    /// Read-only regular file.
    pub fn file(ino: u64, size: u64) -> Self {
        Self::build(ino, NodeKind::File, size, 0o444, 1)
    }

    /// Attributes for a node's `stat`.
    pub fn from_attr(ino: u64, attr: Attr) -> Self {
        match attr.kind {
            NodeKind::Directory => Self::directory(ino),
            NodeKind::File => Self::file(ino, attr.size),
        }
    }

    fn build(ino: u64, kind: NodeKind, size: u64, perm: u16, nlink: u32) -> Self {
        let now = SystemTime::now();
        let (uid, gid) = owner();
        InodeAttr {
            ino,
            size,
            blocks: size.div_ceil(512),
            atime: now,
            mtime: now,
            ctime: now,
            crtime: now,
            kind,
            perm,
            nlink,
            uid,
            gid,
        }
    }
}

/// One known inode.
struct Entry {
    path: String,
    /// Outstanding kernel lookups; zero for inodes only seen in a readdir.
    lookups: u64,
    parent: Option<u64>,
    children: HashSet<u64>,
}

struct Inner {
    path_to_ino: HashMap<String, u64>,
    entries: HashMap<u64, Entry>,
    next_ino: u64,
}

impl Inner {
    fn get_or_create(&mut self, normalized: String) -> u64 {
        if let Some(&ino) = self.path_to_ino.get(&normalized) {
            return ino;
        }

        let ino = self.next_ino;
        self.next_ino += 1;

        let parent = self
            .path_to_ino
            .get(&InodeTable::parent_path(&normalized))
            .copied();
        if let Some(p) = parent {
            if let Some(entry) = self.entries.get_mut(&p) {
                entry.children.insert(ino);
            }
        }
        self.path_to_ino.insert(normalized.clone(), ino);
        self.entries.insert(
            ino,
            Entry {
                path: normalized,
                lookups: 0,
                parent,
                children: HashSet::new(),
            },
        );
        ino
    }

    /// Drop `ino` together with the unreferenced inodes allocated below it.
    fn remove(&mut self, ino: u64) -> Option<String> {
        if ino == ROOT_INO {
            return None;
        }
        let entry = self.entries.remove(&ino)?;
        self.path_to_ino.remove(&entry.path);
        if let Some(p) = entry.parent {
            if let Some(parent) = self.entries.get_mut(&p) {
                parent.children.remove(&ino);
            }
        }

        for child in entry.children {
            let unreferenced = match self.entries.get_mut(&child) {
                Some(c) if c.lookups == 0 => true,
                Some(c) => {
                    c.parent = None;
                    false
                }
                None => false,
            };
            if unreferenced {
                self.remove(child);
            }
        }

        Some(entry.path)
    }
}

/// Inode table managing path-to-inode and inode-to-path mappings.
///
/// Inodes handed to the kernel by `lookup` are reference counted and dropped
/// when the kernel forgets them. Inodes that only appeared in a directory
/// listing hold no count; they go away when a later listing of the same
/// directory no longer contains them, or when their directory is dropped.
pub struct InodeTable {
    inner: RwLock<Inner>,
}

impl Default for InodeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl InodeTable {
    /// Create a table holding only the root.
    pub fn new() -> Self {
        let root = Entry {
            path: "/".to_string(),
            lookups: 0,
            parent: None,
            children: HashSet::new(),
        };
        InodeTable {
            inner: RwLock::new(Inner {
                path_to_ino: HashMap::from([("/".to_string(), ROOT_INO)]),
                entries: HashMap::from([(ROOT_INO, root)]),
                next_ino: ROOT_INO + 1,
            }),
        }
    }

    /// Inode for `path`, allocating one on first sight. Takes no reference.
    pub fn get_or_create(&self, path: &str) -> u64 {
        let normalized = Self::normalize_path(path);

        if let Some(&ino) = self.inner.read().path_to_ino.get(&normalized) {
            return ino;
        }
        self.inner.write().get_or_create(normalized)
    }

    /// Inode for `path` with one more kernel reference held on it.
    pub fn lookup(&self, path: &str) -> u64 {
        let mut inner = self.inner.write();
        let ino = inner.get_or_create(Self::normalize_path(path));
        if let Some(entry) = inner.entries.get_mut(&ino) {
            entry.lookups += 1;
        }
        ino
    }

    /// Release `nlookup` kernel references. Returns true when the inode was
    /// dropped. The root is never dropped.
    pub fn forget(&self, ino: u64, nlookup: u64) -> bool {
        if ino == ROOT_INO {
            return false;
        }
        let mut inner = self.inner.write();
        let remaining = match inner.entries.get_mut(&ino) {
            Some(entry) => {
                entry.lookups = entry.lookups.saturating_sub(nlookup);
                entry.lookups
            }
            None => return false,
        };
        remaining == 0 && inner.remove(ino).is_some()
    }

    /// Remove an inode mapping regardless of its references.
    pub fn remove(&self, ino: u64) -> Option<String> {
        self.inner.write().remove(ino)
    }

    /// Remove an inode by path.
    pub fn remove_path(&self, path: &str) -> Option<u64> {
        let ino = self.get_ino(path)?;
        self.remove(ino).map(|_| ino)
    }

    /// Drop unreferenced children of `parent` whose names are not in `live`.
    /// Returns how many were dropped.
    pub fn retain_children(&self, parent: u64, live: &HashSet<&str>) -> usize {
        let mut inner = self.inner.write();
        let stale: Vec<u64> = match inner.entries.get(&parent) {
            Some(entry) => entry
                .children
                .iter()
                .copied()
                .filter(|child| {
                    inner.entries.get(child).is_some_and(|c| {
                        let name = c.path.rsplit('/').next().unwrap_or_default();
                        c.lookups == 0 && !live.contains(name)
                    })
                })
                .collect(),
            None => return 0,
        };

        stale
            .into_iter()
            .filter(|&ino| inner.remove(ino).is_some())
            .count()
    }

    /// Outstanding kernel references on `ino`.
    pub fn lookup_count(&self, ino: u64) -> u64 {
        self.inner
            .read()
            .entries
            .get(&ino)
            .map_or(0, |entry| entry.lookups)
    }

    pub fn get_ino(&self, path: &str) -> Option<u64> {
        let normalized = Self::normalize_path(path);
        self.inner.read().path_to_ino.get(&normalized).copied()
    }

    pub fn get_path(&self, ino: u64) -> Option<String> {
        self.inner.read().entries.get(&ino).map(|e| e.path.clone())
    }

    /// Number of known inodes, root included.
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `/` plus the path with duplicate and trailing slashes removed.
    pub fn normalize_path(path: &str) -> String {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        format!("/{}", segments.join("/"))
    }

    /// Join a child name onto a parent path.
    pub fn child_path(parent_path: &str, name: &str) -> String {
        if parent_path == "/" {
            format!("/{}", name)
        } else {
            format!("{}/{}", parent_path, name)
        }
    }

    /// Parent of `path`; the root is its own parent.
    pub fn parent_path(path: &str) -> String {
        match path.rsplit_once('/') {
            Some(("", _)) | None => "/".to_string(),
            Some((parent, _)) => parent.to_string(),
        }
    }
}
