//! Platform-neutral FUSE core logic.
//!
//! Every request re-walks the projection from a fresh root; the only state
//! kept between requests is the inode table and the open-file handles.

use std::collections::HashSet;
use std::time::Duration;

use kubefs_core::{CallContext, CancelSource, FileNode, Node, NodeKind, Projection};
use tracing::{debug, info};

use crate::async_bridge::{block_on, init_runtime};
use crate::error::{FuseError, FuseResult};
use crate::handles::HandleTable;
use crate::inode::{InodeAttr, InodeTable, ROOT_INO};

/// Mount-time settings.
#[derive(Debug, Clone)]
pub struct FsOptions {
    /// FUSE fsname / volume label.
    pub volume_name: String,
    /// Kernel attribute and entry cache TTL.
    pub attr_ttl: Duration,
    /// Deadline for each request's remote fetches.
    pub request_timeout: Duration,
    pub allow_other: bool,
}

impl Default for FsOptions {
    fn default() -> Self {
        FsOptions {
            volume_name: "Kubernetes".to_string(),
            attr_ttl: Duration::from_secs(1),
            request_timeout: Duration::from_secs(30),
            allow_other: false,
        }
    }
}

/// Result from a readdir operation.
pub struct ReadDirResult {
    pub ino: u64,
    pub parent_ino: u64,
    pub entries: Vec<DirEntry>,
}

/// A single directory entry.
pub struct DirEntry {
    pub ino: u64,
    pub name: String,
    pub kind: NodeKind,
}

/// Core FUSE filesystem logic.
pub struct KubeFs {
    projection: Projection,
    inodes: InodeTable,
    handles: HandleTable,
    options: FsOptions,
    shutdown: CancelSource,
}

impl KubeFs {
    /// Create the filesystem and the runtime its callbacks block on.
    pub fn new(projection: Projection, options: FsOptions) -> FuseResult<Self> {
        init_runtime()?;
        Ok(KubeFs {
            projection,
            inodes: InodeTable::new(),
            handles: HandleTable::new(),
            options,
            shutdown: CancelSource::new(),
        })
    }

    pub fn options(&self) -> &FsOptions {
        &self.options
    }

    pub fn ttl(&self) -> Duration {
        self.options.attr_ttl
    }

    /// Abort in-flight fetches; later requests fail with `EINTR`.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn get_path(&self, ino: u64) -> Option<String> {
        self.inodes.get_path(ino)
    }

    fn context(&self) -> CallContext {
        CallContext::with_cancel(self.shutdown.token()).with_timeout(self.options.request_timeout)
    }

    /// Walk `path` from a fresh root.
    fn resolve(&self, path: &str) -> FuseResult<Node> {
        let cx = self.context();
        let node = block_on(self.projection.lookup_path(path, &cx))??;
        Ok(node)
    }

    fn path_of(&self, ino: u64) -> FuseResult<String> {
        self.get_path(ino).ok_or(FuseError::NotFound)
    }

    /// Perform a lookup operation.
    pub fn do_lookup(&self, parent: u64, name: &str) -> FuseResult<InodeAttr> {
        let parent_path = self.path_of(parent)?;
        let child_path = InodeTable::child_path(&parent_path, name);
        let node = self.resolve(&child_path)?;
        let ino = self.inodes.lookup(&child_path);
        debug!(path = %child_path, ino, node = node.type_name(), "lookup");
        Ok(InodeAttr::from_attr(ino, node.stat()))
    }

    /// Perform a getattr operation.
    pub fn do_getattr(&self, ino: u64) -> FuseResult<InodeAttr> {
        if ino == ROOT_INO {
            return Ok(InodeAttr::directory(ROOT_INO));
        }
        let path = self.path_of(ino)?;
        let node = self.resolve(&path)?;
        Ok(InodeAttr::from_attr(ino, node.stat()))
    }

    /// Perform a readdir operation.
    pub fn do_readdir(&self, ino: u64) -> FuseResult<ReadDirResult> {
        let path = self.path_of(ino)?;
        let node = self.resolve(&path)?;
        let cx = self.context();
        let children = block_on(node.list_children(&cx))??;

        let parent_ino = self
            .inodes
            .get_ino(&InodeTable::parent_path(&path))
            .unwrap_or(ROOT_INO);
        let entries: Vec<DirEntry> = children
            .into_iter()
            .map(|child| {
                let child_path = InodeTable::child_path(&path, &child.name);
                DirEntry {
                    ino: self.inodes.get_or_create(&child_path),
                    name: child.name,
                    kind: child.kind,
                }
            })
            .collect();

        let live: HashSet<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        let dropped = self.inodes.retain_children(ino, &live);
        if dropped > 0 {
            debug!(path = %path, dropped, "dropped vanished entries");
        }

        Ok(ReadDirResult {
            ino,
            parent_ino,
            entries,
        })
    }

    /// Release `nlookup` kernel references taken by `do_lookup`.
    pub fn do_forget(&self, ino: u64, nlookup: u64) {
        if self.inodes.forget(ino, nlookup) {
            debug!(ino, "forgot inode");
        }
    }

    /// Known inodes, root included.
    pub fn inode_count(&self) -> usize {
        self.inodes.len()
    }

    /// Materialize a file and hand out a handle for it.
    pub fn do_open(&self, ino: u64, write: bool) -> FuseResult<u64> {
        if write {
            return Err(FuseError::ReadOnly);
        }
        let path = self.path_of(ino)?;
        let file = self.resolve(&path)?.into_file()?;
        let fh = self.handles.insert(file);
        debug!(path = %path, fh, "opened");
        Ok(fh)
    }

    /// Read a clamped range, from the open handle when there is one.
    pub fn do_read(&self, ino: u64, fh: u64, offset: i64, size: u32) -> FuseResult<Vec<u8>> {
        let offset = u64::try_from(offset).map_err(|_| FuseError::InvalidArg)?;
        let file: FileNode = match self.handles.get(fh) {
            Some(file) => file,
            None => {
                let path = self.path_of(ino)?;
                self.resolve(&path)?.into_file()?
            }
        };
        let data = file.read_content(offset, u64::from(size))?;
        Ok(data.to_vec())
    }

    pub fn do_release(&self, fh: u64) {
        self.handles.release(fh);
    }

    /// Existence check; any write access is refused.
    pub fn do_access(&self, ino: u64, write: bool) -> FuseResult<()> {
        if write {
            return Err(FuseError::ReadOnly);
        }
        self.do_getattr(ino).map(|_| ())
    }

    pub fn open_handles(&self) -> usize {
        self.handles.len()
    }

    #[cfg(unix)]
    fn mount_options(&self) -> Vec<fuser::MountOption> {
        use fuser::MountOption;

        let mut options = vec![
            MountOption::FSName(self.options.volume_name.clone()),
            MountOption::Subtype("kubefs".to_string()),
            MountOption::RO,
            MountOption::AutoUnmount,
            MountOption::DefaultPermissions,
        ];
        if self.options.allow_other {
            options.push(MountOption::AllowOther);
        }
        options
    }

    /// Mount read-only at `mountpoint` and serve on this thread until
    /// unmounted.
    #[cfg(unix)]
    pub fn mount(self, mountpoint: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
        use crate::unix_fuse::UnixFuse;

        let options = self.mount_options();
        info!(mountpoint = %mountpoint.display(), volume = %self.options.volume_name, "mounting");
        fuser::mount2(UnixFuse(self), mountpoint, &options)?;
        info!(mountpoint = %mountpoint.display(), "unmounted");

        Ok(())
    }

    /// Mount read-only and serve from a background thread. Dropping the
    /// returned session unmounts.
    #[cfg(unix)]
    pub fn spawn_mount(
        self,
        mountpoint: &std::path::Path,
    ) -> Result<fuser::BackgroundSession, Box<dyn std::error::Error>> {
        use crate::unix_fuse::UnixFuse;

        let options = self.mount_options();
        info!(mountpoint = %mountpoint.display(), volume = %self.options.volume_name, "mounting in background");
        let session = fuser::spawn_mount2(UnixFuse(self), mountpoint, &options)?;
        Ok(session)
    }
}
