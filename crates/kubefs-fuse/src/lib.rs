//! Read-only FUSE transport for the kubefs projection.
//!
//! Kernel requests are answered by walking the projection from its root on
//! every call, so the mount always reflects the cluster as it is now. Open
//! files keep the buffer that was materialized at `open` until `release`.
//!
//! # Architecture
//!
//! - `common`: `KubeFs`, the platform-neutral `do_*` operations
//! - `unix_fuse`: `fuser::Filesystem` impl for macOS/Linux
//!
//! # Example
//!
//! ```ignore
//! use kubefs_fuse::{FsOptions, KubeFs};
//!
//! let fs = KubeFs::new(projection, FsOptions::default())?;
//! fs.mount(Path::new("/mnt/k8s"))?;
//! ```

mod async_bridge;
mod common;
mod error;
mod handles;
mod inode;
#[cfg(unix)]
mod unix_fuse;

pub use async_bridge::{block_on, init_runtime, runtime};
pub use common::{DirEntry, FsOptions, KubeFs, ReadDirResult};
pub use error::{FuseError, FuseResult};
pub use handles::HandleTable;
pub use inode::{InodeAttr, InodeTable, ROOT_INO};
#[cfg(unix)]
pub use unix_fuse::{inode_attr_to_file_attr, UnixFuse};
