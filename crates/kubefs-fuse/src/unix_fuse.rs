//! Unix FUSE implementation using the `fuser` crate.
//!
//! The mount is read-only: every mutating callback answers `EROFS`.

use std::ffi::OsStr;
use std::time::SystemTime;

use fuser::{
    FileAttr, FileType, Filesystem, ReplyAttr, ReplyCreate, ReplyData, ReplyDirectory,
    ReplyEmpty, ReplyEntry, ReplyOpen, ReplyStatfs, ReplyWrite, Request, TimeOrNow,
};
use kubefs_core::NodeKind;
use tracing::{debug, warn};

use crate::common::KubeFs;
use crate::error::FuseError;
use crate::inode::InodeAttr;

/// Unix FUSE filesystem wrapper around `KubeFs`.
pub struct UnixFuse(pub KubeFs);

fn file_type(kind: NodeKind) -> FileType {
    match kind {
        NodeKind::File => FileType::RegularFile,
        NodeKind::Directory => FileType::Directory,
    }
}

/// Convert an `InodeAttr` to a fuser `FileAttr`.
pub fn inode_attr_to_file_attr(attr: &InodeAttr) -> FileAttr {
    FileAttr {
        ino: attr.ino,
        size: attr.size,
        blocks: attr.blocks,
        atime: attr.atime,
        mtime: attr.mtime,
        ctime: attr.ctime,
        crtime: attr.crtime,
        kind: file_type(attr.kind),
        perm: attr.perm,
        nlink: attr.nlink,
        uid: attr.uid,
        gid: attr.gid,
        rdev: 0,
        blksize: 4096,
        flags: 0,
    }
}

/// Whether open flags ask for anything beyond reading.
fn wants_write(flags: i32) -> bool {
    flags & libc::O_ACCMODE != libc::O_RDONLY || flags & libc::O_TRUNC != 0
}

/// Log a failed request. Misses are routine; everything else is worth a warning.
fn log_failure(op: &str, e: &FuseError) {
    match e {
        FuseError::NotFound => debug!("{} failed: {}", op, e),
        _ => warn!("{} failed: {}", op, e),
    }
}

impl Filesystem for UnixFuse {
    fn destroy(&mut self) {
        debug!("destroy");
        self.0.shutdown();
    }

    fn lookup(&mut self, _req: &Request, parent: u64, name: &OsStr, reply: ReplyEntry) {
        let Some(name) = name.to_str() else {
            reply.error(libc::ENOENT);
            return;
        };
        debug!("lookup: parent={}, name={}", parent, name);

        match self.0.do_lookup(parent, name) {
            Ok(attr) => reply.entry(&self.0.ttl(), &inode_attr_to_file_attr(&attr), 0),
            Err(e) => {
                log_failure("lookup", &e);
                reply.error(e.to_errno());
            }
        }
    }

    fn forget(&mut self, _req: &Request, ino: u64, nlookup: u64) {
        debug!("forget: ino={}, nlookup={}", ino, nlookup);
        self.0.do_forget(ino, nlookup);
    }

    fn getattr(&mut self, _req: &Request, ino: u64, reply: ReplyAttr) {
        debug!("getattr: ino={}", ino);

        match self.0.do_getattr(ino) {
            Ok(attr) => reply.attr(&self.0.ttl(), &inode_attr_to_file_attr(&attr)),
            Err(e) => {
                log_failure("getattr", &e);
                reply.error(e.to_errno());
            }
        }
    }

    fn readdir(
        &mut self,
        _req: &Request,
        ino: u64,
        _fh: u64,
        offset: i64,
        mut reply: ReplyDirectory,
    ) {
        debug!("readdir: ino={}, offset={}", ino, offset);

        let result = match self.0.do_readdir(ino) {
            Ok(result) => result,
            Err(e) => {
                log_failure("readdir", &e);
                reply.error(e.to_errno());
                return;
            }
        };

        let dots = [
            (result.ino, FileType::Directory, ".".to_string()),
            (result.parent_ino, FileType::Directory, "..".to_string()),
        ];
        let entries = dots.into_iter().chain(
            result
                .entries
                .into_iter()
                .map(|entry| (entry.ino, file_type(entry.kind), entry.name)),
        );

        let start = usize::try_from(offset).unwrap_or(0);
        for (i, (ino, kind, name)) in entries.enumerate().skip(start) {
            // Offset handed back is that of the next entry
            if reply.add(ino, (i + 1) as i64, kind, &name) {
                break;
            }
        }
        reply.ok();
    }

    fn opendir(&mut self, _req: &Request, ino: u64, _flags: i32, reply: ReplyOpen) {
        debug!("opendir: ino={}", ino);

        if self.0.get_path(ino).is_some() {
            reply.opened(0, 0);
        } else {
            reply.error(libc::ENOENT);
        }
    }

    fn open(&mut self, _req: &Request, ino: u64, flags: i32, reply: ReplyOpen) {
        debug!("open: ino={}, flags={:#o}", ino, flags);

        match self.0.do_open(ino, wants_write(flags)) {
            Ok(fh) => reply.opened(fh, 0),
            Err(e) => {
                log_failure("open", &e);
                reply.error(e.to_errno());
            }
        }
    }

    fn read(
        &mut self,
        _req: &Request,
        ino: u64,
        fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyData,
    ) {
        debug!("read: ino={}, fh={}, offset={}, size={}", ino, fh, offset, size);

        match self.0.do_read(ino, fh, offset, size) {
            Ok(data) => reply.data(&data),
            Err(e) => {
                log_failure("read", &e);
                reply.error(e.to_errno());
            }
        }
    }

    fn release(
        &mut self,
        _req: &Request,
        _ino: u64,
        fh: u64,
        _flags: i32,
        _lock_owner: Option<u64>,
        _flush: bool,
        reply: ReplyEmpty,
    ) {
        self.0.do_release(fh);
        reply.ok();
    }

    fn access(&mut self, _req: &Request, ino: u64, mask: i32, reply: ReplyEmpty) {
        match self.0.do_access(ino, mask & libc::W_OK != 0) {
            Ok(()) => reply.ok(),
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn statfs(&mut self, _req: &Request, _ino: u64, reply: ReplyStatfs) {
        reply.statfs(0, 0, 0, 0, 0, 4096, 255, 4096);
    }

    fn write(
        &mut self,
        _req: &Request,
        ino: u64,
        _fh: u64,
        _offset: i64,
        _data: &[u8],
        _write_flags: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyWrite,
    ) {
        debug!("write refused: ino={}", ino);
        reply.error(libc::EROFS);
    }

    fn create(
        &mut self,
        _req: &Request,
        _parent: u64,
        _name: &OsStr,
        _mode: u32,
        _umask: u32,
        _flags: i32,
        reply: ReplyCreate,
    ) {
        reply.error(libc::EROFS);
    }

    fn mkdir(
        &mut self,
        _req: &Request,
        _parent: u64,
        _name: &OsStr,
        _mode: u32,
        _umask: u32,
        reply: ReplyEntry,
    ) {
        reply.error(libc::EROFS);
    }

    fn unlink(&mut self, _req: &Request, _parent: u64, _name: &OsStr, reply: ReplyEmpty) {
        reply.error(libc::EROFS);
    }

    fn rmdir(&mut self, _req: &Request, _parent: u64, _name: &OsStr, reply: ReplyEmpty) {
        reply.error(libc::EROFS);
    }

    fn rename(
        &mut self,
        _req: &Request,
        _parent: u64,
        _name: &OsStr,
        _newparent: u64,
        _newname: &OsStr,
        _flags: u32,
        reply: ReplyEmpty,
    ) {
        reply.error(libc::EROFS);
    }

    fn setattr(
        &mut self,
        _req: &Request,
        _ino: u64,
        _mode: Option<u32>,
        _uid: Option<u32>,
        _gid: Option<u32>,
        _size: Option<u64>,
        _atime: Option<TimeOrNow>,
        _mtime: Option<TimeOrNow>,
        _ctime: Option<SystemTime>,
        _fh: Option<u64>,
        _crtime: Option<SystemTime>,
        _chgtime: Option<SystemTime>,
        _bkuptime: Option<SystemTime>,
        _flags: Option<u32>,
        reply: ReplyAttr,
    ) {
        reply.error(libc::EROFS);
    }
}
