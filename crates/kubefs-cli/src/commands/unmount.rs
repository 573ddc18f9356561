//! Unmount command for the kubefs FUSE filesystem.

use std::path::{Path, PathBuf};
use std::process::Command;

/// Unmount arguments.
pub struct UnmountArgs {
    /// Mount point path to unmount.
    pub mountpoint: PathBuf,
    /// Force unmount even if busy.
    pub force: bool,
}

/// Run the unmount command.
pub fn run(args: UnmountArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mountpoint = args
        .mountpoint
        .canonicalize()
        .unwrap_or(args.mountpoint.clone());

    unmount(&mountpoint, args.force)?;

    println!("Unmounted {}", mountpoint.display());
    Ok(())
}

#[cfg(target_os = "macos")]
fn unmount(mountpoint: &Path, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new("umount");
    if force {
        cmd.arg("-f");
    }
    cmd.arg(mountpoint);
    check(cmd)
}

#[cfg(target_os = "linux")]
fn unmount(mountpoint: &Path, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    // fusermount works without root
    let mut cmd = Command::new("fusermount");
    cmd.arg(if force { "-uz" } else { "-u" }).arg(mountpoint);
    if check(cmd).is_ok() {
        return Ok(());
    }

    let mut cmd = Command::new("umount");
    if force {
        cmd.arg("-l");
    }
    cmd.arg(mountpoint);
    check(cmd)
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
fn unmount(_mountpoint: &Path, _force: bool) -> Result<(), Box<dyn std::error::Error>> {
    Err("Unmount not supported on this platform".into())
}

#[cfg(any(target_os = "macos", target_os = "linux"))]
fn check(mut cmd: Command) -> Result<(), Box<dyn std::error::Error>> {
    let output = cmd.output()?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("{:?} failed: {}", cmd.get_program(), stderr.trim()).into());
    }
    Ok(())
}
