//! Mount command for the kubefs FUSE filesystem.

use std::path::PathBuf;

use kubefs_config::KubeFsConfig;
use kubefs_fuse::{FsOptions, KubeFs};
use tracing::info;

use crate::session;

/// Mount arguments.
pub struct MountArgs {
    /// Mount point path; the configured one when absent.
    pub mountpoint: Option<PathBuf>,
    /// Serve on the current thread until unmounted externally.
    pub foreground: bool,
}

/// Run the mount command.
///
/// Without `--foreground` the filesystem is served from a background
/// session and unmounted when the process receives Ctrl-C.
pub async fn run(config: KubeFsConfig, args: MountArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mountpoint = args
        .mountpoint
        .unwrap_or_else(|| PathBuf::from(config.mountpoint()));

    // Ensure mount point exists
    if !mountpoint.exists() {
        std::fs::create_dir_all(&mountpoint)?;
    }

    let projection = session::projection(&config)?;
    let options = FsOptions {
        volume_name: config.volume_name().to_string(),
        attr_ttl: config.attr_ttl(),
        request_timeout: config.request_timeout(),
        allow_other: config.allow_other,
    };
    let fs = KubeFs::new(projection, options)?;

    if args.foreground {
        // FUSE callbacks block on their own runtime, which cannot happen on
        // a thread already driving this one
        tokio::task::spawn_blocking(move || fs.mount(&mountpoint).map_err(|e| e.to_string()))
            .await??;
    } else {
        let session = fs.spawn_mount(&mountpoint)?;
        println!("Mounted at {} (Ctrl-C to unmount)", mountpoint.display());
        tokio::signal::ctrl_c().await?;
        info!("interrupted, unmounting");
        drop(session);
    }

    Ok(())
}
