pub mod cat;
pub mod config;
pub mod ls;
#[cfg(feature = "fuse")]
pub mod mount;
#[cfg(not(feature = "fuse"))]
pub mod mount {
    use std::path::PathBuf;

    use kubefs_config::KubeFsConfig;

    /// Mount arguments.
    #[allow(dead_code)]
    pub struct MountArgs {
        /// Mount point path.
        pub mountpoint: Option<PathBuf>,
        /// Serve on the current thread.
        pub foreground: bool,
    }

    /// Run the mount command when FUSE support is disabled.
    pub async fn run(
        _config: KubeFsConfig,
        _args: MountArgs,
    ) -> Result<(), Box<dyn std::error::Error>> {
        Err("FUSE support is disabled in this build. Rebuild kubefs-cli with --features fuse.".into())
    }
}
pub mod stat;
pub mod tree;
pub mod unmount;
pub mod validate;
