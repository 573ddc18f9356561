use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use kubefs_config::KubeFsConfig;

mod commands;
mod errors;
mod session;

use session::Session;

#[derive(Parser)]
#[command(name = "kubefs", version, about = "kubefs - a Kubernetes cluster as a read-only filesystem")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG still wins)
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mount the cluster as a FUSE filesystem
    #[cfg_attr(not(feature = "fuse"), command(hide = true))]
    Mount {
        /// Directory to mount at (defaults to the configured mountpoint)
        mountpoint: Option<PathBuf>,
        /// Serve on the current thread until unmounted externally
        #[arg(short, long)]
        foreground: bool,
    },
    /// Unmount a kubefs FUSE filesystem
    Unmount {
        /// Mount point to unmount
        mountpoint: PathBuf,
        /// Force unmount even if busy
        #[arg(short, long)]
        force: bool,
    },
    /// List directory contents
    Ls {
        /// Path to list (defaults to /)
        path: Option<String>,
    },
    /// Display file contents
    Cat {
        /// Path to the file
        path: String,
    },
    /// Show file or directory metadata
    Stat {
        /// Path to inspect
        path: String,
    },
    /// Show directory tree
    Tree {
        /// Path to show tree for (defaults to /)
        path: Option<String>,
        /// Maximum depth to recurse
        #[arg(short = 'L', long)]
        depth: Option<usize>,
    },
    /// Show effective configuration
    Config,
    /// Validate configuration file
    Validate,
}

fn find_config() -> Option<PathBuf> {
    // 1. KUBEFS_CONFIG environment variable
    if let Ok(path) = std::env::var("KUBEFS_CONFIG") {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. kubefs.yaml in current directory
    let cwd_config = PathBuf::from("kubefs.yaml");
    if cwd_config.exists() {
        return Some(cwd_config);
    }

    // 3. ~/.config/kubefs/config.yaml
    if let Some(home) = dirs_next::home_dir() {
        let home_config = home.join(".config/kubefs/config.yaml");
        if home_config.exists() {
            return Some(home_config);
        }
    }

    None
}

/// Read the config file, or fall back to defaults when there is none.
fn load_config(path: Option<&Path>) -> Result<KubeFsConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(KubeFsConfig::from_file(path)?),
        None => Ok(KubeFsConfig::default()),
    }
}

fn init_logging(debug: bool, config: &KubeFsConfig) {
    let default_level = if debug {
        "debug"
    } else {
        config.log_level().as_str()
    };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));
    builder.format_timestamp_millis();
    let _ = builder.try_init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    // An explicit --config must exist; discovered ones are optional
    let config_path = cli.config.or_else(find_config);
    let config = load_config(config_path.as_deref())?;
    init_logging(cli.debug, &config);

    match cli.command {
        Commands::Validate => {
            commands::validate::run(config_path.as_deref(), &config).await?;
        }
        Commands::Config => {
            commands::config::run(&config).await?;
        }
        Commands::Unmount { mountpoint, force } => {
            let args = commands::unmount::UnmountArgs { mountpoint, force };
            commands::unmount::run(args)?;
        }
        Commands::Mount {
            mountpoint,
            foreground,
        } => {
            let args = commands::mount::MountArgs {
                mountpoint,
                foreground,
            };
            commands::mount::run(config, args).await?;
        }
        Commands::Ls { path } => {
            let session = Session::connect(&config)?;
            commands::ls::run(&session, path).await?;
        }
        Commands::Cat { path } => {
            let session = Session::connect(&config)?;
            commands::cat::run(&session, &path).await?;
        }
        Commands::Stat { path } => {
            let session = Session::connect(&config)?;
            commands::stat::run(&session, &path).await?;
        }
        Commands::Tree { path, depth } => {
            let session = Session::connect(&config)?;
            commands::tree::run(&session, path, depth).await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            let code = err.exit_code().clamp(0, 255) as u8;
            return ExitCode::from(code);
        }
    };

    if let Err(e) = run(cli).await {
        errors::print_error(e.as_ref());
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
