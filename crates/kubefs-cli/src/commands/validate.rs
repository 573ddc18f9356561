use std::path::Path;

use kubefs_config::KubeFsConfig;

pub async fn run(
    config_path: Option<&Path>,
    config: &KubeFsConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let errors = config.validate();

    if errors.is_empty() {
        match config_path {
            Some(path) => println!("Configuration {} is valid.", path.display()),
            None => println!("No configuration file found; defaults are valid."),
        }
        Ok(())
    } else {
        eprintln!("Configuration has {} error(s):", errors.len());
        for (i, err) in errors.iter().enumerate() {
            eprintln!("  {}: {}", i + 1, err);
        }
        Err(format!("{} validation error(s) found", errors.len()).into())
    }
}
