use kubefs_config::KubeFsConfig;

pub async fn run(config: &KubeFsConfig) -> Result<(), Box<dyn std::error::Error>> {
    let effective = config.effective();

    // Print as YAML for readability
    let yaml = effective.to_yaml()?;
    println!("{}", yaml);

    Ok(())
}
