mod defaults;
mod env;
pub mod types;
mod validation;

use std::path::Path;

pub use env::interpolate_env;
pub use types::*;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Missing environment variables: {0:?}")]
    MissingEnvVars(Vec<String>),

    #[error("Invalid mountpoint '{0}': {1}")]
    InvalidMountpoint(String, String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl KubeFsConfig {
    /// Parse a configuration from a YAML string.
    /// Environment variables in the format `${VAR_NAME}` will be interpolated.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let interpolated = env::interpolate_env(yaml)?;

        // An empty or comment-only file is a valid, all-defaults config
        if interpolated.lines().all(|l| {
            let l = l.trim();
            l.is_empty() || l.starts_with('#')
        }) {
            return Ok(KubeFsConfig::default());
        }

        let config: KubeFsConfig = serde_yaml::from_str(&interpolated)?;
        Ok(config)
    }

    /// Load a configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Serialize back to YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn test_parse_minimal_config() {
        let yaml = r#"
mountpoint: /mnt/cluster
"#;

        let config = KubeFsConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.mountpoint, Some("/mnt/cluster".to_string()));
        assert_eq!(config.volume_name, None);
        assert!(!config.allow_other);
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
mountpoint: ./k8s
volume_name: Staging
kubeconfig: /etc/kube/admin.conf
context: staging
views: false
request_timeout: 10s
attr_ttl: 500ms
allow_other: true
log_level: debug
"#;

        let config = KubeFsConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.volume_name(), "Staging");
        assert_eq!(config.kubeconfig.as_deref(), Some("/etc/kube/admin.conf"));
        assert_eq!(config.context.as_deref(), Some("staging"));
        assert!(!config.views_enabled());
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.attr_ttl(), Duration::from_millis(500));
        assert!(config.allow_other);
        assert_eq!(config.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_parse_with_env_vars() {
        std::env::set_var("KUBEFS_TEST_KUBECONFIG", "/tmp/kubeconfig");

        let yaml = r#"
kubeconfig: ${KUBEFS_TEST_KUBECONFIG}
"#;

        let config = KubeFsConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.kubeconfig.as_deref(), Some("/tmp/kubeconfig"));
    }

    #[test]
    fn test_empty_file_is_default() {
        let config = KubeFsConfig::from_yaml("# nothing here\n\n").unwrap();
        assert_eq!(config, KubeFsConfig::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = KubeFsConfig::from_yaml("mount_point: /x\n");
        assert!(matches!(result, Err(ConfigError::YamlError(_))));
    }

    #[test]
    fn test_bad_duration_rejected() {
        let result = KubeFsConfig::from_yaml("request_timeout: forever\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file_and_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "mountpoint: /mnt/a\nrequest_timeout: 2m").unwrap();

        let config = KubeFsConfig::from_file(file.path()).unwrap();
        assert_eq!(config.request_timeout(), Duration::from_secs(120));

        let yaml = config.effective().to_yaml().unwrap();
        let reparsed = KubeFsConfig::from_yaml(&yaml).unwrap();
        assert_eq!(reparsed, config.effective());
    }

    #[test]
    fn test_from_file_missing() {
        let result = KubeFsConfig::from_file(Path::new("/definitely/not/here.yaml"));
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }
}
