use crate::types::KubeFsConfig;
use crate::ConfigError;

impl KubeFsConfig {
    /// Validate the configuration and return a list of errors.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if let Some(mountpoint) = &self.mountpoint {
            if mountpoint.trim().is_empty() {
                errors.push(ConfigError::InvalidMountpoint(
                    mountpoint.clone(),
                    "mountpoint must not be empty".to_string(),
                ));
            }
        }

        // fsname ends up inside a comma-separated FUSE option string
        if let Some(volume) = &self.volume_name {
            if volume.trim().is_empty() {
                errors.push(ConfigError::InvalidConfig(
                    "volume_name must not be empty".to_string(),
                ));
            } else if volume.contains(',') {
                errors.push(ConfigError::InvalidConfig(format!(
                    "volume_name '{}' must not contain ','",
                    volume
                )));
            }
        }

        if let Some(kubeconfig) = &self.kubeconfig {
            if kubeconfig.trim().is_empty() {
                errors.push(ConfigError::InvalidConfig(
                    "kubeconfig must not be empty when set".to_string(),
                ));
            }
        }

        if let Some(timeout) = &self.request_timeout {
            if timeout.as_duration().is_zero() {
                errors.push(ConfigError::InvalidConfig(
                    "request_timeout must be greater than zero".to_string(),
                ));
            }
        }

        errors
    }

    /// Validate and return Ok(()) if valid, or Err with the first error.
    pub fn validate_or_err(&self) -> Result<(), ConfigError> {
        match self.validate().into_iter().next() {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HumanDuration;

    #[test]
    fn test_default_config_is_valid() {
        assert!(KubeFsConfig::default().validate().is_empty());
        assert!(KubeFsConfig::default().effective().validate().is_empty());
    }

    #[test]
    fn test_empty_mountpoint() {
        let config = KubeFsConfig {
            mountpoint: Some("".to_string()),
            ..Default::default()
        };
        let errors = config.validate();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidMountpoint(_, _))));
    }

    #[test]
    fn test_volume_name_with_comma() {
        let config = KubeFsConfig {
            volume_name: Some("a,b".to_string()),
            ..Default::default()
        };
        assert!(config.validate_or_err().is_err());
    }

    #[test]
    fn test_zero_timeout() {
        let config = KubeFsConfig {
            request_timeout: Some(HumanDuration::default()),
            ..Default::default()
        };
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("request_timeout"));
    }

    #[test]
    fn test_multiple_errors_collected() {
        let config = KubeFsConfig {
            mountpoint: Some(" ".to_string()),
            kubeconfig: Some("".to_string()),
            request_timeout: Some(HumanDuration::default()),
            ..Default::default()
        };
        assert_eq!(config.validate().len(), 3);
    }
}
