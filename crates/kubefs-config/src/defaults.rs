use std::time::Duration;

use crate::types::{HumanDuration, KubeFsConfig};

pub(crate) const DEFAULT_MOUNTPOINT: &str = "./cluster";
pub(crate) const DEFAULT_VOLUME_NAME: &str = "Kubernetes";
pub(crate) const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub(crate) const DEFAULT_ATTR_TTL: Duration = Duration::from_secs(1);

impl KubeFsConfig {
    /// Apply default inference rules to the configuration.
    /// This mutates the config in place.
    pub fn apply_defaults(&mut self) {
        if self.mountpoint.is_none() {
            self.mountpoint = Some(DEFAULT_MOUNTPOINT.to_string());
        }

        if self.volume_name.is_none() {
            self.volume_name = Some(DEFAULT_VOLUME_NAME.to_string());
        }

        // A blank context means "use current-context", same as leaving it out
        if self.context.as_deref().is_some_and(|c| c.trim().is_empty()) {
            self.context = None;
        }

        if self.views.is_none() {
            self.views = Some(true);
        }

        if self.request_timeout.is_none() {
            self.request_timeout = Some(HumanDuration(DEFAULT_REQUEST_TIMEOUT));
        }

        if self.attr_ttl.is_none() {
            self.attr_ttl = Some(HumanDuration(DEFAULT_ATTR_TTL));
        }

        if self.log_level.is_none() {
            self.log_level = Some(Default::default());
        }
    }

    /// Returns a new config with all defaults applied.
    pub fn effective(&self) -> KubeFsConfig {
        let mut config = self.clone();
        config.apply_defaults();
        config
    }
}
