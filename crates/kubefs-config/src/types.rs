use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Verbosity for the process-wide log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive string understood by `tracing` filters.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-readable duration (e.g., "200ms", "30s", "5m").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HumanDuration(pub Duration);

impl HumanDuration {
    pub fn as_duration(&self) -> Duration {
        self.0
    }

    pub fn from_secs(secs: u64) -> Self {
        HumanDuration(Duration::from_secs(secs))
    }
}

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();

        let (num_str, unit) = if let Some(n) = s.strip_suffix("ms") {
            (n, "ms")
        } else if let Some(n) = s.strip_suffix('s') {
            (n, "s")
        } else if let Some(n) = s.strip_suffix('m') {
            (n, "m")
        } else if let Some(n) = s.strip_suffix('h') {
            (n, "h")
        } else {
            return Err(format!("Invalid duration format: {}", s));
        };

        let num: u64 = num_str
            .trim()
            .parse()
            .map_err(|_| format!("Invalid number in duration: {}", s))?;

        let secs = match unit {
            "ms" => return Ok(HumanDuration(Duration::from_millis(num))),
            "s" => Some(num),
            "m" => num.checked_mul(60),
            _ => num.checked_mul(3600),
        };

        secs.map(|secs| HumanDuration(Duration::from_secs(secs)))
            .ok_or_else(|| format!("Invalid number in duration: {}", s))
    }
}

impl fmt::Display for HumanDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let millis = self.0.as_millis();
        let secs = self.0.as_secs();

        if millis % 1000 != 0 || millis == 0 {
            write!(f, "{}ms", millis)
        } else if secs % 3600 == 0 {
            write!(f, "{}h", secs / 3600)
        } else if secs % 60 == 0 {
            write!(f, "{}m", secs / 60)
        } else {
            write!(f, "{}s", secs)
        }
    }
}

impl Serialize for HumanDuration {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for HumanDuration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        HumanDuration::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Top-level kubefs configuration (`kubefs.yaml`).
///
/// Every field is optional in the file; [`KubeFsConfig::effective`] fills in
/// the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct KubeFsConfig {
    /// Directory the filesystem is mounted on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mountpoint: Option<String>,

    /// FUSE fsname and volume label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_name: Option<String>,

    /// Path to the kubeconfig file. Falls back to `KUBECONFIG` and then
    /// `~/.kube/config` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubeconfig: Option<String>,

    /// Kubeconfig context to use instead of `current-context`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Expose a top-level views directory (`/by-gvk/...`) instead of putting
    /// the API groups directly at the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<bool>,

    /// Deadline applied to every filesystem operation that talks to the cluster.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<HumanDuration>,

    /// How long the kernel may cache attributes and entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attr_ttl: Option<HumanDuration>,

    /// Let users other than the mounting user access the mount.
    #[serde(default)]
    pub allow_other: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<LogLevel>,
}

impl KubeFsConfig {
    pub fn mountpoint(&self) -> &str {
        self.mountpoint.as_deref().unwrap_or(crate::defaults::DEFAULT_MOUNTPOINT)
    }

    pub fn volume_name(&self) -> &str {
        self.volume_name
            .as_deref()
            .unwrap_or(crate::defaults::DEFAULT_VOLUME_NAME)
    }

    pub fn views_enabled(&self) -> bool {
        self.views.unwrap_or(true)
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
            .map(|d| d.as_duration())
            .unwrap_or(crate::defaults::DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn attr_ttl(&self) -> Duration {
        self.attr_ttl
            .map(|d| d.as_duration())
            .unwrap_or(crate::defaults::DEFAULT_ATTR_TTL)
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level.unwrap_or_default()
    }
}
