use std::env;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::ConfigError;

fn env_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env interpolation pattern is valid")
    })
}

/// Interpolate environment variables in a string.
///
/// `${VAR}` is replaced by the value of `VAR`; `${VAR:-fallback}` uses
/// `fallback` when `VAR` is unset. Every unset variable without a fallback is
/// reported at once.
pub fn interpolate_env(input: &str) -> Result<String, ConfigError> {
    let mut missing = Vec::new();

    let output = env_pattern().replace_all(input, |caps: &Captures<'_>| {
        let name = &caps[1];
        match (env::var(name), caps.get(2)) {
            (Ok(value), _) => value,
            (Err(_), Some(fallback)) => fallback.as_str().to_string(),
            (Err(_), None) => {
                if !missing.iter().any(|m| m == name) {
                    missing.push(name.to_string());
                }
                String::new()
            }
        }
    });

    if !missing.is_empty() {
        return Err(ConfigError::MissingEnvVars(missing));
    }

    Ok(output.into_owned())
}
