use std::{collections::HashMap, fs, path::Path, time::Duration};

use anyhow::Context;
use contact_core::relay::parse_endpoint;
use tracing::warn;

pub const DEFAULT_RELAY_ENDPOINT: &str = "https://formspree.io/f/mqagrrae";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub relay_endpoint: String,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            relay_endpoint: DEFAULT_RELAY_ENDPOINT.into(),
            request_timeout_secs: 15,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Rejects settings the relay client cannot work with.
    pub fn validate(&self) -> anyhow::Result<()> {
        parse_endpoint(&self.relay_endpoint).context("relay_endpoint setting")?;
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than zero");
        }
        Ok(())
    }
}

/// Defaults, then the optional config file, then the environment.
pub fn load_settings(config_path: &Path) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(config_path) {
        if let Err(err) = apply_file_overrides(&mut settings, &raw) {
            warn!(path = %config_path.display(), "ignoring malformed config file: {err:#}");
        }
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

pub fn apply_file_overrides(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: HashMap<String, toml::Value> =
        toml::from_str(raw).context("failed to parse contact config")?;

    if let Some(v) = file_cfg.get("relay_endpoint").and_then(toml::Value::as_str) {
        settings.relay_endpoint = v.to_string();
    }
    if let Some(v) = file_cfg.get("request_timeout_secs").and_then(as_u64) {
        settings.request_timeout_secs = v;
    }
    Ok(())
}

pub fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("RELAY_ENDPOINT") {
        settings.relay_endpoint = v;
    }
    if let Some(v) = lookup("APP__RELAY_ENDPOINT") {
        settings.relay_endpoint = v;
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }
}

fn as_u64(value: &toml::Value) -> Option<u64> {
    match value {
        toml::Value::Integer(v) => u64::try_from(*v).ok(),
        toml::Value::String(v) => v.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
