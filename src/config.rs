use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

const ENV_FILE: &str = ".env";
const BASE_URL_ENV: &str = "FEEDER_BASE_URL";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub feeder: FeederConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DeviceConfig {
    #[serde(default = "default_device_name")]
    pub name: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_ms: u64,
    #[serde(default = "default_feed_timeout")]
    pub feed_timeout_ms: u64,
}

fn default_device_name() -> String { "ESP-32".to_string() }
fn default_base_url() -> String { "http://192.168.4.1/feed".to_string() }
fn default_probe_timeout() -> u64 { 2000 }
fn default_feed_timeout() -> u64 { 5000 }

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: default_device_name(),
            base_url: default_base_url(),
            probe_timeout_ms: default_probe_timeout(),
            feed_timeout_ms: default_feed_timeout(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeederConfig {
    /// Grams shown in the "remaining feed" card at startup.
    #[serde(default = "default_initial_remaining")]
    pub initial_remaining_g: u32,
    /// Grams subtracted after each successful feed.
    #[serde(default = "default_feed_portion")]
    pub feed_portion_g: u32,
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

fn default_initial_remaining() -> u32 { 1200 }
fn default_feed_portion() -> u32 { 50 }
fn default_history_capacity() -> usize { 200 }

impl Default for FeederConfig {
    fn default() -> Self {
        Self {
            initial_remaining_g: default_initial_remaining(),
            feed_portion_g: default_feed_portion(),
            history_capacity: default_history_capacity(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .with_context(|| "Failed to parse config TOML")?;
        Ok(config)
    }

    /// Load the config file if present, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load .env file into process environment. Real env vars take precedence.
    pub fn load_env_file() {
        let content = match std::fs::read_to_string(Path::new(ENV_FILE)) {
            Ok(c) => c,
            Err(_) => return,
        };
        for (key, value) in parse_env_lines(&content) {
            if std::env::var(&key).is_err() {
                std::env::set_var(key, value);
            }
        }
    }

    /// Apply environment overrides on top of the file values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            let url = sanitize_value(&url);
            if !url.is_empty() {
                self.device.base_url = url;
            }
        }
    }
}

/// Parse KEY=VALUE lines, skipping blanks and comments.
fn parse_env_lines(content: &str) -> Vec<(String, String)> {
    // Strip BOM if present (common on Windows-created files)
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    content
        .lines()
        .filter_map(|line| {
            let line = line.trim().trim_matches('\r');
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            let (key, value) = line.split_once('=')?;
            let value = value.trim().trim_matches('"').trim_matches('\'');
            Some((key.trim().to_string(), value.to_string()))
        })
        .collect()
}

/// Strip carriage returns, BOM, and other invisible chars from a value.
fn sanitize_value(raw: &str) -> String {
    raw.replace(['\r', '\u{feff}', '\u{200b}'], "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parses() {
        let config = Config::load(Path::new("config.toml")).unwrap();
        assert_eq!(config.device.base_url, "http://192.168.4.1/feed");
        assert_eq!(config.device.probe_timeout_ms, 2000);
        assert_eq!(config.device.feed_timeout_ms, 5000);
        assert_eq!(config.feeder.feed_portion_g, 50);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::parse("[device]\nbase_url = \"http://10.0.0.7/feed\"\n").unwrap();
        assert_eq!(config.device.base_url, "http://10.0.0.7/feed");
        assert_eq!(config.device.name, "ESP-32");
        assert_eq!(config.feeder.initial_remaining_g, 1200);
        assert_eq!(config.feeder.history_capacity, 200);
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.device.probe_timeout_ms, 2000);
        assert_eq!(config.feeder.feed_portion_g, 50);
    }

    #[test]
    fn test_bad_toml_is_error() {
        assert!(Config::parse("[device\nbase_url = 1").is_err());
    }

    #[test]
    fn test_env_override_wins() {
        let mut config = Config::default();
        std::env::set_var(BASE_URL_ENV, " http://feeder.local/feed\r");
        config.apply_env_overrides();
        std::env::remove_var(BASE_URL_ENV);
        assert_eq!(config.device.base_url, "http://feeder.local/feed");
    }

    #[test]
    fn test_parse_env_lines() {
        let parsed = parse_env_lines("\u{feff}# comment\n\nFEEDER_BASE_URL=\"http://a/feed\"\nBROKEN\nX = 'y'\r\n");
        assert_eq!(
            parsed,
            vec![
                ("FEEDER_BASE_URL".to_string(), "http://a/feed".to_string()),
                ("X".to_string(), "y".to_string()),
            ]
        );
    }
}
