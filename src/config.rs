//! Layered configuration: defaults, then a `key = value` file, then
//! environment overrides. Command-line flags are applied by the binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::capture::{CaptureOptions, DEFAULT_READ_TIMEOUT, DEFAULT_SNAPLEN};
use crate::error::ConfigError;

const DEFAULT_CONFIG_PATH: &str = "/etc/rawsniff.conf";
const DEFAULT_LOG_LEVEL: &str = "info";

const MIN_SNAPLEN: usize = 64;
const MAX_SNAPLEN: usize = 65535;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Capture interface; `None` picks the first suitable one.
    pub interface: Option<String>,
    pub snaplen: usize,
    pub read_timeout: Duration,
    pub promiscuous: bool,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interface: None,
            snaplen: DEFAULT_SNAPLEN,
            read_timeout: DEFAULT_READ_TIMEOUT,
            promiscuous: true,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from `RAWSNIFF_CONFIG` /
    /// `/etc/rawsniff.conf`. A missing file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => std::env::var("RAWSNIFF_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH)),
        };

        let mut config = Config::default();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            config.apply_file(&content)?;
        }

        config.apply_env(|name| std::env::var(name).ok())?;

        Ok(config)
    }

    /// Apply `key = value` lines. Blank lines and `#` comments are skipped,
    /// as are unknown keys.
    pub fn apply_file(&mut self, content: &str) -> Result<(), ConfigError> {
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                self.set(key.trim(), value.trim())?;
            }
        }
        Ok(())
    }

    /// Apply `RAWSNIFF_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        const OVERRIDES: [(&str, &str); 5] = [
            ("RAWSNIFF_INTERFACE", "interface"),
            ("RAWSNIFF_SNAPLEN", "snaplen"),
            ("RAWSNIFF_READ_TIMEOUT_MS", "read_timeout_ms"),
            ("RAWSNIFF_PROMISCUOUS", "promiscuous"),
            ("RAWSNIFF_LOG", "log_level"),
        ];

        for (var, key) in OVERRIDES {
            if let Some(value) = lookup(var) {
                self.set(key, value.trim())?;
            }
        }
        Ok(())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "interface" => {
                self.interface = (!value.is_empty()).then(|| value.to_string());
            }
            "snaplen" => {
                self.snaplen = value
                    .parse()
                    .ok()
                    .filter(|n| (MIN_SNAPLEN..=MAX_SNAPLEN).contains(n))
                    .ok_or_else(|| ConfigError::invalid(key, value))?;
            }
            "read_timeout_ms" => {
                // Zero would make every capture read return at once.
                let ms: u64 = value
                    .parse()
                    .ok()
                    .filter(|&ms| ms > 0)
                    .ok_or_else(|| ConfigError::invalid(key, value))?;
                self.read_timeout = Duration::from_millis(ms);
            }
            "promiscuous" => {
                self.promiscuous =
                    parse_bool(value).ok_or_else(|| ConfigError::invalid(key, value))?;
            }
            "log_level" => self.log_level = value.to_string(),
            _ => tracing::debug!("Ignoring unknown config key {}", key),
        }
        Ok(())
    }

    pub fn capture_options(&self) -> CaptureOptions {
        CaptureOptions {
            snaplen: self.snaplen,
            read_timeout: self.read_timeout,
            promiscuous: self.promiscuous,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}
