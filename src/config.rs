//! Application configuration
//!
//! Loaded from YAML by the CLI; every field has a default so partial files
//! are accepted.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_CHAIN_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub chain: ChainConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level used when `--log-level` is not given
    pub level: String,
    /// Emit JSON lines instead of human-readable logs
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Deadline for a whole chain; 0 disables it
    pub timeout_ms: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_CHAIN_TIMEOUT_MS,
        }
    }
}

impl ChainConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config: Config = serde_yaml::from_str("chain:\n  timeout_ms: 500\n").unwrap();
        assert_eq!(config.logging, LoggingConfig::default());
        assert_eq!(config.chain.timeout(), Some(Duration::from_millis(500)));
    }

    #[test]
    fn zero_timeout_disables_deadline() {
        let config: Config =
            serde_yaml::from_str("logging:\n  level: debug\n  json: true\nchain:\n  timeout_ms: 0\n")
                .unwrap();
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
        assert_eq!(config.chain.timeout(), None);
    }

    #[test]
    fn empty_document_is_default() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(
            config.chain.timeout(),
            Some(Duration::from_millis(DEFAULT_CHAIN_TIMEOUT_MS))
        );
    }
}
