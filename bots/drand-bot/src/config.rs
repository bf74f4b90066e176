//! Bot configuration

use std::path::Path;
use std::time::Duration;

use drand_common::verify::check_pubkey;
use drand_common::DrandNetwork;
use serde::{Deserialize, Serialize};

use crate::bot::Settings;
use crate::error::ConfigError;
use crate::retry::RetryPolicy;

pub const DEFAULT_ENDPOINTS: &[&str] = &[
    "https://api.drand.sh",
    "https://api2.drand.sh",
    "https://api3.drand.sh",
];

/// Which drand chain the registry verifies against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NetworkPreset {
    #[default]
    Mainnet,
    Quicknet,
    /// Parameters given in `drand.custom`
    Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DrandConfig {
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<String>,
    #[serde(default)]
    pub network: NetworkPreset,
    #[serde(default)]
    pub custom: Option<DrandNetwork>,
}

impl Default for DrandConfig {
    fn default() -> Self {
        Self {
            endpoints: default_endpoints(),
            network: NetworkPreset::default(),
            custom: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct TimingConfig {
    pub fetch_timeout_ms: u64,
    pub submit_timeout_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: 10_000,
            submit_timeout_ms: 30_000,
            poll_interval_ms: 1_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 500,
            max_delay_ms: 10_000,
        }
    }
}

/// Relay bot configuration, read from YAML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Name the bot registers under
    pub moniker: String,
    /// Registry contract address
    pub registry: String,
    #[serde(default)]
    pub drand: DrandConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default = "default_max_gap")]
    pub max_gap: u64,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_endpoints() -> Vec<String> {
    DEFAULT_ENDPOINTS.iter().map(|e| e.to_string()).collect()
}

fn default_max_gap() -> u64 {
    10
}

fn default_concurrency() -> usize {
    4
}

impl BotConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: BotConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.moniker.trim().is_empty() {
            return Err(ConfigError::Invalid("moniker must not be empty".to_string()));
        }
        if self.registry.trim().is_empty() {
            return Err(ConfigError::Invalid("registry address must not be empty".to_string()));
        }
        if self.drand.endpoints.is_empty() {
            return Err(ConfigError::Invalid("at least one drand endpoint is required".to_string()));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid("retry.max_attempts must be at least 1".to_string()));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid("concurrency must be at least 1".to_string()));
        }
        if self.timing.fetch_timeout_ms == 0 || self.timing.submit_timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeouts must be positive".to_string()));
        }
        let network = self.network()?;
        if network.period_seconds == 0 {
            return Err(ConfigError::Invalid("drand period must be positive".to_string()));
        }
        check_pubkey(&network).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// The drand network selected by `drand.network`.
    pub fn network(&self) -> Result<DrandNetwork, ConfigError> {
        match (self.drand.network, &self.drand.custom) {
            (NetworkPreset::Mainnet, None) => Ok(DrandNetwork::mainnet()),
            (NetworkPreset::Quicknet, None) => Ok(DrandNetwork::quicknet()),
            (NetworkPreset::Custom, Some(custom)) => Ok(custom.clone()),
            (NetworkPreset::Custom, None) => Err(ConfigError::Invalid(
                "drand.custom is required for a custom network".to_string(),
            )),
            (_, Some(_)) => Err(ConfigError::Invalid(
                "drand.custom is only allowed with network: custom".to_string(),
            )),
        }
    }

    pub fn settings(&self) -> Settings {
        Settings {
            fetch_timeout: Duration::from_millis(self.timing.fetch_timeout_ms),
            submit_timeout: Duration::from_millis(self.timing.submit_timeout_ms),
            retry: RetryPolicy {
                max_attempts: self.retry.max_attempts,
                base_delay: Duration::from_millis(self.retry.base_delay_ms),
                max_delay: Duration::from_millis(self.retry.max_delay_ms),
            },
            max_gap: self.max_gap,
            concurrency: self.concurrency,
            poll_interval: Duration::from_millis(self.timing.poll_interval_ms),
        }
    }
}
