//! Service configuration
//!
//! Loaded from a YAML file. The output directory and the scheduling interval
//! are required; retry and provider settings fall back to defaults.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::fetcher::RetryPolicy;
use crate::provider::{JsonFileProvider, SimulatedPowerService, TradeProvider};

/// Upstream provider selection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Random trades with intermittent failures
    Simulated {
        #[serde(default = "default_trade_count")]
        trade_count: usize,
        #[serde(default = "default_failure_rate")]
        failure_rate: f64,
        #[serde(default = "default_max_volume")]
        max_volume: f64,
    },
    /// Replay trades from a JSON file
    JsonFile { path: PathBuf },
}

fn default_trade_count() -> usize {
    2
}

fn default_failure_rate() -> f64 {
    0.1
}

fn default_max_volume() -> f64 {
    200.0
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::Simulated {
            trade_count: default_trade_count(),
            failure_rate: default_failure_rate(),
            max_volume: default_max_volume(),
        }
    }
}

impl ProviderConfig {
    pub fn build(&self) -> Arc<dyn TradeProvider> {
        match self {
            ProviderConfig::Simulated {
                trade_count,
                failure_rate,
                max_volume,
            } => Arc::new(SimulatedPowerService::new(
                *trade_count,
                *failure_rate,
                *max_volume,
            )),
            ProviderConfig::JsonFile { path } => Arc::new(JsonFileProvider::new(path.clone())),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory receiving the CSV snapshots
    pub output_dir: PathBuf,
    /// Minutes between the end of one cycle and the start of the next
    pub interval_mins: u64,
    #[serde(default)]
    pub retry: RetryPolicy,
    #[serde(default)]
    pub provider: ProviderConfig,
}

impl Config {
    /// Load and validate configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .context(format!("Failed to read config file: {:?}", path.as_ref()))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config =
            serde_yaml::from_str(content).context("Failed to parse config YAML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval_mins == 0 {
            bail!("interval_mins must be greater than zero");
        }
        if self.retry.max_attempts == 0 {
            bail!("retry.max_attempts must be at least 1");
        }
        if self.output_dir.as_os_str().is_empty() {
            bail!("output_dir must not be empty");
        }
        if let ProviderConfig::Simulated { failure_rate, .. } = &self.provider {
            if !(0.0..=1.0).contains(failure_rate) {
                bail!("provider.failure_rate must be within 0.0..=1.0");
            }
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_mins * 60)
    }
}
