//! Dashboard configuration loaded from TOML.
//!
//! Every section and field is optional; an empty file (or no file) yields the
//! defaults. Values are validated after parsing and after CLI overrides.

use std::path::{Path, PathBuf};

use botdash_core::metrics::DEFAULT_ANNUALIZATION_DAYS;
use botdash_core::monte_carlo::{MonteCarloConfig, SamplingMode, DEFAULT_TRIALS, MIN_TRADES};
use botdash_core::stats::DEFAULT_TRADES_PER_DAY;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data: DataConfig,
    pub projection: ProjectionConfig,
    pub metrics: MetricsConfig,
}

/// Input file locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub snapshot: PathBuf,
    pub trades: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            snapshot: PathBuf::from("bot_data.json"),
            trades: PathBuf::from("trades.jsonl"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub horizons: Vec<u32>,
    pub trials: usize,
    pub min_trades: usize,
    /// Master seed; absent means OS entropy.
    pub seed: Option<u64>,
    pub sampling: SamplingMode,
    /// Trades per day assumed when the history has too few timestamps.
    pub default_trades_per_day: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            horizons: vec![7, 30, 90],
            trials: DEFAULT_TRIALS,
            min_trades: MIN_TRADES,
            seed: None,
            sampling: SamplingMode::default(),
            default_trades_per_day: DEFAULT_TRADES_PER_DAY,
        }
    }
}

impl ProjectionConfig {
    pub fn monte_carlo(&self) -> MonteCarloConfig {
        MonteCarloConfig {
            trials: self.trials,
            min_trades: self.min_trades,
            sampling: self.sampling,
            seed: self.seed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub annualization_days: f64,
    /// Rolling windows, in days, reported next to all-time statistics.
    pub periods: Vec<u32>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            annualization_days: DEFAULT_ANNUALIZATION_DAYS,
            periods: vec![7, 30],
        }
    }
}

impl DashboardConfig {
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.projection;
        if p.horizons.is_empty() {
            return Err(ConfigError::Invalid(
                "projection.horizons must not be empty".into(),
            ));
        }
        if let Some(h) = p.horizons.iter().find(|&&h| h == 0) {
            return Err(ConfigError::Invalid(format!(
                "projection.horizons must be positive, got {h}"
            )));
        }
        if p.trials == 0 {
            return Err(ConfigError::Invalid("projection.trials must be > 0".into()));
        }
        if p.min_trades == 0 {
            return Err(ConfigError::Invalid(
                "projection.min_trades must be >= 1".into(),
            ));
        }
        if !(p.default_trades_per_day.is_finite() && p.default_trades_per_day > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "projection.default_trades_per_day must be a positive number, got {}",
                p.default_trades_per_day
            )));
        }
        let m = &self.metrics;
        if !(m.annualization_days.is_finite() && m.annualization_days > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "metrics.annualization_days must be positive, got {}",
                m.annualization_days
            )));
        }
        Ok(())
    }
}
