use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

use crate::classifier::DualQueryStrategy;
use crate::trend::{TrendMetric, DEFAULT_ANOMALY_THRESHOLD, DEFAULT_FORECAST_PERIODS};

pub const CONFIG_FILE_NAME: &str = ".fpa.toml";

/// Top-level configuration from `.fpa.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub estimate: EstimateConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub trend: TrendConfig,
    #[serde(default)]
    pub check: CheckConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateConfig {
    /// Hours of effort per adjusted function point.
    #[serde(default = "default_productivity_factor")]
    pub productivity_factor: f64,
}

fn default_productivity_factor() -> f64 {
    8.0
}

impl Default for EstimateConfig {
    fn default() -> Self {
        Self {
            productivity_factor: default_productivity_factor(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub dual_query_strategy: DualQueryStrategy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendConfig {
    #[serde(default = "default_forecast_periods")]
    pub forecast_periods: u32,
    #[serde(default = "default_anomaly_threshold")]
    pub anomaly_threshold: f64,
    #[serde(default)]
    pub metric: TrendMetric,
}

fn default_forecast_periods() -> u32 {
    DEFAULT_FORECAST_PERIODS
}

fn default_anomaly_threshold() -> f64 {
    DEFAULT_ANOMALY_THRESHOLD
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            forecast_periods: default_forecast_periods(),
            anomaly_threshold: default_anomaly_threshold(),
            metric: TrendMetric::default(),
        }
    }
}

/// Budget gates for `fpa check`. Unset gates always pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckConfig {
    #[serde(default)]
    pub max_adjusted_fp: Option<f64>,
    #[serde(default)]
    pub max_effort_hours: Option<f64>,
}

impl Config {
    /// Load configuration from a `.fpa.toml` file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        let config: Config = toml::from_str(&content).with_context(|| {
            format!(
                "failed to parse '{}'. Run `fpa init` to create a valid config file",
                path.display()
            )
        })?;
        Ok(config)
    }

    /// Load from `.fpa.toml` in the given directory or any ancestor, or return defaults.
    pub fn load_or_default(dir: &Path) -> Self {
        let start = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
        let mut current = start.as_path();
        loop {
            let config_path = current.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => config,
                    Err(e) => {
                        warn!(
                            path = %config_path.display(),
                            "failed to load config: {e:#}. Using defaults."
                        );
                        Self::default()
                    }
                };
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }
        Self::default()
    }

    /// Generate default TOML content for `fpa init`.
    pub fn default_toml() -> String {
        r#"# FPA - Function Point Estimation Configuration

[estimate]
# Hours of effort per adjusted function point
productivity_factor = 8.0

[classifier]
# How external queries described from both input and output side are rated:
#   "higher-side" - rate each side separately, keep the heavier result
#   "reject"      - refuse dual-perspective queries
dual_query_strategy = "higher-side"

[trend]
# Metric followed by `fpa trend`: "unadjusted-fp", "adjusted-fp",
# "effort-hours" or "value-adjustment-factor"
metric = "adjusted-fp"
forecast_periods = 1
# Z-score above which a historical estimate is reported as an anomaly
anomaly_threshold = 2.0

[check]
# Budgets enforced by `fpa check`
# max_adjusted_fp = 500.0
# max_effort_hours = 4000.0
"#
        .to_string()
    }
}
