use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::classifier::{RiskThresholds, RiskTier};
use crate::cohort::RiskConfig;

/// Runtime configuration, merged from an optional file and `WELLNESS_RISK_*` variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskSettings {
    pub thresholds: RiskThresholds,
    pub alert_tier: RiskTier,
    /// Directory holding `evaluations.txt` / `evaluations.json`.
    pub data_dir: Option<PathBuf>,
}

impl Default for RiskSettings {
    fn default() -> Self {
        let config = RiskConfig::default();
        Self {
            thresholds: config.thresholds,
            alert_tier: config.alert_tier,
            data_dir: None,
        }
    }
}

impl RiskSettings {
    pub const ENV_PREFIX: &'static str = "WELLNESS_RISK";

    /// Load settings, layering environment variables over the optional config file.
    ///
    /// * `WELLNESS_RISK_ALERT_TIER`        — `BAJO`, `MEDIO` or `ALTO` (default `ALTO`).
    /// * `WELLNESS_RISK_DATA_DIR`          — evaluation pack directory.
    /// * `WELLNESS_RISK_THRESHOLDS__MEDIUM` / `WELLNESS_RISK_THRESHOLDS__HIGH`.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(Self::ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        );
        let settings: Self = builder
            .build()
            .context("failed to assemble configuration sources")?
            .try_deserialize()
            .context("invalid wellness-risk configuration")?;
        settings
            .thresholds
            .validate()
            .context("invalid risk thresholds in configuration")?;
        Ok(settings)
    }

    pub fn risk_config(&self) -> RiskConfig {
        RiskConfig {
            thresholds: self.thresholds,
            alert_tier: self.alert_tier,
        }
    }
}
