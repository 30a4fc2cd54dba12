//! Proximity configuration support
//!
//! Loads the comparison settings from `proximity.toml` or
//! `.proximityrc.json` in a capture directory, falling back to the user
//! config at `~/.config/ftdc-proximity/config.toml`.
//!
//! # Configuration Format
//!
//! ```toml
//! # proximity.toml
//!
//! # Maximum tolerated relative deviation, strictly between 0 and 1
//! threshold = 0.25
//!
//! # Extra metric subtrees to compare, on top of the built-in list
//! extra_metrics = ["serverStatus.network", "serverStatus.connections"]
//! ```
//!
//! `FTDC_PROXIMITY_THRESHOLD` overrides `threshold` from any file.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Threshold used when nothing else is configured
pub const DEFAULT_THRESHOLD: f64 = 0.2;

/// Environment variable overriding the configured threshold
pub const THRESHOLD_ENV_VAR: &str = "FTDC_PROXIMITY_THRESHOLD";

/// Errors from building or loading a [`ProximityConfig`]
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("threshold {0} is out of range: must be strictly between 0 and 1")]
    ThresholdOutOfRange(f64),

    #[error("invalid value for {var}: '{value}'")]
    InvalidEnv { var: String, value: String },

    #[error("failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings for one comparison engine.
///
/// Fields are private so every instance, including deserialized ones,
/// holds a threshold in (0, 1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ConfigFile")]
pub struct ProximityConfig {
    /// Maximum tolerated relative deviation before a metric, the sample
    /// count, or the aggregate is flagged as not proximal
    threshold: f64,

    /// Comparable prefixes added to the built-in allow-list
    extra_metrics: Vec<String>,
}

/// Unvalidated on-disk shape of [`ProximityConfig`]
#[derive(Debug, Deserialize)]
#[serde(default)]
struct ConfigFile {
    threshold: f64,
    extra_metrics: Vec<String>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            extra_metrics: Vec::new(),
        }
    }
}

impl TryFrom<ConfigFile> for ProximityConfig {
    type Error = ConfigError;

    fn try_from(file: ConfigFile) -> ConfigResult<Self> {
        let config = Self {
            threshold: file.threshold,
            extra_metrics: file.extra_metrics,
        };
        config.validate()?;
        Ok(config)
    }
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            extra_metrics: Vec::new(),
        }
    }
}

impl ProximityConfig {
    /// Config with a validated threshold and no extra metrics
    pub fn new(threshold: f64) -> ConfigResult<Self> {
        let config = Self {
            threshold,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Prefixes added to the built-in allow-list
    pub fn extra_metrics(&self) -> &[String] {
        &self.extra_metrics
    }

    /// Builder-style extra prefixes
    pub fn with_extra_metrics<I, S>(mut self, metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_metrics.extend(metrics.into_iter().map(Into::into));
        self
    }

    /// Threshold must lie in (0, 1). NaN is rejected.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.threshold > 0.0 && self.threshold < 1.0 {
            Ok(())
        } else {
            Err(ConfigError::ThresholdOutOfRange(self.threshold))
        }
    }

    /// Threshold as the whole percentage shown in report messages.
    ///
    /// Rounds to nearest rather than truncating, so 0.29 prints as 29
    /// instead of the 28 that `0.29 * 100.0` truncates to.
    pub fn threshold_percent(&self) -> i64 {
        (self.threshold * 100.0).round() as i64
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        Self::try_from(file)
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        let file: ConfigFile = serde_json::from_str(content)?;
        Self::try_from(file)
    }

    /// Apply a raw threshold override (the env var value, if set).
    /// On error the config is left untouched.
    pub fn apply_threshold_override(&mut self, value: Option<&str>) -> ConfigResult<()> {
        let Some(raw) = value else {
            return Ok(());
        };
        let threshold: f64 = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
            var: THRESHOLD_ENV_VAR.to_string(),
            value: raw.to_string(),
        })?;
        let previous = self.threshold;
        self.threshold = threshold;
        if let Err(e) = self.validate() {
            self.threshold = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Get the user config file path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ftdc-proximity").join("config.toml"))
    }
}

/// Load configuration for captures stored in `dir`.
///
/// Priority:
/// 1. `FTDC_PROXIMITY_THRESHOLD` (threshold only)
/// 2. `proximity.toml`, then `.proximityrc.json` in `dir`
/// 3. User config (`~/.config/ftdc-proximity/config.toml`)
/// 4. Defaults
pub fn load_proximity_config(dir: &Path) -> ProximityConfig {
    let mut config = load_dir_config(dir)
        .or_else(load_user_config)
        .unwrap_or_else(|| {
            debug!("No proximity config found, using defaults");
            ProximityConfig::default()
        });

    let env_value = std::env::var(THRESHOLD_ENV_VAR).ok();
    if let Err(e) = config.apply_threshold_override(env_value.as_deref()) {
        warn!("Ignoring {}: {}", THRESHOLD_ENV_VAR, e);
    }

    config
}

fn load_dir_config(dir: &Path) -> Option<ProximityConfig> {
    let toml_path = dir.join("proximity.toml");
    if toml_path.exists() {
        match load_toml_config(&toml_path) {
            Ok(config) => {
                debug!("Loaded proximity config from {}", toml_path.display());
                return Some(config);
            }
            Err(e) => {
                warn!("Failed to load {}: {:#}", toml_path.display(), e);
            }
        }
    }

    let json_path = dir.join(".proximityrc.json");
    if json_path.exists() {
        match load_json_config(&json_path) {
            Ok(config) => {
                debug!("Loaded proximity config from {}", json_path.display());
                return Some(config);
            }
            Err(e) => {
                warn!("Failed to load {}: {:#}", json_path.display(), e);
            }
        }
    }

    None
}

fn load_user_config() -> Option<ProximityConfig> {
    let path = ProximityConfig::user_config_path().filter(|p| p.exists())?;
    match load_toml_config(&path) {
        Ok(config) => {
            debug!("Loaded user proximity config from {}", path.display());
            Some(config)
        }
        Err(e) => {
            warn!("Failed to load {}: {:#}", path.display(), e);
            None
        }
    }
}

/// Load configuration from a TOML file
fn load_toml_config(path: &Path) -> anyhow::Result<ProximityConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(ProximityConfig::from_toml_str(&content)?)
}

/// Load configuration from a JSON file
fn load_json_config(path: &Path) -> anyhow::Result<ProximityConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(ProximityConfig::from_json_str(&content)?)
}
