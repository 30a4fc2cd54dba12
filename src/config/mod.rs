//! Configuration for proximity comparisons
//!
//! This module handles:
//! - The comparison threshold (default 0.2)
//! - Extra comparable metric prefixes
//! - Loading from `proximity.toml`, `.proximityrc.json` or the user config
//! - The `FTDC_PROXIMITY_THRESHOLD` environment override

mod proximity_config;

pub use proximity_config::{
    load_proximity_config,
    ConfigError,
    ConfigResult,
    ProximityConfig,
    DEFAULT_THRESHOLD,
    THRESHOLD_ENV_VAR,
};
