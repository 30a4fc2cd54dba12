//! ftdc-proximity - statistical proximity of diagnostic metric captures
//!
//! Compares two precomputed summaries of time-series diagnostic metrics
//! (server telemetry snapshots) and answers whether they are close enough
//! to be treated as the same workload.
//!
//! # Example
//!
//! ```
//! use ftdc_proximity::{ProximityConfig, ProximityEngine, Stats};
//!
//! let a = Stats::new(100).with_metric("serverStatus.mem.resident", 50.0, 2.0);
//! let b = Stats::new(100).with_metric("serverStatus.mem.resident", 50.0, 2.0);
//!
//! let engine = ProximityEngine::new(ProximityConfig::default());
//! let report = engine.proximal(&a, &b);
//! assert!(report.ok);
//! assert_eq!(report.score, 1.0);
//! ```

pub mod config;
pub mod filter;
pub mod models;
pub mod proximity;

pub use config::{load_proximity_config, ConfigError, ConfigResult, ProximityConfig};
pub use filter::{is_comparable_metric, MetricFilter, COMPARABLE_METRICS};
pub use models::{MetricSummary, Stats};
pub use proximity::{
    compare_metric, compare_summaries, proximal, proximal_default, rank_weighted_mean,
    rank_weighted_sum, MetricScore, ProximityEngine, ProximityReport, BAD_SAMPLE_COUNT_PENALTY,
};
