//! Per-metric deviation scoring
//!
//! A metric scores `(1 - rel_median) * (1 - rel_mad)`, where each term is
//! the relative deviation `|a - b| / max(|a|, |b|)` between the two
//! captures. Deviations above 1 push the score negative; it is not floored.

use crate::config::ProximityConfig;
use crate::models::{MetricSummary, Stats};
use serde::Serialize;

/// Score for one metric key, with any threshold violations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricScore {
    pub key: String,
    /// 1.0 is a perfect match; may go negative for wildly divergent values
    pub score: f64,
    /// Newline-terminated violation lines, empty when within threshold
    pub message: String,
}

impl MetricScore {
    fn perfect(key: &str) -> Self {
        Self {
            key: key.to_string(),
            score: 1.0,
            message: String::new(),
        }
    }

    /// Whether any threshold violation was recorded
    pub fn is_flagged(&self) -> bool {
        !self.message.is_empty()
    }
}

/// Relative deviation of `a` and `b`, or `None` when both are zero
fn relative_deviation(a: f64, b: f64) -> Option<f64> {
    let max = a.abs().max(b.abs());
    if max == 0.0 {
        None
    } else {
        Some((a - b).abs() / max)
    }
}

/// Score two summaries of the same metric against the configured threshold.
///
/// Equal medians short-circuit to a perfect score without looking at the
/// MAD. All-zero medians or MADs also score perfect.
pub fn compare_summaries(
    key: &str,
    a: &MetricSummary,
    b: &MetricSummary,
    config: &ProximityConfig,
) -> MetricScore {
    if a.median == b.median {
        return MetricScore::perfect(key);
    }

    let (Some(rel_mad), Some(rel_median)) = (
        relative_deviation(a.mad, b.mad),
        relative_deviation(a.median, b.median),
    ) else {
        return MetricScore::perfect(key);
    };

    let threshold = config.threshold();
    let percent = config.threshold_percent();
    let mut message = String::new();
    if rel_mad > threshold {
        message.push_str(&format!(
            "metric '{}' not proximal: deviations ({}, {}) are not within threshold ({}%)\n",
            key, a.mad, b.mad, percent
        ));
    }
    if rel_median > threshold {
        message.push_str(&format!(
            "metric '{}' not proximal: medians ({}, {}) are not within threshold ({}%)\n",
            key, a.median, b.median, percent
        ));
    }

    MetricScore {
        key: key.to_string(),
        score: (1.0 - rel_median) * (1.0 - rel_mad),
        message,
    }
}

/// Score `key` across two captures; `None` if either side lacks it
pub fn compare_metric(
    a: &Stats,
    b: &Stats,
    key: &str,
    config: &ProximityConfig,
) -> Option<MetricScore> {
    let am = a.get(key)?;
    let bm = b.get(key)?;
    Some(compare_summaries(key, am, bm, config))
}
