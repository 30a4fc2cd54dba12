//! Aggregate proximity of two captures
//!
//! Scores every comparable metric the two captures share, then folds the
//! scores worst-first with weights 1/2, 1/4, 1/8, ... so the worst metric
//! dominates. The weighted mean (plus the sample-count penalty, if any) is
//! square-rooted into the final score.

use crate::config::ProximityConfig;
use crate::filter::MetricFilter;
use crate::models::Stats;
use crate::proximity::comparator::{compare_summaries, MetricScore};
use serde::Serialize;
use tracing::{debug, trace};

/// Starting accumulator when the sample counts are not proximal
pub const BAD_SAMPLE_COUNT_PENALTY: f64 = -0.1;

/// Outcome of one comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProximityReport {
    /// Violation lines: sample count first, then metrics worst-first
    pub message: String,
    /// 1.0 is a perfect match; 0.0 when penalties dominate
    pub score: f64,
    /// `score >= 1 - threshold`
    pub ok: bool,
    /// Threshold the comparison ran with
    pub threshold: f64,
    pub sample_count_proximal: bool,
    /// Per-metric scores, sorted worst first
    pub metrics: Vec<MetricScore>,
}

impl ProximityReport {
    /// The `(message, score, ok)` triple
    pub fn into_parts(self) -> (String, f64, bool) {
        (self.message, self.score, self.ok)
    }

    /// Worst-scoring metric, if any were compared
    pub fn worst(&self) -> Option<&MetricScore> {
        self.metrics.first()
    }

    /// Metrics that exceeded the threshold on median or MAD
    pub fn flagged(&self) -> impl Iterator<Item = &MetricScore> {
        self.metrics.iter().filter(|m| m.is_flagged())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Compares captures with a fixed threshold and allow-list.
///
/// Holds no mutable state, so one engine can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct ProximityEngine {
    config: ProximityConfig,
    filter: MetricFilter,
}

impl ProximityEngine {
    /// Engine over the built-in allow-list plus `config.extra_metrics`
    pub fn new(config: ProximityConfig) -> Self {
        let filter = MetricFilter::default().with_prefixes(config.extra_metrics().iter().cloned());
        Self { config, filter }
    }

    /// Engine with a caller-supplied allow-list (`extra_metrics` is ignored)
    pub fn with_filter(config: ProximityConfig, filter: MetricFilter) -> Self {
        Self { config, filter }
    }

    pub fn config(&self) -> &ProximityConfig {
        &self.config
    }

    pub fn filter(&self) -> &MetricFilter {
        &self.filter
    }

    /// Compare two captures.
    ///
    /// Keys missing from either side or outside the allow-list are skipped.
    pub fn proximal(&self, a: &Stats, b: &Stats) -> ProximityReport {
        let threshold = self.config.threshold();
        let mut message = String::new();
        let mut accumulator = 0.0;

        let sample_count_proximal = sample_count_ratio(a.n_samples, b.n_samples) <= threshold;
        if !sample_count_proximal {
            message.push_str(&format!(
                "sample count not proximal: ({}, {}) are not within threshold ({}%)\n",
                a.n_samples,
                b.n_samples,
                self.config.threshold_percent()
            ));
            accumulator = BAD_SAMPLE_COUNT_PENALTY;
        }

        let mut metrics: Vec<MetricScore> = a
            .metrics
            .iter()
            .filter_map(|(key, am)| {
                let bm = b.get(key)?;
                if !self.filter.is_comparable(key) {
                    trace!("Skipping non-comparable metric '{}'", key);
                    return None;
                }
                let scored = compare_summaries(key, am, bm, &self.config);
                debug!("Metric '{}' scored {:.4}", key, scored.score);
                Some(scored)
            })
            .collect();

        // Map order is arbitrary; rank by score, then key for stable messages
        metrics.sort_by(|x, y| x.score.total_cmp(&y.score).then_with(|| x.key.cmp(&y.key)));

        let scores: Vec<f64> = metrics.iter().map(|m| m.score).collect();
        // Nothing to compare means nothing contradicts proximity
        accumulator += rank_weighted_mean(&scores).unwrap_or(1.0);

        // Scores are quadratic, so sqrt for linear. Negative (or NaN)
        // accumulators clamp to zero.
        let score = if accumulator > 0.0 {
            accumulator.sqrt()
        } else {
            0.0
        };

        for m in &metrics {
            message.push_str(&m.message);
        }

        let ok = score >= 1.0 - threshold;
        debug!(
            "Proximity score {:.4} over {} metrics (threshold {}, ok={})",
            score,
            metrics.len(),
            threshold,
            ok
        );

        ProximityReport {
            message,
            score,
            ok,
            threshold,
            sample_count_proximal,
            metrics,
        }
    }
}

impl Default for ProximityEngine {
    fn default() -> Self {
        Self::new(ProximityConfig::default())
    }
}

/// `|a - b| / max(a, b)`, or 0 when both counts are zero
fn sample_count_ratio(a: u64, b: u64) -> f64 {
    let max = a.max(b);
    if max == 0 {
        0.0
    } else {
        a.abs_diff(b) as f64 / max as f64
    }
}

/// Weighted sum with weights 1/2, 1/4, 1/8, ... applied to `scores`
/// ranked worst first. Input order does not matter.
pub fn rank_weighted_sum(scores: &[f64]) -> f64 {
    rank_weighted(scores).0
}

/// [`rank_weighted_sum`] divided by the total weight used, so a set of
/// perfect scores yields exactly 1.0. `None` for an empty slice.
pub fn rank_weighted_mean(scores: &[f64]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    let (total, weight_sum) = rank_weighted(scores);
    Some(total / weight_sum)
}

fn rank_weighted(scores: &[f64]) -> (f64, f64) {
    let mut sorted = scores.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mut weight = 1.0;
    let mut total = 0.0;
    let mut weight_sum = 0.0;
    for score in &sorted {
        weight *= 0.5;
        total += weight * score;
        weight_sum += weight;
    }
    (total, weight_sum)
}

/// One-shot comparison with `config`
pub fn proximal(a: &Stats, b: &Stats, config: &ProximityConfig) -> ProximityReport {
    ProximityEngine::new(config.clone()).proximal(a, b)
}

/// One-shot comparison with the default threshold and allow-list
pub fn proximal_default(a: &Stats, b: &Stats) -> ProximityReport {
    ProximityEngine::default().proximal(a, b)
}
