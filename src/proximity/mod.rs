//! Proximity scoring of diagnostic captures
//!
//! Answers "are these two captures of the same workload statistically
//! equivalent?" from precomputed median/MAD summaries.
//!
//! # Scoring Formula
//!
//! ```text
//! metric score  = (1 - rel_median) × (1 - rel_mad)
//! rel_x         = |x_a - x_b| / max(|x_a|, |x_b|)
//!
//! aggregate     = Σ 2^-(i+1) × score_i / Σ 2^-(i+1)     (scores sorted worst first)
//! accumulator   = aggregate + penalty                   (penalty = -0.1 if sample counts differ)
//! final score   = sqrt(max(accumulator, 0))
//! ok            = final score >= 1 - threshold
//! ```
//!
//! # Example
//!
//! With threshold 0.2, three metrics scoring 0.5, 0.8 and 1.0:
//! - weighted sum = 0.5/2 + 0.8/4 + 1.0/8 = 0.575
//! - aggregate = 0.575 / 0.875 ≈ 0.657
//! - final score ≈ 0.811 → ok (≥ 0.8)

mod comparator;
mod engine;

pub use comparator::{compare_metric, compare_summaries, MetricScore};
pub use engine::{
    proximal, proximal_default, rank_weighted_mean, rank_weighted_sum, ProximityEngine,
    ProximityReport, BAD_SAMPLE_COUNT_PENALTY,
};
