//! Core data models for metric captures

use std::collections::HashMap;

/// Robust summary of one time-series metric
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetricSummary {
    pub median: f64,
    /// Median absolute deviation
    pub mad: f64,
}

impl MetricSummary {
    pub fn new(median: f64, mad: f64) -> Self {
        Self { median, mad }
    }
}

/// Summary statistics of one diagnostic capture
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stats {
    /// Number of raw samples the summaries were computed from
    pub n_samples: u64,
    /// Summaries keyed by dotted metric path (e.g. `serverStatus.mem.resident`)
    pub metrics: HashMap<String, MetricSummary>,
}

impl Stats {
    pub fn new(n_samples: u64) -> Self {
        Self {
            n_samples,
            metrics: HashMap::new(),
        }
    }

    /// Builder-style insert, mostly for tests and fixtures
    pub fn with_metric(mut self, key: impl Into<String>, median: f64, mad: f64) -> Self {
        self.insert(key, MetricSummary::new(median, mad));
        self
    }

    /// Insert or replace the summary for `key`
    pub fn insert(&mut self, key: impl Into<String>, summary: MetricSummary) {
        self.metrics.insert(key.into(), summary);
    }

    pub fn get(&self, key: &str) -> Option<&MetricSummary> {
        self.metrics.get(key)
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}
