//! Comparable metric allow-list
//!
//! Only a fixed set of metric subtrees is stable enough between captures of
//! the same workload to be compared. A key is comparable when any of its
//! dotted ancestors (itself included) is on the list, so
//! `serverStatus.wiredTiger.cache` admits every cache statistic below it.

use rustc_hash::FxHashSet;
use std::sync::OnceLock;

/// Metric subtrees compared by default
pub const COMPARABLE_METRICS: &[&str] = &[
    "end",
    "start",
    "serverStatus.start",
    "serverStatus.end",
    "serverStatus.asserts",
    "serverStatus.mem.mapped",
    "serverStatus.mem.mappedWithJournal",
    "serverStatus.mem.resident",
    "serverStatus.mem.supported",
    "serverStatus.mem.virtual",
    "serverStatus.metrics.commands",
    "serverStatus.metrics.cursor.open",
    "serverStatus.metrics.document",
    "serverStatus.metrics.operation",
    "serverStatus.metrics.queryExecutor",
    "serverStatus.metrics.record",
    "serverStatus.metrics.repl",
    "serverStatus.metrics.storage",
    "serverStatus.metrics.ttl",
    "serverStatus.opcounters",
    "serverStatus.opcountersRepl",
    "serverStatus.wiredTiger.LSM",
    "serverStatus.wiredTiger.async",
    "serverStatus.wiredTiger.block-manager",
    "serverStatus.wiredTiger.cache",
    "serverStatus.wiredTiger.concurrentTransactions",
    "serverStatus.wiredTiger.data-handle",
    "serverStatus.wiredTiger.reconciliation",
    "serverStatus.wiredTiger.session",
    "serverStatus.writeBacksQueued",
];

static DEFAULT_FILTER: OnceLock<MetricFilter> = OnceLock::new();

/// Immutable set of comparable metric prefixes
#[derive(Debug, Clone)]
pub struct MetricFilter {
    prefixes: FxHashSet<String>,
}

impl MetricFilter {
    /// Filter over exactly `prefixes` (no defaults)
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Add more prefixes. Consumes the filter so the set stays fixed once built.
    pub fn with_prefixes<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefixes.extend(extra.into_iter().map(Into::into));
        self
    }

    /// Whether `key` or any of its dotted ancestors is on the list.
    ///
    /// Prefixes are tried shortest first: `a`, `a.b`, `a.b.c`.
    pub fn is_comparable(&self, key: &str) -> bool {
        key.match_indices('.')
            .map(|(idx, _)| &key[..idx])
            .chain(std::iter::once(key))
            .any(|prefix| self.prefixes.contains(prefix))
    }

    pub fn contains_prefix(&self, prefix: &str) -> bool {
        self.prefixes.contains(prefix)
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}

impl Default for MetricFilter {
    fn default() -> Self {
        Self::new(COMPARABLE_METRICS.iter().copied())
    }
}

/// Check `key` against the default allow-list
pub fn is_comparable_metric(key: &str) -> bool {
    DEFAULT_FILTER
        .get_or_init(MetricFilter::default)
        .is_comparable(key)
}
