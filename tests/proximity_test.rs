//! Integration tests for proximity scoring
//!
//! Exercises the public API end to end:
//! - Self-comparison and the documented scenarios
//! - Threshold monotonicity of the verdict
//! - Concurrent use of one engine
//! - Config loading from a capture directory

use ftdc_proximity::{
    is_comparable_metric, load_proximity_config, proximal, proximal_default, ProximityConfig,
    ProximityEngine, Stats, BAD_SAMPLE_COUNT_PENALTY,
};

const RESIDENT: &str = "serverStatus.mem.resident";

/// A realistic capture: comparable metrics plus a few the filter drops
fn workload_capture(n_samples: u64, scale: f64) -> Stats {
    Stats::new(n_samples)
        .with_metric("start", 1_000.0, 0.0)
        .with_metric(RESIDENT, 512.0 * scale, 8.0 * scale)
        .with_metric("serverStatus.mem.virtual", 2048.0 * scale, 16.0)
        .with_metric("serverStatus.opcounters.insert", 300.0 * scale, 12.0 * scale)
        .with_metric("serverStatus.opcounters.query", 900.0, 30.0 * scale)
        .with_metric(
            "serverStatus.wiredTiger.cache.bytes currently in the cache",
            1.0e6 * scale,
            2.0e4,
        )
        .with_metric("serverStatus.connections.current", 10.0 * scale, 1.0)
        .with_metric("serverStatus.uptime", 3600.0 * scale, 0.0)
}

#[test]
fn test_identical_stats_scenario() {
    let a = Stats::new(100).with_metric(RESIDENT, 50.0, 2.0);
    let b = Stats::new(100).with_metric(RESIDENT, 50.0, 2.0);

    let (message, score, ok) = proximal_default(&a, &b).into_parts();
    assert_eq!(message, "");
    assert_eq!(score, 1.0);
    assert!(ok);
}

#[test]
fn test_divergent_median_scenario() {
    let a = Stats::new(100).with_metric(RESIDENT, 50.0, 2.0);
    let b = Stats::new(100).with_metric(RESIDENT, 100.0, 2.0);

    let report = proximal_default(&a, &b);
    assert!(!report.ok);
    assert!(report.score < 0.8);
    assert!(report.metrics[0].score <= 0.5);
    assert!(report.message.contains("medians (50, 100)"));
    assert!(report.message.contains("threshold (20%)"));
    assert!(!report.message.contains("deviations"));
}

#[test]
fn test_sample_count_scenario() {
    let a = Stats::new(100).with_metric(RESIDENT, 50.0, 2.0);
    let b = Stats::new(130).with_metric(RESIDENT, 50.0, 2.0);

    let report = proximal_default(&a, &b);
    assert!(!report.sample_count_proximal);
    assert!(report
        .message
        .starts_with("sample count not proximal: (100, 130) are not within threshold (20%)\n"));
    // Penalty accumulator plus one perfect metric
    let expected = (BAD_SAMPLE_COUNT_PENALTY + 1.0).sqrt();
    assert!((report.score - expected).abs() < 1e-12);
}

#[test]
fn test_sample_count_within_threshold_has_no_penalty() {
    let a = Stats::new(100).with_metric(RESIDENT, 50.0, 2.0);
    let b = Stats::new(120).with_metric(RESIDENT, 50.0, 2.0);

    let report = proximal_default(&a, &b);
    assert!(report.sample_count_proximal);
    assert_eq!(report.score, 1.0);
    assert!(report.message.is_empty());
}

#[test]
fn test_self_comparison_is_proximal() {
    let capture = workload_capture(500, 1.0);
    let report = proximal_default(&capture, &capture);

    assert!(report.ok);
    assert_eq!(report.score, 1.0);
    assert!(report.message.is_empty());
    assert!(report.metrics.iter().all(|m| m.score == 1.0));
    // Only allow-listed keys are scored
    assert_eq!(report.metrics.len(), 6);
    assert!(report.metrics.iter().all(|m| is_comparable_metric(&m.key)));
}

#[test]
fn test_missing_keys_are_skipped() {
    let a = workload_capture(500, 1.0).with_metric("serverStatus.opcounters.delete", 1.0, 1.0);
    let mut b = workload_capture(500, 1.0);
    b.metrics.remove(RESIDENT);

    let report = proximal_default(&a, &b);
    assert!(report.ok);
    assert_eq!(report.metrics.len(), 5);
    assert!(report.metrics.iter().all(|m| m.key != RESIDENT));
}

#[test]
fn test_small_drift_passes_large_drift_fails() {
    let base = workload_capture(500, 1.0);

    let drifted = proximal_default(&base, &workload_capture(510, 1.05));
    assert!(drifted.ok, "5% drift should pass: {}", drifted.message);

    let broken = proximal_default(&base, &workload_capture(500, 2.0));
    assert!(!broken.ok);
    assert!(broken.message.lines().count() >= 3);
}

#[test]
fn test_threshold_monotonicity() {
    let base = workload_capture(400, 1.0);
    let others = [
        workload_capture(400, 1.05),
        workload_capture(450, 1.15),
        workload_capture(520, 1.3),
        workload_capture(800, 1.8),
        workload_capture(0, 0.5),
    ];

    for other in &others {
        let mut was_ok = false;
        for step in 1..20 {
            let threshold = step as f64 * 0.05;
            let config = ProximityConfig::new(threshold).unwrap();
            let report = proximal(&base, other, &config);
            if was_ok {
                assert!(
                    report.ok,
                    "raising threshold to {} flipped verdict to not ok",
                    threshold
                );
            }
            was_ok = report.ok;
        }
    }
}

#[test]
fn test_out_of_range_threshold_is_rejected() {
    assert!(ProximityConfig::new(0.0).is_err());
    assert!(ProximityConfig::from_json_str(r#"{"threshold": 0.0}"#).is_err());
    assert!(serde_json::from_str::<ProximityConfig>(r#"{"threshold": 0.0}"#).is_err());
    assert!(toml::from_str::<ProximityConfig>("threshold = 0.0").is_err());
}

#[test]
fn test_zero_sample_counts_do_not_panic() {
    let a = Stats::new(0);
    let b = Stats::new(0);
    let report = proximal_default(&a, &b);
    assert!(report.sample_count_proximal);
    assert!(report.score.is_finite());
    assert!(report.ok);
}

#[test]
fn test_engine_shared_across_threads() {
    let engine = ProximityEngine::new(ProximityConfig::new(0.25).unwrap());
    let base = workload_capture(500, 1.0);
    let other = workload_capture(500, 1.5);
    let expected = engine.proximal(&base, &other);

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| engine.proximal(&base, &other)))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn test_config_loaded_from_capture_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("proximity.toml"),
        r#"
threshold = 0.5
extra_metrics = ["serverStatus.connections"]
"#,
    )
    .unwrap();

    std::env::remove_var("FTDC_PROXIMITY_THRESHOLD");
    let config = load_proximity_config(dir.path());
    assert_eq!(config.threshold(), 0.5);

    let engine = ProximityEngine::new(config);
    let report = engine.proximal(&workload_capture(500, 1.0), &workload_capture(500, 1.0));
    assert_eq!(report.metrics.len(), 7);

    std::env::set_var("FTDC_PROXIMITY_THRESHOLD", "0.3");
    assert_eq!(load_proximity_config(dir.path()).threshold(), 0.3);

    std::env::set_var("FTDC_PROXIMITY_THRESHOLD", "not-a-number");
    assert_eq!(load_proximity_config(dir.path()).threshold(), 0.5);

    std::env::remove_var("FTDC_PROXIMITY_THRESHOLD");
}
