// Copyright (c) 2026 the agwsync authors
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the agwsync controller.
//!
//! All metrics live in the crate-wide registry and are exposed via the
//! `/metrics` endpoint. Names carry the `agwsync_` prefix.

use prometheus::{
    CounterVec, Encoder, Histogram, HistogramOpts, IntGauge, Opts, Registry, TextEncoder,
};
use std::sync::LazyLock;
use std::time::Duration;

/// Namespace prefix for all agwsync metrics
const METRICS_NAMESPACE: &str = "agwsync";

/// Cycle outcome label: configuration pushed successfully
pub const OUTCOME_SUCCESS: &str = "success";
/// Cycle outcome label: gateway busy, cycle skipped
pub const OUTCOME_BUSY: &str = "busy";
/// Cycle outcome label: cycle failed
pub const OUTCOME_ERROR: &str = "error";

/// Target error label: secret fetch failed
pub const TARGET_ERROR_SECRET: &str = "secret_fetch";
/// Target error label: certificate parse/packaging failed
pub const TARGET_ERROR_CERTIFICATE: &str = "certificate";

/// Global metrics registry
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Total sync cycles by outcome (`success`, `busy`, `error`)
pub static SYNC_CYCLES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_sync_cycles_total"),
        "Total number of sync cycles by outcome",
    );
    let counter = CounterVec::new(opts, &["outcome"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of sync cycles in seconds
pub static SYNC_CYCLE_DURATION_SECONDS: LazyLock<Histogram> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_sync_cycle_duration_seconds"),
        "Duration of sync cycles in seconds",
    )
    .buckets(vec![0.1, 0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0]);
    let histogram = Histogram::with_opts(opts).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

/// Number of termination targets currently tracked
pub static TERMINATION_TARGETS: LazyLock<IntGauge> = LazyLock::new(|| {
    let gauge = IntGauge::new(
        format!("{METRICS_NAMESPACE}_termination_targets"),
        "Number of termination targets currently tracked",
    )
    .unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

/// Per-target sync errors by reason (`secret_fetch`, `certificate`)
pub static TARGET_SYNC_ERRORS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_target_sync_errors_total"),
        "Per-target sync errors by reason",
    );
    let counter = CounterVec::new(opts, &["reason"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Record a completed sync cycle.
pub fn record_cycle(outcome: &str, duration: Duration) {
    SYNC_CYCLES_TOTAL.with_label_values(&[outcome]).inc();
    SYNC_CYCLE_DURATION_SECONDS.observe(duration.as_secs_f64());
}

/// Update the tracked-target gauge.
pub fn set_target_count(count: usize) {
    #[allow(clippy::cast_possible_wrap)]
    TERMINATION_TARGETS.set(count as i64);
}

/// Record a per-target sync error.
pub fn record_target_error(reason: &str) {
    TARGET_SYNC_ERRORS_TOTAL.with_label_values(&[reason]).inc();
}

/// Render all registered metrics in the Prometheus text format.
#[must_use]
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    if encoder.encode(&families, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod metrics_tests;
