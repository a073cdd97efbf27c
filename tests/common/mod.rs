//! Shared fixtures for integration tests.

// Each test binary uses a subset of these helpers.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use opentelemetry_sdk::metrics::data::{AggregatedMetrics, MetricData};
use opentelemetry_sdk::metrics::{InMemoryMetricExporter, PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::trace::{InMemorySpanExporter, SdkTracerProvider};

use telemetry_shim::runtime::{RuntimeStats, StatsError, StatsSource};

/// In-memory span pipeline; spans export synchronously as they end.
pub fn span_pipeline() -> (InMemorySpanExporter, SdkTracerProvider) {
    let exporter = InMemorySpanExporter::default();
    let provider = SdkTracerProvider::builder()
        .with_simple_exporter(exporter.clone())
        .build();
    (exporter, provider)
}

/// In-memory metric pipeline. The reader interval is effectively infinite;
/// each `provider.force_flush()` drives one collection cycle, standing in
/// for the pipeline's "run async instruments" tick.
pub fn metric_pipeline() -> (InMemoryMetricExporter, SdkMeterProvider) {
    let exporter = InMemoryMetricExporter::default();
    let reader = PeriodicReader::builder(exporter.clone())
        .with_interval(Duration::from_secs(3600))
        .build();
    let provider = SdkMeterProvider::builder().with_reader(reader).build();
    (exporter, provider)
}

/// Most recently exported value of a cumulative u64 sum instrument.
pub fn latest_u64_sum(exporter: &InMemoryMetricExporter, name: &str) -> Option<u64> {
    let exports = exporter.get_finished_metrics().expect("finished metrics");
    exports.iter().rev().find_map(|resource_metrics| {
        resource_metrics
            .scope_metrics()
            .flat_map(|scope| scope.metrics())
            .find_map(|metric| {
                if metric.name() != name {
                    return None;
                }
                match metric.data() {
                    AggregatedMetrics::U64(MetricData::Sum(sum)) => {
                        sum.data_points().next().map(|point| point.value())
                    }
                    _ => None,
                }
            })
    })
}

/// Most recently exported value of a u64 gauge instrument.
pub fn latest_u64_gauge(exporter: &InMemoryMetricExporter, name: &str) -> Option<u64> {
    let exports = exporter.get_finished_metrics().expect("finished metrics");
    exports.iter().rev().find_map(|resource_metrics| {
        resource_metrics
            .scope_metrics()
            .flat_map(|scope| scope.metrics())
            .find_map(|metric| {
                if metric.name() != name {
                    return None;
                }
                match metric.data() {
                    AggregatedMetrics::U64(MetricData::Gauge(gauge)) => {
                        gauge.data_points().next().map(|point| point.value())
                    }
                    _ => None,
                }
            })
    })
}

/// Router with the scenario handler: `"hello world"`, status 200, no
/// telemetry awareness of its own.
pub fn hello_router() -> Router {
    Router::new()
        .route("/", get(|| async { "hello world" }))
        .route("/hello", get(|| async { "hello world" }))
}

/// Stat source whose every successful sample advances all counters, with a
/// shared call counter for gating assertions.
#[derive(Clone, Default)]
pub struct CountingSource {
    calls: Arc<AtomicUsize>,
}

impl CountingSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful samples taken so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl StatsSource for CountingSource {
    fn sample(&self) -> Result<RuntimeStats, StatsError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) as u64 + 1;
        Ok(RuntimeStats {
            gc_count: call,
            gc_pause_total_ns: call * 1_000,
            heap_used_bytes: call * 64 * 1024,
            heap_idle_bytes: 8 * 1024,
        })
    }
}

/// Stat source that always fails.
pub struct FailingSource;

impl StatsSource for FailingSource {
    fn sample(&self) -> Result<RuntimeStats, StatsError> {
        Err(StatsError::Malformed("synthetic failure".to_string()))
    }
}

/// Counting source with a switch to make subsequent samples fail.
#[derive(Clone, Default)]
pub struct SwitchableSource {
    inner: CountingSource,
    failing: Arc<AtomicBool>,
}

impl SwitchableSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.inner.calls()
    }
}

impl StatsSource for SwitchableSource {
    fn sample(&self) -> Result<RuntimeStats, StatsError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StatsError::Malformed("synthetic failure".to_string()));
        }
        self.inner.sample()
    }
}
