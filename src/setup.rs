//! Bootstrap helpers for host processes.
//!
//! # Responsibilities
//! - Initialize the logging subscriber
//! - Build and install SDK tracer/meter providers and the W3C propagator
//! - Flush providers on shutdown
//!
//! # Design Decisions
//! - The shims themselves never install global state; only this module
//!   does, and only when a host asks for it
//! - Stdout exporters keep the demo self-contained; real deployments swap
//!   the exporters, nothing else changes

use std::time::Duration;

use opentelemetry::global;
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LoggingConfig, TelemetryConfig};

/// How often the demo meter provider exports collected metrics.
const METRIC_EXPORT_INTERVAL: Duration = Duration::from_secs(15);

/// Initialize the tracing subscriber (EnvFilter + fmt).
///
/// `RUST_LOG` wins over the configured level. Call once, before any other
/// subsystem logs.
pub fn init_logging(config: &LoggingConfig) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Owned handle over the installed SDK providers.
///
/// Keep it alive for the process's life and call [`shutdown`](Self::shutdown)
/// on the way out so buffered telemetry is flushed.
pub struct Telemetry {
    tracer_provider: SdkTracerProvider,
    meter_provider: SdkMeterProvider,
}

impl Telemetry {
    /// Build stdout-exporting providers and install them globally, together
    /// with a W3C trace-context propagator.
    pub fn init(config: &TelemetryConfig) -> Self {
        let resource = Resource::builder()
            .with_service_name(config.service.name.clone())
            .build();

        let tracer_provider = SdkTracerProvider::builder()
            .with_resource(resource.clone())
            .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            .build();

        let reader = PeriodicReader::builder(opentelemetry_stdout::MetricExporter::default())
            .with_interval(METRIC_EXPORT_INTERVAL)
            .build();
        let meter_provider = SdkMeterProvider::builder()
            .with_resource(resource)
            .with_reader(reader)
            .build();

        global::set_tracer_provider(tracer_provider.clone());
        global::set_meter_provider(meter_provider.clone());
        global::set_text_map_propagator(TraceContextPropagator::new());

        tracing::info!(
            service = %config.service.name,
            "Telemetry providers installed"
        );

        Self {
            tracer_provider,
            meter_provider,
        }
    }

    /// Flush and shut down both providers.
    pub fn shutdown(self) {
        if let Err(error) = self.tracer_provider.shutdown() {
            tracing::warn!(error = %error, "Tracer provider shutdown failed");
        }
        if let Err(error) = self.meter_provider.shutdown() {
            tracing::warn!(error = %error, "Meter provider shutdown failed");
        }
    }
}
