//! Demo server wiring both telemetry shims.
//!
//! Serves a `"hello world"` handler behind the tracing middleware and runs
//! the runtime stats monitor against stdout-exporting providers. Useful for
//! watching spans and gated metric reads without any backend.

use std::path::PathBuf;
use std::time::Duration;

use axum::{routing::get, Json, Router};
use clap::Parser;
use serde_json::{json, Value};
use tower_http::timeout::TimeoutLayer;

use telemetry_shim::config::{load_config, TelemetryConfig};
use telemetry_shim::http::HttpTraceLayer;
use telemetry_shim::runtime::RuntimeMonitor;
use telemetry_shim::setup;

#[derive(Parser)]
#[command(name = "telemetry-demo")]
#[command(about = "Demo server for the telemetry shims", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => TelemetryConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }

    setup::init_logging(&config.logging);
    tracing::info!("telemetry-demo v0.1.0 starting");

    // Providers must be installed before the layer resolves its tracer and
    // the monitor resolves its meter.
    let telemetry = setup::Telemetry::init(&config);

    let _monitor = if config.runtime.enabled {
        let monitor = RuntimeMonitor::builder()
            .with_minimum_read_interval(config.runtime.minimum_read_interval())
            .start()?;
        Some(monitor)
    } else {
        tracing::info!("Runtime stats monitor disabled");
        None
    };

    let mut app = Router::new()
        .route("/", get(hello))
        .route("/healthz", get(healthz))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )));
    if config.http.enabled {
        app = app.layer(HttpTraceLayer::new(config.http.operation.clone()));
    } else {
        tracing::info!("HTTP tracing middleware disabled");
    }

    let listener = tokio::net::TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        operation = %config.http.operation,
        "HTTP server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    telemetry.shutdown();
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn hello() -> &'static str {
    "hello world"
}

async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
