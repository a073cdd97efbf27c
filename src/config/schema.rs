//! Configuration schema definitions.
//!
//! This module defines the configuration structure consumed by host
//! binaries wiring the telemetry shims. All types derive Serde traits for
//! deserialization from config files; every field has a default so a
//! minimal (or empty) config is valid.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the telemetry shims.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Identity of the instrumented service.
    pub service: ServiceConfig,

    /// Demo/host HTTP server settings.
    pub server: ServerConfig,

    /// HTTP tracing middleware settings.
    pub http: HttpTraceConfig,

    /// Runtime stats monitor settings.
    pub runtime: RuntimeStatsConfig,

    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Service identity attached to exported telemetry.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Value for the `service.name` resource attribute.
    pub name: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "telemetry-demo".to_string(),
        }
    }
}

/// HTTP server configuration for the demo binary.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// HTTP tracing middleware configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpTraceConfig {
    /// Enable the tracing middleware.
    pub enabled: bool,

    /// Operation label for the instrumented handler; an empty label makes
    /// span names fall back to the request method.
    pub operation: String,
}

impl Default for HttpTraceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            operation: "http.server".to_string(),
        }
    }
}

/// Runtime stats monitor configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeStatsConfig {
    /// Enable the runtime stats monitor.
    pub enabled: bool,

    /// Minimum interval between two host stat reads, in seconds.
    /// Zero disables gating: every collection tick reads fresh.
    pub minimum_read_interval_secs: u64,
}

impl RuntimeStatsConfig {
    /// Configured minimum read interval as a [`Duration`].
    pub fn minimum_read_interval(&self) -> Duration {
        Duration::from_secs(self.minimum_read_interval_secs)
    }
}

impl Default for RuntimeStatsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            minimum_read_interval_secs: 15,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
