//! Telemetry instrumentation shims.
//!
//! Two thin adapters between a host process and the OpenTelemetry SDK:
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────┐
//!                 │                 TELEMETRY SHIM                    │
//!                 │                                                   │
//!  Request ───────┼─▶ http::HttpTraceLayer ──▶ wrapped handler        │
//!                 │      filter? ──▶ bypass (untouched)               │
//!                 │      span start ─▶ extensions ─▶ span end         │
//!  Response ◀─────┼── traceparent header injected ◀──────────────────┤
//!                 │                                                   │
//!  Metrics tick ──┼─▶ runtime::RuntimeMonitor                         │
//!                 │      interval gate ─▶ StatsSource read            │
//!                 │      runtime.gc.* / runtime.memory.* instruments  │
//!                 │                                                   │
//!                 │  Cross-cutting: config (TOML), setup (providers,  │
//!                 │  logging), demo binary                            │
//!                 └──────────────────────────────────────────────────┘
//! ```
//!
//! Neither adapter owns background work of its own: the middleware runs in
//! the request path, the monitor runs inside the metrics pipeline's
//! collection cycle.

pub mod config;
pub mod http;
pub mod runtime;
pub mod setup;

pub use crate::config::TelemetryConfig;
pub use crate::http::HttpTraceLayer;
pub use crate::runtime::RuntimeMonitor;
