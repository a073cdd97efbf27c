//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (semantic checks, all errors collected)
//!     → TelemetryConfig (validated, immutable)
//!     → handed to setup + adapter builders by the host binary
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults so a minimal config is valid
//! - The adapters themselves take programmatic options; this schema is glue
//!   for host processes

pub mod loader;
pub mod schema;

pub use loader::{load_config, validate_config, ConfigError, ValidationError};
pub use schema::{
    HttpTraceConfig, LoggingConfig, RuntimeStatsConfig, ServerConfig, ServiceConfig,
    TelemetryConfig,
};
