//! Runtime statistics instrumentation subsystem.
//!
//! # Responsibilities
//! - Sample host memory/GC statistics through a pluggable source
//! - Export them as asynchronous instruments on a meter provider
//! - Debounce host reads with a configurable minimum interval

pub mod monitor;
pub mod stats;

pub use monitor::{
    RuntimeMonitor, RuntimeMonitorBuilder, StartError, DEFAULT_MINIMUM_READ_INTERVAL, METER_SCOPE,
};
pub use stats::{ProcessStatsSource, RuntimeStats, StatsError, StatsSource};
