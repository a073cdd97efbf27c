//! Runtime statistics monitor.
//!
//! # Responsibilities
//! - Register asynchronous instruments for GC and heap statistics
//! - Read the host stat source lazily, when the metrics pipeline collects
//! - Debounce host reads with a minimum-read-interval gate
//!
//! # Data Flow
//! ```text
//! metrics pipeline collection cycle
//!     → instrument callbacks fire (serially, per pipeline contract)
//!     → gate open?  yes: fresh StatsSource read, snapshot cached
//!                   no:  cached snapshot reused
//!     → every instrument observes one coherent snapshot
//! ```
//!
//! # Design Decisions
//! - Gate state lives in an owned struct returned by `start`, never a global
//! - A gated or failed tick reports the last collected reading, so
//!   cumulative counters stay monotonic and gauges never go dark
//! - The callbacks are serialized by the metrics pipeline; the mutex exists
//!   only because instrument callbacks must be `Send + Sync`

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use opentelemetry::global;
use opentelemetry::metrics::{
    AsyncInstrument, Meter, MeterProvider, ObservableCounter, ObservableGauge,
};
use thiserror::Error;

use crate::runtime::stats::{ProcessStatsSource, RuntimeStats, StatsError, StatsSource};

/// Instrumentation scope the monitor registers its instruments under.
pub const METER_SCOPE: &str = "telemetry-shim/runtime";

/// Default debounce interval between two host stat reads.
pub const DEFAULT_MINIMUM_READ_INTERVAL: Duration = Duration::from_secs(15);

/// Error aborting monitor startup.
///
/// Startup is all-or-nothing: when this is returned, no instrument has been
/// registered with the meter provider.
#[derive(Debug, Error)]
pub enum StartError {
    #[error("initial runtime statistics probe failed: {0}")]
    Probe(#[from] StatsError),
}

/// Minimum-interval gate over host stat reads.
struct ReadGate {
    interval: Duration,
    last: Option<Instant>,
}

impl ReadGate {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// A read is due on the first tick, with gating disabled, or once the
    /// configured interval has elapsed since the last committed read.
    fn is_due(&self, now: Instant) -> bool {
        match self.last {
            None => true,
            Some(last) => self.interval.is_zero() || now.duration_since(last) >= self.interval,
        }
    }

    /// Commit a successful read. Failed reads never call this, so the next
    /// tick retries naturally.
    fn mark(&mut self, now: Instant) {
        self.last = Some(now);
    }
}

struct CollectorState {
    gate: ReadGate,
    last_reading: RuntimeStats,
}

/// Shared by all instrument callbacks; hands out one coherent snapshot per
/// collection cycle.
struct Collector {
    source: Arc<dyn StatsSource>,
    state: Mutex<CollectorState>,
}

impl Collector {
    fn current(&self) -> RuntimeStats {
        let mut state = self.state.lock().expect("runtime stats mutex poisoned");
        let now = Instant::now();
        if state.gate.is_due(now) {
            match self.source.sample() {
                Ok(reading) => {
                    state.last_reading = reading;
                    state.gate.mark(now);
                }
                Err(error) => {
                    // A failed tick is not an error to the pipeline; the next
                    // tick is the retry point.
                    tracing::debug!(error = %error, "Runtime stats read failed, reporting last reading");
                }
            }
        }
        state.last_reading
    }
}

/// Builder for [`RuntimeMonitor`].
pub struct RuntimeMonitorBuilder {
    meter: Option<Meter>,
    minimum_read_interval: Duration,
    source: Arc<dyn StatsSource>,
}

impl Default for RuntimeMonitorBuilder {
    fn default() -> Self {
        Self {
            meter: None,
            minimum_read_interval: DEFAULT_MINIMUM_READ_INTERVAL,
            source: Arc::new(ProcessStatsSource::new()),
        }
    }
}

impl RuntimeMonitorBuilder {
    /// Register instruments with an explicit meter provider instead of the
    /// global one.
    pub fn with_meter_provider<P>(mut self, provider: &P) -> Self
    where
        P: MeterProvider,
    {
        self.meter = Some(provider.meter(METER_SCOPE));
        self
    }

    /// Set the minimum wall-clock interval between two host stat reads.
    ///
    /// `Duration::ZERO` disables gating entirely: every collection tick
    /// reads fresh.
    pub fn with_minimum_read_interval(mut self, interval: Duration) -> Self {
        self.minimum_read_interval = interval;
        self
    }

    /// Replace the host stat source.
    pub fn with_stats_source(mut self, source: impl StatsSource + 'static) -> Self {
        self.source = Arc::new(source);
        self
    }

    /// Probe the stat source once, then register the instruments.
    ///
    /// The probe seeds the cached reading but does not count as a collection:
    /// the first pipeline tick always reads fresh. On probe failure nothing
    /// is registered.
    pub fn start(self) -> Result<RuntimeMonitor, StartError> {
        let seed = self.source.sample()?;

        let meter = match self.meter {
            Some(meter) => meter,
            None => global::meter(METER_SCOPE),
        };

        let collector = Arc::new(Collector {
            source: self.source,
            state: Mutex::new(CollectorState {
                gate: ReadGate::new(self.minimum_read_interval),
                last_reading: seed,
            }),
        });

        let gc_count = {
            let collector = collector.clone();
            meter
                .u64_observable_counter("runtime.gc.count")
                .with_description("Cumulative count of completed collection cycles")
                .with_callback(move |observer| observer.observe(collector.current().gc_count, &[]))
                .build()
        };

        let gc_pause_total = {
            let collector = collector.clone();
            meter
                .u64_observable_counter("runtime.gc.pause_total")
                .with_description("Cumulative time paused for collection")
                .with_unit("ns")
                .with_callback(move |observer| {
                    observer.observe(collector.current().gc_pause_total_ns, &[])
                })
                .build()
        };

        let heap_used = {
            let collector = collector.clone();
            meter
                .u64_observable_gauge("runtime.memory.heap_used")
                .with_description("Heap bytes currently in use")
                .with_unit("By")
                .with_callback(move |observer| {
                    observer.observe(collector.current().heap_used_bytes, &[])
                })
                .build()
        };

        let heap_idle = {
            let collector = collector.clone();
            meter
                .u64_observable_gauge("runtime.memory.heap_idle")
                .with_description("Heap bytes committed but not in use")
                .with_unit("By")
                .with_callback(move |observer| {
                    observer.observe(collector.current().heap_idle_bytes, &[])
                })
                .build()
        };

        tracing::info!(
            minimum_read_interval_ms = self.minimum_read_interval.as_millis() as u64,
            "Runtime stats monitor started"
        );

        Ok(RuntimeMonitor {
            _gc_count: gc_count,
            _gc_pause_total: gc_pause_total,
            _heap_used: heap_used,
            _heap_idle: heap_idle,
        })
    }
}

/// Owned handle over the registered runtime instruments.
///
/// Construct with [`RuntimeMonitor::start`] (defaults) or
/// [`RuntimeMonitor::builder`]. The handle only witnesses the registration;
/// the callbacks themselves live as long as the meter provider they were
/// registered with.
pub struct RuntimeMonitor {
    _gc_count: ObservableCounter<u64>,
    _gc_pause_total: ObservableCounter<u64>,
    _heap_used: ObservableGauge<u64>,
    _heap_idle: ObservableGauge<u64>,
}

impl RuntimeMonitor {
    /// Start with default options: global meter provider, 15 s minimum read
    /// interval, process stat source.
    pub fn start() -> Result<Self, StartError> {
        Self::builder().start()
    }

    pub fn builder() -> RuntimeMonitorBuilder {
        RuntimeMonitorBuilder::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_first_tick_is_due() {
        let gate = ReadGate::new(Duration::from_secs(15));
        assert!(gate.is_due(Instant::now()));
    }

    #[test]
    fn test_gate_blocks_within_interval() {
        let mut gate = ReadGate::new(Duration::from_secs(15));
        let start = Instant::now();
        gate.mark(start);

        assert!(!gate.is_due(start + Duration::from_secs(1)));
        assert!(!gate.is_due(start + Duration::from_secs(14)));
    }

    #[test]
    fn test_gate_reopens_after_interval() {
        let mut gate = ReadGate::new(Duration::from_secs(15));
        let start = Instant::now();
        gate.mark(start);

        assert!(gate.is_due(start + Duration::from_secs(15)));
        assert!(gate.is_due(start + Duration::from_secs(3600)));
    }

    #[test]
    fn test_gate_zero_interval_never_blocks() {
        let mut gate = ReadGate::new(Duration::ZERO);
        let start = Instant::now();
        gate.mark(start);

        assert!(gate.is_due(start));
        assert!(gate.is_due(start + Duration::from_nanos(1)));
    }

    #[test]
    fn test_failed_read_does_not_commit() {
        let mut gate = ReadGate::new(Duration::from_secs(15));
        let start = Instant::now();

        // First tick due, but the read fails: mark() is never called, so the
        // immediately following tick is still due.
        assert!(gate.is_due(start));
        assert!(gate.is_due(start + Duration::from_millis(1)));

        gate.mark(start + Duration::from_millis(1));
        assert!(!gate.is_due(start + Duration::from_millis(2)));
    }
}
