//! Host runtime statistics.
//!
//! # Responsibilities
//! - Define the snapshot shape the monitor exports
//! - Abstract the host's memory/GC statistics API behind a trait
//! - Provide a default source backed by the OS process accounting
//!
//! # Design Decisions
//! - The trait is the seam: managed-runtime hosts (or tests) inject their
//!   own source, the default only covers plain process memory
//! - Values stay in the host's native units; no conversion happens here
//! - A failed read is an `Err`, never a panic; the monitor decides what a
//!   failed tick means

use thiserror::Error;

/// One coherent reading of the host's runtime statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    /// Cumulative count of completed collection cycles.
    pub gc_count: u64,

    /// Cumulative time spent paused for collection, in nanoseconds.
    pub gc_pause_total_ns: u64,

    /// Bytes of heap currently in use.
    pub heap_used_bytes: u64,

    /// Bytes of heap committed but not currently in use.
    pub heap_idle_bytes: u64,
}

/// Error reading host statistics.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("failed to read process statistics: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed statistics: {0}")]
    Malformed(String),
}

/// Callback-driven source of host runtime statistics.
///
/// Implementations must be cheap enough to call on every collection tick;
/// the monitor's minimum-read-interval gate is the only rate limiting
/// applied on top.
pub trait StatsSource: Send + Sync {
    /// Take a fresh reading.
    fn sample(&self) -> Result<RuntimeStats, StatsError>;
}

/// Default source reading process memory accounting from the OS.
///
/// On Linux this parses `/proc/self/status`; resident set size stands in
/// for used heap and non-resident data-segment space for idle heap. GC
/// counters are always zero here because the process itself carries no
/// collector; hosts embedding a managed runtime supply their own
/// [`StatsSource`]. On other platforms every field reads as zero.
#[derive(Debug, Clone, Default)]
pub struct ProcessStatsSource;

impl ProcessStatsSource {
    pub fn new() -> Self {
        Self
    }
}

impl StatsSource for ProcessStatsSource {
    #[cfg(target_os = "linux")]
    fn sample(&self) -> Result<RuntimeStats, StatsError> {
        let status = std::fs::read_to_string("/proc/self/status")?;
        parse_proc_status(&status)
    }

    #[cfg(not(target_os = "linux"))]
    fn sample(&self) -> Result<RuntimeStats, StatsError> {
        Ok(RuntimeStats::default())
    }
}

/// Parse the `VmRSS`/`VmData` lines of a `/proc/<pid>/status` dump.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_proc_status(text: &str) -> Result<RuntimeStats, StatsError> {
    let mut vm_rss = None;
    let mut vm_data = None;

    for line in text.lines() {
        if let Some(rest) = line.strip_prefix("VmRSS:") {
            vm_rss = Some(parse_kib(rest)?);
        } else if let Some(rest) = line.strip_prefix("VmData:") {
            vm_data = Some(parse_kib(rest)?);
        }
    }

    let used = vm_rss.ok_or_else(|| StatsError::Malformed("missing VmRSS line".to_string()))?;
    // VmData can be absent on exotic kernels; treat it as fully resident then.
    let data = vm_data.unwrap_or(used);

    Ok(RuntimeStats {
        gc_count: 0,
        gc_pause_total_ns: 0,
        heap_used_bytes: used,
        heap_idle_bytes: data.saturating_sub(used),
    })
}

/// Parse a `/proc` size field of the form `    1234 kB` into bytes.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_kib(field: &str) -> Result<u64, StatsError> {
    let value = field
        .split_whitespace()
        .next()
        .ok_or_else(|| StatsError::Malformed(format!("empty size field: {field:?}")))?;
    let kib: u64 = value
        .parse()
        .map_err(|_| StatsError::Malformed(format!("non-numeric size field: {field:?}")))?;
    Ok(kib * 1024)
}
