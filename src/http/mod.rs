//! HTTP instrumentation subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → trace.rs (filter decides: instrument or bypass)
//!     → propagation.rs (extract remote parent from traceparent header)
//!     → server span started, context stored in request extensions
//!     → [wrapped handler runs]
//!     → propagation.rs (inject traceparent into response headers)
//!     → span ended, response returned untouched
//! ```

pub mod propagation;
pub mod trace;

pub use propagation::TRACEPARENT;
pub use trace::{default_span_name, HttpTrace, HttpTraceLayer, RequestFilter, SpanNameFormatter};
