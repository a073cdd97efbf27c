//! Trace-context header extraction and injection.
//!
//! # Responsibilities
//! - Read a remote parent context from inbound request headers
//! - Write the active span's context to outbound response headers
//!
//! # Design Decisions
//! - W3C `traceparent`/`tracestate` wire format via the SDK propagator;
//!   no header framing is implemented here
//! - Callers pass the propagator explicitly so behavior is deterministic
//!   without process-global state

use http::HeaderMap;
use opentelemetry::propagation::TextMapPropagator;
use opentelemetry::Context;
use opentelemetry_http::{HeaderExtractor, HeaderInjector};

/// Header carrying the W3C trace context.
pub const TRACEPARENT: &str = "traceparent";

/// Extract a remote span context from `headers`.
///
/// Returns a context without an active span when no usable trace header is
/// present.
pub fn extract_remote_context(propagator: &dyn TextMapPropagator, headers: &HeaderMap) -> Context {
    propagator.extract(&HeaderExtractor(headers))
}

/// Inject the span context carried by `cx` into `headers`.
pub fn inject_context(propagator: &dyn TextMapPropagator, cx: &Context, headers: &mut HeaderMap) {
    propagator.inject_context(cx, &mut HeaderInjector(headers));
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::trace::TraceContextExt;
    use opentelemetry_sdk::propagation::TraceContextPropagator;

    #[test]
    fn test_extract_round_trips_remote_parent() {
        let propagator = TraceContextPropagator::new();

        let mut headers = HeaderMap::new();
        headers.insert(
            TRACEPARENT,
            "00-0af7651916cd43dd8448eb211c80319c-b7ad6b7169203331-01"
                .parse()
                .unwrap(),
        );

        let cx = extract_remote_context(&propagator, &headers);
        let span_context = cx.span().span_context().clone();
        assert!(span_context.is_valid());
        assert_eq!(
            span_context.trace_id().to_string(),
            "0af7651916cd43dd8448eb211c80319c"
        );

        let mut out = HeaderMap::new();
        inject_context(&propagator, &cx, &mut out);
        let reinjected = out.get(TRACEPARENT).unwrap().to_str().unwrap();
        assert!(reinjected.contains("0af7651916cd43dd8448eb211c80319c"));
    }

    #[test]
    fn test_extract_without_headers_yields_no_span() {
        let propagator = TraceContextPropagator::new();
        let cx = extract_remote_context(&propagator, &HeaderMap::new());
        assert!(!cx.span().span_context().is_valid());
    }
}
