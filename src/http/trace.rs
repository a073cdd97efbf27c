//! Span-producing HTTP middleware.
//!
//! # Responsibilities
//! - Start a server span around every request the filter admits
//! - Derive the span name from the operation label (or the request method)
//! - Expose the span-bearing context to the wrapped handler via extensions
//! - Inject the trace-context header into the outgoing response
//! - End the span on every exit path, including handler panics
//!
//! # Design Decisions
//! - Implemented as a Tower `Layer` so it composes with any Axum/Hyper stack
//! - Filter and formatter see the request head only; the body is never touched
//! - The propagator is held per-layer, so header emission never depends on
//!   process-global state
//! - Filtered requests take a complete bypass: no span, no header, no
//!   formatter call

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::Poll;

use http::request::Parts;
use http::{Request, Response};
use opentelemetry::global::{self, BoxedTracer};
use opentelemetry::propagation::TextMapPropagator;
use opentelemetry::trace::{SpanKind, Status, TraceContextExt, Tracer, TracerProvider};
use opentelemetry::KeyValue;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use tower::{Layer, Service};

use crate::http::propagation;

/// Instrumentation scope recorded on every span this middleware creates.
pub const TRACER_SCOPE: &str = "telemetry-shim/http";

/// Predicate deciding whether a request is instrumented at all.
pub type RequestFilter = Arc<dyn Fn(&Parts) -> bool + Send + Sync>;

/// Maps the operation label and the request head to a span name.
pub type SpanNameFormatter = Arc<dyn Fn(&str, &Parts) -> String + Send + Sync>;

/// Default span-name formatter.
///
/// Returns the operation label unchanged when it is non-empty, otherwise
/// falls back to the request's method token (e.g. `GET`).
pub fn default_span_name(operation: &str, request: &Parts) -> String {
    if operation.is_empty() {
        request.method.to_string()
    } else {
        operation.to_string()
    }
}

/// Layer configuration for [`HttpTrace`].
///
/// Immutable after construction; cloning shares the tracer and the
/// filter/formatter functions.
pub struct HttpTraceLayer<T = BoxedTracer> {
    tracer: Arc<T>,
    operation: Arc<str>,
    filter: Option<RequestFilter>,
    formatter: SpanNameFormatter,
    propagator: Arc<dyn TextMapPropagator + Send + Sync>,
}

impl HttpTraceLayer<BoxedTracer> {
    /// Create a layer named after the handler's logical operation.
    ///
    /// Spans are created through the globally registered tracer provider
    /// unless [`with_tracer_provider`](Self::with_tracer_provider) overrides
    /// it.
    pub fn new(operation: impl Into<String>) -> Self {
        let formatter: SpanNameFormatter = Arc::new(default_span_name);
        Self {
            tracer: Arc::new(global::tracer(TRACER_SCOPE)),
            operation: operation.into().into(),
            filter: None,
            formatter,
            propagator: Arc::new(TraceContextPropagator::new()),
        }
    }
}

impl<T> HttpTraceLayer<T> {
    /// Resolve the tracer from an explicit provider instead of the global one.
    pub fn with_tracer_provider<P>(self, provider: &P) -> HttpTraceLayer<P::Tracer>
    where
        P: TracerProvider,
    {
        HttpTraceLayer {
            tracer: Arc::new(provider.tracer(TRACER_SCOPE)),
            operation: self.operation,
            filter: self.filter,
            formatter: self.formatter,
            propagator: self.propagator,
        }
    }

    /// Instrument only requests for which `filter` returns `true`.
    ///
    /// Rejected requests are passed straight to the wrapped service: no span
    /// is started, no trace header is emitted and the formatter is never
    /// invoked.
    pub fn with_filter(mut self, filter: impl Fn(&Parts) -> bool + Send + Sync + 'static) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Replace the default span-name formatter.
    pub fn with_span_name_formatter(
        mut self,
        formatter: impl Fn(&str, &Parts) -> String + Send + Sync + 'static,
    ) -> Self {
        self.formatter = Arc::new(formatter);
        self
    }

    /// Replace the W3C trace-context propagator used for header
    /// extraction/injection.
    pub fn with_propagator(
        mut self,
        propagator: impl TextMapPropagator + Send + Sync + 'static,
    ) -> Self {
        self.propagator = Arc::new(propagator);
        self
    }
}

impl<T> Clone for HttpTraceLayer<T> {
    fn clone(&self) -> Self {
        Self {
            tracer: self.tracer.clone(),
            operation: self.operation.clone(),
            filter: self.filter.clone(),
            formatter: self.formatter.clone(),
            propagator: self.propagator.clone(),
        }
    }
}

impl<S, T> Layer<S> for HttpTraceLayer<T> {
    type Service = HttpTrace<S, T>;

    fn layer(&self, inner: S) -> Self::Service {
        HttpTrace {
            inner,
            tracer: self.tracer.clone(),
            operation: self.operation.clone(),
            filter: self.filter.clone(),
            formatter: self.formatter.clone(),
            propagator: self.propagator.clone(),
        }
    }
}

/// Middleware service produced by [`HttpTraceLayer`].
pub struct HttpTrace<S, T = BoxedTracer> {
    inner: S,
    tracer: Arc<T>,
    operation: Arc<str>,
    filter: Option<RequestFilter>,
    formatter: SpanNameFormatter,
    propagator: Arc<dyn TextMapPropagator + Send + Sync>,
}

impl<S: Clone, T> Clone for HttpTrace<S, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            tracer: self.tracer.clone(),
            operation: self.operation.clone(),
            filter: self.filter.clone(),
            formatter: self.formatter.clone(),
            propagator: self.propagator.clone(),
        }
    }
}

impl<S, T, ReqBody, ResBody> Service<Request<ReqBody>> for HttpTrace<S, T>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
    T: Tracer + Send + Sync,
    T::Span: Send + Sync + 'static,
    ReqBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<S::Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let (parts, body) = req.into_parts();

        // Complete bypass: the inner service sees the request untouched.
        if let Some(filter) = &self.filter {
            if !filter(&parts) {
                return Box::pin(self.inner.call(Request::from_parts(parts, body)));
            }
        }

        let name = (self.formatter)(&self.operation, &parts);

        // Inbound traceparent/tracestate parent the server span when present.
        let parent_cx = propagation::extract_remote_context(self.propagator.as_ref(), &parts.headers);

        let builder = self
            .tracer
            .span_builder(name)
            .with_kind(SpanKind::Server)
            .with_attributes([
                KeyValue::new("http.request.method", parts.method.to_string()),
                KeyValue::new("url.path", parts.uri.path().to_string()),
            ]);
        let span = self.tracer.build_with_context(builder, &parent_cx);
        let cx = parent_cx.with_span(span);

        let mut req = Request::from_parts(parts, body);
        req.extensions_mut().insert(cx.clone());

        let propagator = self.propagator.clone();
        let fut = self.inner.call(req);

        Box::pin(async move {
            // A panicking handler unwinds through this await; `cx` is dropped
            // with it and the span still ends (end-on-drop), so cleanup holds
            // on every exit path while the panic keeps propagating.
            let mut result = fut.await;

            let span = cx.span();
            match &mut result {
                Ok(response) => {
                    let status = response.status();
                    span.set_attribute(KeyValue::new(
                        "http.response.status_code",
                        status.as_u16() as i64,
                    ));
                    if status.is_server_error() {
                        span.set_status(Status::error(format!("HTTP {}", status.as_u16())));
                    }
                    propagation::inject_context(propagator.as_ref(), &cx, response.headers_mut());
                }
                Err(_) => {
                    span.set_status(Status::error("request handler failed"));
                }
            }
            span.end();

            result
        })
    }
}
