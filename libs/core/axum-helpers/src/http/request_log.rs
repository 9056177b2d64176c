//! Per-request spans and access log lines.
//!
//! Every request gets an `http_request` span with method, path and query.
//! Headers are logged at debug level when the request starts. The response
//! line carries status, reason phrase and latency; 5xx responses are logged
//! at error level.

use axum::http::{Request, Response};
use std::time::Duration;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{MakeSpan, OnRequest, OnResponse, TraceLayer};
use tracing::{Span, field};

pub type RequestTraceLayer =
    TraceLayer<SharedClassifier<ServerErrorsAsFailures>, RequestSpan, RequestLog, ResponseLog>;

pub fn request_trace_layer() -> RequestTraceLayer {
    TraceLayer::new_for_http()
        .make_span_with(RequestSpan)
        .on_request(RequestLog)
        .on_response(ResponseLog)
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RequestSpan;

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            path = %request.uri().path(),
            query = request.uri().query().unwrap_or(""),
            status = field::Empty,
        )
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RequestLog;

impl<B> OnRequest<B> for RequestLog {
    fn on_request(&mut self, request: &Request<B>, _span: &Span) {
        tracing::debug!(headers = ?request.headers(), "started processing request");
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ResponseLog;

impl<B> OnResponse<B> for ResponseLog {
    fn on_response(self, response: &Response<B>, latency: Duration, span: &Span) {
        let status = response.status();
        span.record("status", status.as_u16());

        let reason = status.canonical_reason().unwrap_or("");
        let latency_ms = latency.as_millis() as u64;

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), reason, latency_ms, "finished processing request");
        } else {
            tracing::info!(status = status.as_u16(), reason, latency_ms, "finished processing request");
        }
    }
}
