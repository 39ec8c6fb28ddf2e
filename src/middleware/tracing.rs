// ABOUTME: Request tracing middleware for correlation and structured logging
// ABOUTME: Builds the per-request span used by the HTTP trace layer

use axum::body::Body;
use axum::http::Request;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::TraceLayer;
use tracing::Span;

/// Create a tracing span for an HTTP request
///
/// Honors an incoming `x-request-id` header so client and server logs can be
/// correlated.
pub fn create_request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}

/// HTTP trace layer with request spans
#[must_use]
pub fn trace_layer(
) -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, fn(&Request<Body>) -> Span> {
    TraceLayer::new_for_http().make_span_with(create_request_span as fn(&Request<Body>) -> Span)
}
