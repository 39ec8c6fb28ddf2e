// ABOUTME: HTTP middleware for request tracing and cross-origin access
// ABOUTME: Provides the CORS layer and the per-request tracing span

/// CORS layer built from server configuration
pub mod cors;
/// Request spans and the HTTP trace layer
pub mod tracing;

// CORS configuration
pub use cors::setup_cors;

// Request tracing
pub use tracing::{create_request_span, trace_layer};
