// ABOUTME: CORS middleware configuration for HTTP API endpoints
// ABOUTME: Lets the browser client on another origin call the CRUD and chat routes
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::config::ServerConfig;
use axum::http::{header, HeaderValue, Method};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// How long browsers may cache a preflight answer
const PREFLIGHT_MAX_AGE_SECS: u64 = 86_400;

/// Configure CORS from `CORS_ALLOWED_ORIGINS`
///
/// `*` (or a list with no parseable origin) allows any origin without
/// credentials. An explicit list allows exactly those origins and permits
/// credentials.
///
/// ```bash
/// # Default: the web client dev server
/// export CORS_ALLOWED_ORIGINS="http://localhost:3000"
///
/// # Several deployments
/// export CORS_ALLOWED_ORIGINS="https://app.example.com,https://staging.example.com"
/// ```
#[must_use]
pub fn setup_cors(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = if config.allows_any_origin() {
        Vec::new()
    } else {
        config
            .cors_allowed_origins
            .iter()
            .filter_map(|origin| HeaderValue::from_str(origin).ok())
            .collect()
    };

    let layer = CorsLayer::new()
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .max_age(Duration::from_secs(PREFLIGHT_MAX_AGE_SECS));

    if origins.is_empty() {
        layer.allow_origin(AllowOrigin::any())
    } else {
        layer
            .allow_origin(AllowOrigin::list(origins))
            .allow_credentials(true)
    }
}
