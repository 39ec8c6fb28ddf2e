// ABOUTME: Unified error type with stable error codes and HTTP status mapping
// ABOUTME: Serializes to the flat {"error", "code", ...details} body the web client reads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling
//!
//! Every failure that crosses the HTTP boundary is an [`AppError`]: a stable
//! [`ErrorCode`], a human-readable message, and optional diagnostic details.
//! Details are flattened into the response body, so a failed chat turn can
//! carry the raw provider text (`raw`) and the salvage candidate (`cleaned`)
//! next to the `error` message.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Standard error codes used throughout the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation (400)
    /// Request payload failed a validation rule
    InvalidInput,
    /// A required field is missing from the request
    MissingRequiredField,
    /// The company is configured with an LLM the gateway cannot call
    UnsupportedProvider,

    // Resources (404/405)
    /// Referenced record is absent or soft-deleted
    ResourceNotFound,
    /// HTTP method not supported on this path
    MethodNotAllowed,

    // LLM provider (500)
    /// Network or provider-side failure while calling the LLM
    LlmGatewayError,
    /// Provider answered with a payload in neither known shape
    LlmUnexpectedResponse,
    /// The salvage pipeline could not recover a JSON object
    LlmUnrecoverableResponse,

    // Internal (500)
    /// Store operation failed
    DatabaseError,
    /// Payload could not be (de)serialized
    SerializationError,
    /// Anything else
    InternalError,
}

impl ErrorCode {
    /// HTTP status code for this error
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::InvalidInput | Self::MissingRequiredField | Self::UnsupportedProvider => 400,
            Self::ResourceNotFound => 404,
            Self::MethodNotAllowed => 405,
            Self::LlmGatewayError
            | Self::LlmUnexpectedResponse
            | Self::LlmUnrecoverableResponse
            | Self::DatabaseError
            | Self::SerializationError
            | Self::InternalError => 500,
        }
    }

    /// Short description used in logs
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::InvalidInput => "The provided input is invalid",
            Self::MissingRequiredField => "A required field is missing from the request",
            Self::UnsupportedProvider => "The configured LLM provider is not supported",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::MethodNotAllowed => "The HTTP method is not allowed on this resource",
            Self::LlmGatewayError => "The LLM provider request failed",
            Self::LlmUnexpectedResponse => "The LLM provider returned an unexpected payload",
            Self::LlmUnrecoverableResponse => "The LLM response could not be parsed",
            Self::DatabaseError => "Database operation failed",
            Self::SerializationError => "Data serialization/deserialization failed",
            Self::InternalError => "An internal server error occurred",
        }
    }
}

/// Unified error type for the service
#[derive(Debug, Error)]
#[error("{message}")]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message, sent to the client as `error`
    pub message: String,
    /// Diagnostic key/value pairs flattened into the response body
    pub details: Map<String, Value>,
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a new error with the given code and message
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: Map::new(),
        }
    }

    /// Attach one diagnostic detail
    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Invalid input
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Missing required field(s)
    #[must_use]
    pub fn missing_field(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MissingRequiredField, message)
    }

    /// Resource not found
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ResourceNotFound, message)
    }

    /// Database error
    #[must_use]
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Internal server error
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

/// HTTP error body: `{"error": "...", "code": "...", ...details}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message
    pub error: String,
    /// Stable error code
    pub code: ErrorCode,
    /// Flattened diagnostics (`raw`, `cleaned`, `detail`, ...)
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self {
            error: error.message,
            code: error.code,
            details: error.details,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(ErrorCode::SerializationError, error.to_string())
    }
}

#[cfg(feature = "database-errors")]
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        Self::database(format!("Database operation failed: {error}"))
    }
}

#[cfg(feature = "http-response")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = axum::http::StatusCode::from_u16(self.http_status())
            .unwrap_or(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        (status, axum::Json(ErrorResponse::from(self))).into_response()
    }
}
