// ABOUTME: Failure taxonomy of a chat turn and its mapping onto HTTP error bodies
// ABOUTME: Keeps raw provider text and the salvage candidate for the 500 response
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::recovery::Unrecoverable;
use crate::errors::{AppError, ErrorCode};
use crate::llm::GatewayError;
use serde_json::Value;
use thiserror::Error;

/// Everything that can abort a chat turn
///
/// None of these are retried; the caller decides.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Missing or malformed request fields
    #[error("{0}")]
    Validation(String),
    /// Persona, company, or conversation lookup failed
    #[error("{0}")]
    NotFound(String),
    /// The company's LLM label is not one the gateway can call
    #[error("Unsupported LLM type: {0}")]
    UnsupportedProvider(String),
    /// Network or provider failure
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    /// Provider payload matched neither response shape
    #[error("Unexpected LLM response structure")]
    UnexpectedResponseShape {
        /// Full provider payload
        raw: Value,
    },
    /// Salvage pipeline exhausted
    #[error(transparent)]
    UnrecoverableResponse(#[from] Unrecoverable),
    /// Persistence failure
    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<ChatError> for AppError {
    fn from(error: ChatError) -> Self {
        let message = error.to_string();
        match error {
            ChatError::Validation(_) => Self::missing_field(message),
            ChatError::NotFound(_) => Self::not_found(message),
            ChatError::UnsupportedProvider(label) => {
                Self::new(ErrorCode::UnsupportedProvider, message).with_detail("llm", label)
            }
            ChatError::Gateway(_) => Self::new(ErrorCode::LlmGatewayError, message),
            ChatError::UnexpectedResponseShape { raw } => {
                Self::new(ErrorCode::LlmUnexpectedResponse, message).with_detail("raw", raw)
            }
            ChatError::UnrecoverableResponse(failure) => {
                let error = Self::new(ErrorCode::LlmUnrecoverableResponse, message)
                    .with_detail("raw", failure.raw);
                match failure.cleaned {
                    Some(cleaned) => error.with_detail("cleaned", cleaned),
                    None => error,
                }
            }
            ChatError::Store(inner) => inner,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use persona_core::models::LlmKind;
    use serde_json::json;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ChatError::Validation("missing".into()), 400),
            (ChatError::NotFound("gone".into()), 404),
            (ChatError::UnsupportedProvider("Claude".into()), 400),
            (
                ChatError::Gateway(GatewayError::Status {
                    provider: LlmKind::Groq,
                    status: 503,
                    body: "down".into(),
                }),
                500,
            ),
            (
                ChatError::UnexpectedResponseShape { raw: json!({}) },
                500,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(AppError::from(error).http_status(), status);
        }
    }

    #[test]
    fn test_unrecoverable_carries_raw_and_cleaned() {
        let error = AppError::from(ChatError::UnrecoverableResponse(Unrecoverable {
            reason: "expected value".into(),
            raw: "Sure! {a: b c}".into(),
            cleaned: Some("{\"a\": \"b\" c}".into()),
        }));
        assert_eq!(error.code, ErrorCode::LlmUnrecoverableResponse);
        assert_eq!(error.details["raw"], "Sure! {a: b c}");
        assert_eq!(error.details["cleaned"], "{\"a\": \"b\" c}");
    }

    #[test]
    fn test_unexpected_shape_carries_payload() {
        let error = AppError::from(ChatError::UnexpectedResponseShape {
            raw: json!({"error": {"message": "quota"}}),
        });
        assert_eq!(error.message, "Unexpected LLM response structure");
        assert_eq!(error.details["raw"]["error"]["message"], "quota");
    }
}
