// ABOUTME: reqwest-backed LLM gateway for the ChatGPT responses and Groq chat-completions APIs
// ABOUTME: Picks endpoint and body shape per provider and bounds every call with timeouts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use persona_core::constants::llm;
use persona_core::models::LlmKind;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, instrument};

use super::{ChatMessage, GatewayError, LlmGateway};
use crate::config::LlmConfig;

/// Characters of an error body kept in a `GatewayError`
const ERROR_BODY_EXCERPT: usize = 200;

// ============================================================================
// API Request Types
// ============================================================================

/// Responses-style request (`ChatGPT`)
#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: &'a [ChatMessage],
}

/// Chat-completions-style request (`Groq`)
#[derive(Debug, Serialize)]
struct ChatCompletionsRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

// ============================================================================
// Gateway Implementation
// ============================================================================

/// Gateway that calls the real provider endpoints over HTTPS
#[derive(Clone)]
pub struct HttpLlmGateway {
    client: Client,
    openai_responses_url: String,
    groq_chat_completions_url: String,
}

impl HttpLlmGateway {
    /// Build the HTTP client with the configured timeouts
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized
    pub fn new(config: &LlmConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            openai_responses_url: config.openai_responses_url.clone(),
            groq_chat_completions_url: config.groq_chat_completions_url.clone(),
        })
    }

    /// Endpoint for a provider
    fn endpoint(&self, provider: LlmKind) -> &str {
        match provider {
            LlmKind::ChatGpt => &self.openai_responses_url,
            LlmKind::Groq => &self.groq_chat_completions_url,
        }
    }

    /// Request body in the shape the provider expects
    fn request_body(provider: LlmKind, messages: &[ChatMessage]) -> Result<Value, GatewayError> {
        let body = match provider {
            LlmKind::ChatGpt => serde_json::to_value(ResponsesRequest {
                model: llm::OPENAI_MODEL,
                input: messages,
            }),
            LlmKind::Groq => serde_json::to_value(ChatCompletionsRequest {
                model: llm::GROQ_MODEL,
                messages,
            }),
        };

        body.map_err(|e| GatewayError::Transport {
            provider,
            message: format!("Failed to encode request: {e}"),
        })
    }

    /// Convert a reqwest failure, naming timeouts explicitly
    fn transport_error(provider: LlmKind, e: &reqwest::Error) -> GatewayError {
        let message = if e.is_timeout() {
            format!("request timed out: {e}")
        } else if e.is_connect() {
            format!("failed to connect: {e}")
        } else {
            e.to_string()
        };
        GatewayError::Transport { provider, message }
    }
}

#[async_trait]
impl LlmGateway for HttpLlmGateway {
    #[instrument(skip(self, api_key, messages), fields(provider = %provider, messages = messages.len()))]
    async fn complete(
        &self,
        provider: LlmKind,
        api_key: &str,
        messages: &[ChatMessage],
    ) -> Result<Value, GatewayError> {
        let body = Self::request_body(provider, messages)?;

        debug!("Sending chat request to {provider}");

        let response = self
            .client
            .post(self.endpoint(provider))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send request to {provider}: {e}");
                Self::transport_error(provider, &e)
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            error!("Failed to read {provider} response: {e}");
            Self::transport_error(provider, &e)
        })?;

        if !status.is_success() {
            error!("{provider} returned HTTP {status}");
            return Err(GatewayError::Status {
                provider,
                status: status.as_u16(),
                body: text.chars().take(ERROR_BODY_EXCERPT).collect(),
            });
        }

        serde_json::from_str(&text).map_err(|e| GatewayError::Decode {
            provider,
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chatgpt_body_uses_input() {
        let body =
            HttpLlmGateway::request_body(LlmKind::ChatGpt, &[ChatMessage::system("be brief")])
                .unwrap();
        assert_eq!(
            body,
            json!({"model": "gpt-4o", "input": [{"role": "system", "content": "be brief"}]})
        );
    }

    #[test]
    fn test_groq_body_uses_messages() {
        let body = HttpLlmGateway::request_body(
            LlmKind::Groq,
            &[ChatMessage::system("s"), ChatMessage::user("u")],
        )
        .unwrap();
        assert_eq!(body["model"], "llama-3.3-70b-versatile");
        assert_eq!(body["messages"][1], json!({"role": "user", "content": "u"}));
        assert!(body.get("input").is_none());
    }

    #[test]
    fn test_endpoint_per_provider() {
        let config = LlmConfig {
            openai_responses_url: "http://openai.test/v1/responses".to_owned(),
            groq_chat_completions_url: "http://groq.test/v1/chat/completions".to_owned(),
            ..LlmConfig::default()
        };
        let gateway = HttpLlmGateway::new(&config).unwrap();
        assert_eq!(
            gateway.endpoint(LlmKind::ChatGpt),
            "http://openai.test/v1/responses"
        );
        assert_eq!(
            gateway.endpoint(LlmKind::Groq),
            "http://groq.test/v1/chat/completions"
        );
    }
}
