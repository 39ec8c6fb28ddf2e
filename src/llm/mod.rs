// ABOUTME: LLM gateway abstraction: message types, the gateway trait, and its error type
// ABOUTME: Also extracts the assistant text from either supported provider response shape
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # LLM Gateway
//!
//! A chat turn talks to exactly one provider, chosen by the company record:
//!
//! - **`ChatGPT`**: responses-style endpoint, body `{model, input}`
//! - **`Groq`**: chat-completions-style endpoint, body `{model, messages}`
//!
//! [`LlmGateway`] takes an already-resolved [`LlmKind`], so an unsupported
//! provider label can never reach the network. The gateway hands back the
//! provider's JSON payload untouched; [`extract_response_text`] pulls the
//! assistant text out of it.
//!
//! ```rust,no_run
//! use persona_chat_server::llm::{ChatMessage, HttpLlmGateway, LlmGateway};
//! use persona_chat_server::config::LlmConfig;
//! use persona_core::models::LlmKind;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let gateway = HttpLlmGateway::new(&LlmConfig::default())?;
//!     let payload = gateway
//!         .complete(LlmKind::Groq, "gsk_...", &[ChatMessage::user("Hello")])
//!         .await?;
//!     println!("{:?}", persona_chat_server::llm::extract_response_text(&payload));
//!     Ok(())
//! }
//! ```

mod gateway;

pub use gateway::HttpLlmGateway;

use async_trait::async_trait;
use persona_core::models::LlmKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// Message Types
// ============================================================================

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Persona instructions
    System,
    /// The person chatting with the persona
    User,
    /// The persona's earlier replies
    Assistant,
}

impl MessageRole {
    /// Convert to string representation for API calls
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single message sent to the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: MessageRole,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// Create a new chat message
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system message
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Create a user message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Create an assistant message
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Network or provider failure while completing a chat
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request never produced a response (connect failure, timeout, TLS)
    #[error("{provider} request failed: {message}")]
    Transport {
        /// Provider that was called
        provider: LlmKind,
        /// Underlying cause
        message: String,
    },
    /// The provider answered with a non-success status
    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        /// Provider that was called
        provider: LlmKind,
        /// HTTP status code
        status: u16,
        /// Leading part of the response body
        body: String,
    },
    /// The provider answered 2xx with a body that is not JSON
    #[error("{provider} returned an unreadable body: {message}")]
    Decode {
        /// Provider that was called
        provider: LlmKind,
        /// Underlying cause
        message: String,
    },
}

// ============================================================================
// Gateway Trait
// ============================================================================

/// Sends an assembled message sequence to a provider
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Complete a chat and return the provider's JSON payload as received
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] on transport failure, timeout, non-2xx
    /// status, or a non-JSON body. Nothing is retried.
    async fn complete(
        &self,
        provider: LlmKind,
        api_key: &str,
        messages: &[ChatMessage],
    ) -> Result<Value, GatewayError>;
}

/// Pull the assistant text out of a provider payload
///
/// Chat-completions shape (`choices[0].message.content`) is checked first,
/// then responses shape (`output[0].content[0].text`). Blank text counts as
/// missing. Returns `None` when neither shape matches.
#[must_use]
pub fn extract_response_text(payload: &Value) -> Option<String> {
    let chat_completions = payload
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str);
    let responses = payload
        .pointer("/output/0/content/0/text")
        .and_then(Value::as_str);

    [chat_completions, responses]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(ToOwned::to_owned)
}
