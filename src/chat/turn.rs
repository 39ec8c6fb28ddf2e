// ABOUTME: Chat turn orchestration from request to persisted persona reply
// ABOUTME: Loads context and history, calls the gateway, salvages the reply, and writes the transcript
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::error::ChatError;
use super::prompt::compose_messages;
use super::recovery::ResponseRecovery;
use crate::audit::AuditContext;
use crate::database::Database;
use crate::llm::{extract_response_text, LlmGateway};
use crate::models::{deserialize_optional_int, LogEntry};
use persona_core::constants::defaults;
use persona_core::models::LlmKind;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// `POST /chat` body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatTurnRequest {
    /// Persona answering the question
    #[serde(default, deserialize_with = "deserialize_optional_int")]
    pub persona_id: Option<i64>,
    /// Existing conversation, absent on the first turn
    #[serde(default, deserialize_with = "deserialize_optional_int")]
    pub conversation_id: Option<i64>,
    /// The question put to the persona
    #[serde(default)]
    pub user_question: Option<String>,
}

/// `POST /chat` success body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurnReply {
    /// Conversation the turn was written to
    pub conversation_id: i64,
    /// What the persona said
    pub response: Option<String>,
    /// The persona's new disposition
    pub disposition: Option<String>,
    /// Disposition emoji
    pub emoji: Option<String>,
}

/// Runs chat turns against the store and an LLM gateway
#[derive(Clone)]
pub struct ChatTurnService {
    database: Database,
    gateway: Arc<dyn LlmGateway>,
    recovery: ResponseRecovery,
}

impl ChatTurnService {
    /// Create the service
    ///
    /// # Errors
    ///
    /// Returns an error if the salvage patterns fail to compile
    pub fn new(database: Database, gateway: Arc<dyn LlmGateway>) -> Result<Self, regex::Error> {
        Ok(Self {
            database,
            gateway,
            recovery: ResponseRecovery::new()?,
        })
    }

    /// Run one chat turn
    ///
    /// Nothing is written until the persona, its company, the conversation
    /// owner, and the provider have all checked out. After that the user's
    /// question is logged before the provider is called, so a failed reply
    /// still leaves the question in the transcript.
    ///
    /// # Errors
    ///
    /// Returns a [`ChatError`] for missing fields, unknown persona or
    /// conversation, unsupported provider, gateway failure, an unexpected
    /// payload shape, an unrecoverable reply, or a store failure.
    #[instrument(skip(self, request, audit), fields(persona_id = ?request.persona_id, conversation_id = ?request.conversation_id))]
    pub async fn run(
        &self,
        request: ChatTurnRequest,
        audit: &AuditContext,
    ) -> Result<ChatTurnReply, ChatError> {
        let question = request
            .user_question
            .filter(|question| !question.trim().is_empty());
        let (Some(persona_id), Some(question)) = (request.persona_id, question) else {
            return Err(ChatError::Validation(
                "Missing required fields: persona_id or user_question".to_owned(),
            ));
        };
        let requested_conversation = request.conversation_id;

        let (context, history, owned) = tokio::try_join!(
            self.database
                .load_turn_context(requested_conversation, persona_id),
            self.database
                .recent_history(requested_conversation, defaults::HISTORY_WINDOW),
            async {
                match requested_conversation {
                    Some(id) => self
                        .database
                        .conversation_belongs_to(id, persona_id)
                        .await
                        .map(Some),
                    None => Ok(None),
                }
            },
        )?;

        let context = context.ok_or_else(|| {
            ChatError::NotFound(
                "Persona or company data not found for the given persona_id.".to_owned(),
            )
        })?;
        if owned == Some(false) {
            return Err(ChatError::NotFound(format!(
                "Conversation {} not found for persona {persona_id}.",
                requested_conversation.unwrap_or_default()
            )));
        }

        let label = context.llm.clone().unwrap_or_default();
        let provider: LlmKind = label
            .parse()
            .map_err(|_| ChatError::UnsupportedProvider(label))?;

        let messages = compose_messages(&context, &history, &question);

        let conversation_id = match requested_conversation {
            Some(id) => id,
            None => {
                let conversation = self.database.open_conversation(persona_id, audit).await?;
                info!(
                    conversation_id = conversation.id,
                    persona_id, "Opened conversation for first chat turn"
                );
                conversation.id
            }
        };

        self.database
            .append_log(conversation_id, &LogEntry::user_turn(&question), audit)
            .await?;

        let payload = self
            .gateway
            .complete(provider, &context.llm_api_key, &messages)
            .await?;

        let Some(text) = extract_response_text(&payload) else {
            error!(%payload, "LLM response structure unexpected");
            return Err(ChatError::UnexpectedResponseShape { raw: payload });
        };

        let reply = self.recovery.recover(&text)?;

        self.database
            .append_log(
                conversation_id,
                &LogEntry::persona_turn(
                    reply.response.clone(),
                    reply.disposition.clone(),
                    reply.emoji.clone(),
                    payload.to_string(),
                ),
                audit,
            )
            .await?;

        info!(
            conversation_id,
            %provider,
            stage = ?reply.stage,
            history = history.len(),
            "Chat turn completed"
        );

        Ok(ChatTurnReply {
            conversation_id,
            response: reply.response,
            disposition: reply.disposition,
            emoji: reply.emoji,
        })
    }
}
