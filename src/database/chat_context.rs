// ABOUTME: Read queries backing a chat turn: persona/company traits and the history window
// ABOUTME: The trait query also carries the persona's most recent disposition in the conversation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::Database;
use crate::errors::{AppError, AppResult};
use persona_core::constants::defaults;
use std::fmt;

/// Company and persona traits joined for one chat turn
#[derive(Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct TurnContext {
    /// Company name
    pub company_name: String,
    /// Company industry
    pub industry: String,
    /// Company size label
    pub size: Option<String>,
    /// Configured LLM label
    pub llm: Option<String>,
    /// Provider API key
    pub llm_api_key: String,
    /// Company tags
    pub tags: Option<String>,
    /// Persona name
    pub persona_name: String,
    /// Persona age
    pub age: Option<i64>,
    /// Gender label
    pub gender: Option<String>,
    /// Branch location
    pub location: Option<String>,
    /// Job title
    pub job_title: Option<String>,
    /// Interests
    pub interests: Option<String>,
    /// Challenges
    pub challenges: Option<String>,
    /// Joy baseline
    pub base_emotion_joy: Option<String>,
    /// Trust baseline
    pub base_emotion_trust: Option<String>,
    /// Fear baseline
    pub base_emotion_fear: Option<String>,
    /// Surprise baseline
    pub base_emotion_surprise: Option<String>,
    /// Sadness baseline
    pub base_emotion_sadness: Option<String>,
    /// Disgust baseline
    pub base_emotion_disgust: Option<String>,
    /// Anger baseline
    pub base_emotion_anger: Option<String>,
    /// Anticipation baseline
    pub base_emotion_anticipation: Option<String>,
    /// Disposition of the newest log row, `"None"` when there is none
    pub last_disposition: String,
}

// The API key stays out of log output
impl fmt::Debug for TurnContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TurnContext")
            .field("company_name", &self.company_name)
            .field("llm", &self.llm)
            .field("llm_api_key", &"[REDACTED]")
            .field("persona_name", &self.persona_name)
            .field("last_disposition", &self.last_disposition)
            .finish_non_exhaustive()
    }
}

/// One transcript row inside the history window
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct HistoryRow {
    /// Primary key
    pub id: i64,
    /// Manual ordering
    pub sort_order: i64,
    /// 0 = user turn, 1 = persona turn
    pub is_persona_response: i64,
    /// Spoken text
    pub statement: Option<String>,
}

impl Database {
    /// Load the traits for a chat turn
    ///
    /// Returns `None` when the persona or its company is missing or
    /// soft-deleted. `conversation_id` only affects `last_disposition`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn load_turn_context(
        &self,
        conversation_id: Option<i64>,
        persona_id: i64,
    ) -> AppResult<Option<TurnContext>> {
        sqlx::query_as::<_, TurnContext>(
            r"
            SELECT c.name AS company_name,
                   c.industry,
                   c.size,
                   c.llm,
                   c.llm_api_key,
                   c.tags,
                   p.name AS persona_name,
                   p.age,
                   p.gender,
                   p.location,
                   p.job_title,
                   p.interests,
                   p.challenges,
                   p.base_emotion_joy,
                   p.base_emotion_trust,
                   p.base_emotion_fear,
                   p.base_emotion_surprise,
                   p.base_emotion_sadness,
                   p.base_emotion_disgust,
                   p.base_emotion_anger,
                   p.base_emotion_anticipation,
                   COALESCE((
                       SELECT NULLIF(cl.disposition, '')
                       FROM conversation cov
                       JOIN conversation_log cl ON cov.id = cl.conversation_id
                       WHERE cov.id = $1
                         AND cov.persona_id = p.id
                         AND cov.is_deleted = 0
                         AND cl.is_deleted = 0
                       ORDER BY cl.id DESC
                       LIMIT 1
                   ), $3) AS last_disposition
            FROM company c
            JOIN persona p ON c.id = p.company_id
            WHERE c.is_deleted = 0
              AND p.is_deleted = 0
              AND p.id = $2
            ",
        )
        .bind(conversation_id)
        .bind(persona_id)
        .bind(defaults::NO_DISPOSITION)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load chat context: {e}")))
    }

    /// The newest `limit` log rows of a conversation, oldest first
    ///
    /// With no conversation there is no history and no query is issued.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn recent_history(
        &self,
        conversation_id: Option<i64>,
        limit: i64,
    ) -> AppResult<Vec<HistoryRow>> {
        let Some(conversation_id) = conversation_id else {
            return Ok(Vec::new());
        };

        sqlx::query_as::<_, HistoryRow>(
            r"
            SELECT id, sort_order, is_persona_response, statement
            FROM (
                SELECT id, sort_order, is_persona_response, statement
                FROM conversation_log
                WHERE conversation_id = $1 AND is_deleted = 0
                ORDER BY sort_order DESC, id DESC
                LIMIT $2
            )
            ORDER BY sort_order ASC, id ASC
            ",
        )
        .bind(conversation_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load chat history: {e}")))
    }

    /// Whether a live conversation exists and is owned by the persona
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn conversation_belongs_to(
        &self,
        conversation_id: i64,
        persona_id: i64,
    ) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM conversation
            WHERE id = $1 AND persona_id = $2 AND is_deleted = 0
            ",
        )
        .bind(conversation_id)
        .bind(persona_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to check conversation owner: {e}")))?;

        Ok(count > 0)
    }
}
