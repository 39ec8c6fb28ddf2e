// ABOUTME: Conversation table migration and CRUD operations
// ABOUTME: Includes the lazily-opened conversation a first chat turn creates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::Database;
use crate::audit::AuditContext;
use crate::errors::{AppError, AppResult};
use crate::models::{ConversationFields, ConversationRecord};
use anyhow::Result;
use persona_core::models::ConversationState;

/// Optional narrowing for conversation listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversationFilter {
    /// Only conversations of this persona
    pub persona_id: Option<i64>,
}

impl ConversationFields {
    /// Fields of a conversation opened by a chat turn with no conversation id
    #[must_use]
    pub fn opened_by_chat(persona_id: i64) -> Self {
        Self {
            persona_id,
            name: String::new(),
            conversation_state: Some(ConversationState::Pending),
            conversation_summary: String::new(),
            message_count: 1,
            score: Some(0.0),
            keywords: String::new(),
            is_follow_up_needed: 0,
            next_step: String::new(),
        }
    }
}

impl Database {
    /// Create the conversation table
    pub(super) async fn migrate_conversations(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS conversation (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                persona_id INTEGER NOT NULL REFERENCES persona(id),
                name TEXT,
                conversation_state TEXT,
                conversation_summary TEXT,
                date_last_message TEXT,
                message_count INTEGER NOT NULL DEFAULT 0,
                score REAL,
                keywords TEXT,
                is_follow_up_needed INTEGER NOT NULL DEFAULT 0,
                next_step TEXT,
                is_deleted INTEGER NOT NULL DEFAULT 0,
                sort_order INTEGER NOT NULL DEFAULT 0,
                created_by TEXT,
                created_date TEXT,
                changed_by TEXT,
                changed_date TEXT,
                changed_during_version TEXT
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_conversation_persona ON conversation(persona_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a conversation under an existing persona
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the persona does not exist, or a
    /// database error if the insert fails
    pub async fn insert_conversation(
        &self,
        fields: &ConversationFields,
        audit: &AuditContext,
    ) -> AppResult<ConversationRecord> {
        if self.get_persona(fields.persona_id).await?.is_none() {
            return Err(AppError::not_found(format!(
                "Persona {} not found",
                fields.persona_id
            )));
        }

        let now = AuditContext::now();

        sqlx::query_as::<_, ConversationRecord>(
            r"
            INSERT INTO conversation (persona_id, name, conversation_state, conversation_summary,
                date_last_message, message_count, score, keywords, is_follow_up_needed, next_step,
                created_by, created_date, changed_by, changed_date, changed_during_version)
            VALUES ($1, $2, $3, $4, $10, $5, $6, $7, $8, $9, $11, $10, $11, $10, $12)
            RETURNING *
            ",
        )
        .bind(fields.persona_id)
        .bind(&fields.name)
        .bind(fields.conversation_state.map(ConversationState::as_str))
        .bind(&fields.conversation_summary)
        .bind(fields.message_count)
        .bind(fields.score)
        .bind(&fields.keywords)
        .bind(fields.is_follow_up_needed)
        .bind(&fields.next_step)
        .bind(&now)
        .bind(&audit.actor)
        .bind(&audit.version)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create conversation: {e}")))
    }

    /// Open the conversation a first chat turn lands in
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the persona does not exist, or a
    /// database error if the insert fails
    pub async fn open_conversation(
        &self,
        persona_id: i64,
        audit: &AuditContext,
    ) -> AppResult<ConversationRecord> {
        self.insert_conversation(&ConversationFields::opened_by_chat(persona_id), audit)
            .await
    }

    /// Update a conversation, returning `None` when it does not exist
    ///
    /// The owning persona is fixed at creation and is not changed here.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update_conversation(
        &self,
        id: i64,
        fields: &ConversationFields,
        audit: &AuditContext,
    ) -> AppResult<Option<ConversationRecord>> {
        let now = AuditContext::now();

        sqlx::query_as::<_, ConversationRecord>(
            r"
            UPDATE conversation
            SET name = $1, conversation_state = $2, conversation_summary = $3,
                date_last_message = $9, message_count = $4, score = $5, keywords = $6,
                is_follow_up_needed = $7, next_step = $8,
                changed_by = $10, changed_date = $9, changed_during_version = $11
            WHERE id = $12 AND is_deleted = 0
            RETURNING *
            ",
        )
        .bind(&fields.name)
        .bind(fields.conversation_state.map(ConversationState::as_str))
        .bind(&fields.conversation_summary)
        .bind(fields.message_count)
        .bind(fields.score)
        .bind(&fields.keywords)
        .bind(fields.is_follow_up_needed)
        .bind(&fields.next_step)
        .bind(&now)
        .bind(&audit.actor)
        .bind(&audit.version)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update conversation: {e}")))
    }

    /// Get a non-deleted conversation
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_conversation(&self, id: i64) -> AppResult<Option<ConversationRecord>> {
        sqlx::query_as::<_, ConversationRecord>(
            "SELECT * FROM conversation WHERE id = $1 AND is_deleted = 0",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get conversation: {e}")))
    }

    /// List non-deleted conversations, optionally for one persona
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_conversations(
        &self,
        filter: ConversationFilter,
    ) -> AppResult<Vec<ConversationRecord>> {
        let query = match filter.persona_id {
            Some(persona_id) => sqlx::query_as::<_, ConversationRecord>(
                r"
                SELECT * FROM conversation
                WHERE persona_id = $1 AND is_deleted = 0
                ORDER BY sort_order ASC, id ASC
                ",
            )
            .bind(persona_id),
            None => sqlx::query_as::<_, ConversationRecord>(
                "SELECT * FROM conversation WHERE is_deleted = 0 ORDER BY sort_order ASC, id ASC",
            ),
        };

        query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list conversations: {e}")))
    }

    /// Soft-delete a conversation; returns whether a live row was marked
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn soft_delete_conversation(
        &self,
        id: i64,
        audit: &AuditContext,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE conversation
            SET is_deleted = 1, changed_by = $1, changed_date = $2, changed_during_version = $3
            WHERE id = $4 AND is_deleted = 0
            ",
        )
        .bind(&audit.actor)
        .bind(AuditContext::now())
        .bind(&audit.version)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete conversation: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}
