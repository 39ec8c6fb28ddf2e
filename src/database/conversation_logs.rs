// ABOUTME: Conversation log table migration and CRUD operations
// ABOUTME: Appending a log row also refreshes the owning conversation's last-message time
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::Database;
use crate::audit::AuditContext;
use crate::errors::{AppError, AppResult};
use crate::models::{ConversationLogRecord, LogEntry};
use anyhow::Result;

/// Optional narrowing for log listings
///
/// Filtering by conversation also hides rows with `is_visible = 0`, which is
/// what the transcript view expects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogFilter {
    /// Only visible logs of this conversation
    pub conversation_id: Option<i64>,
}

impl Database {
    /// Create the conversation log table
    pub(super) async fn migrate_conversation_logs(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS conversation_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                conversation_id INTEGER NOT NULL REFERENCES conversation(id),
                is_visible INTEGER NOT NULL DEFAULT 1,
                is_persona_response INTEGER NOT NULL DEFAULT 0,
                statement TEXT,
                disposition TEXT,
                emoji TEXT,
                raw_response TEXT,
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
            "CREATE INDEX IF NOT EXISTS idx_conversation_log_conversation ON conversation_log(conversation_id, sort_order, id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Append a transcript row to an existing conversation
    ///
    /// The insert and the `date_last_message` refresh commit together.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the conversation does not exist, or a
    /// database error if either statement fails
    pub async fn append_log(
        &self,
        conversation_id: i64,
        entry: &LogEntry,
        audit: &AuditContext,
    ) -> AppResult<ConversationLogRecord> {
        if self.get_conversation(conversation_id).await?.is_none() {
            return Err(AppError::not_found(format!(
                "Conversation {conversation_id} not found"
            )));
        }

        let now = AuditContext::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        let record = sqlx::query_as::<_, ConversationLogRecord>(
            r"
            INSERT INTO conversation_log (conversation_id, is_visible, is_persona_response,
                statement, disposition, emoji, raw_response,
                created_by, created_date, changed_by, changed_date, changed_during_version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $8, $9, $10)
            RETURNING *
            ",
        )
        .bind(conversation_id)
        .bind(entry.is_visible)
        .bind(entry.is_persona_response)
        .bind(&entry.statement)
        .bind(&entry.disposition)
        .bind(&entry.emoji)
        .bind(&entry.raw_response)
        .bind(&audit.actor)
        .bind(&now)
        .bind(&audit.version)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to create conversation log: {e}")))?;

        sqlx::query("UPDATE conversation SET date_last_message = $1 WHERE id = $2")
            .bind(&now)
            .bind(conversation_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to touch conversation: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit transaction: {e}")))?;

        Ok(record)
    }

    /// Update a log row, returning `None` when it does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update_log(
        &self,
        id: i64,
        entry: &LogEntry,
        audit: &AuditContext,
    ) -> AppResult<Option<ConversationLogRecord>> {
        sqlx::query_as::<_, ConversationLogRecord>(
            r"
            UPDATE conversation_log
            SET is_visible = $1, is_persona_response = $2, statement = $3, disposition = $4,
                emoji = $5, raw_response = $6,
                changed_by = $7, changed_date = $8, changed_during_version = $9
            WHERE id = $10 AND is_deleted = 0
            RETURNING *
            ",
        )
        .bind(entry.is_visible)
        .bind(entry.is_persona_response)
        .bind(&entry.statement)
        .bind(&entry.disposition)
        .bind(&entry.emoji)
        .bind(&entry.raw_response)
        .bind(&audit.actor)
        .bind(AuditContext::now())
        .bind(&audit.version)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update conversation log: {e}")))
    }

    /// Get a non-deleted log row
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_log(&self, id: i64) -> AppResult<Option<ConversationLogRecord>> {
        sqlx::query_as::<_, ConversationLogRecord>(
            "SELECT * FROM conversation_log WHERE id = $1 AND is_deleted = 0",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get conversation log: {e}")))
    }

    /// List non-deleted log rows
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_logs(&self, filter: LogFilter) -> AppResult<Vec<ConversationLogRecord>> {
        let query = match filter.conversation_id {
            Some(conversation_id) => sqlx::query_as::<_, ConversationLogRecord>(
                r"
                SELECT * FROM conversation_log
                WHERE conversation_id = $1 AND is_visible = 1 AND is_deleted = 0
                ORDER BY sort_order ASC, id ASC
                ",
            )
            .bind(conversation_id),
            None => sqlx::query_as::<_, ConversationLogRecord>(
                "SELECT * FROM conversation_log WHERE is_deleted = 0 ORDER BY sort_order ASC, id ASC",
            ),
        };

        query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list conversation logs: {e}")))
    }

    /// Soft-delete a log row; returns whether a live row was marked
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn soft_delete_log(&self, id: i64, audit: &AuditContext) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE conversation_log
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
        .map_err(|e| AppError::database(format!("Failed to delete conversation log: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}
