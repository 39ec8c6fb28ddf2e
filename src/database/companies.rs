// ABOUTME: Company table migration and CRUD operations
// ABOUTME: Companies own personas and carry the LLM backend choice and its API key
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::Database;
use crate::audit::AuditContext;
use crate::errors::{AppError, AppResult};
use crate::models::{CompanyFields, CompanyRecord};
use anyhow::Result;
use persona_core::models::{CompanySize, LlmKind};

impl Database {
    /// Create the company table
    pub(super) async fn migrate_companies(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS company (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                industry TEXT NOT NULL,
                size TEXT,
                llm TEXT,
                llm_api_key TEXT NOT NULL,
                tags TEXT,
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

        Ok(())
    }

    /// Insert a company
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn insert_company(
        &self,
        fields: &CompanyFields,
        audit: &AuditContext,
    ) -> AppResult<CompanyRecord> {
        let now = AuditContext::now();

        sqlx::query_as::<_, CompanyRecord>(
            r"
            INSERT INTO company (name, industry, size, llm, llm_api_key, tags,
                created_by, created_date, changed_by, changed_date, changed_during_version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $7, $8, $9)
            RETURNING *
            ",
        )
        .bind(&fields.name)
        .bind(&fields.industry)
        .bind(fields.size.map(CompanySize::as_str))
        .bind(fields.llm.map(LlmKind::as_str))
        .bind(&fields.llm_api_key)
        .bind(&fields.tags)
        .bind(&audit.actor)
        .bind(&now)
        .bind(&audit.version)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create company: {e}")))
    }

    /// Update a company, returning `None` when it does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update_company(
        &self,
        id: i64,
        fields: &CompanyFields,
        audit: &AuditContext,
    ) -> AppResult<Option<CompanyRecord>> {
        sqlx::query_as::<_, CompanyRecord>(
            r"
            UPDATE company
            SET name = $1, industry = $2, size = $3, llm = $4, llm_api_key = $5, tags = $6,
                changed_by = $7, changed_date = $8, changed_during_version = $9
            WHERE id = $10 AND is_deleted = 0
            RETURNING *
            ",
        )
        .bind(&fields.name)
        .bind(&fields.industry)
        .bind(fields.size.map(CompanySize::as_str))
        .bind(fields.llm.map(LlmKind::as_str))
        .bind(&fields.llm_api_key)
        .bind(&fields.tags)
        .bind(&audit.actor)
        .bind(AuditContext::now())
        .bind(&audit.version)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update company: {e}")))
    }

    /// Get a non-deleted company
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_company(&self, id: i64) -> AppResult<Option<CompanyRecord>> {
        sqlx::query_as::<_, CompanyRecord>(
            "SELECT * FROM company WHERE id = $1 AND is_deleted = 0",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get company: {e}")))
    }

    /// List non-deleted companies
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_companies(&self) -> AppResult<Vec<CompanyRecord>> {
        sqlx::query_as::<_, CompanyRecord>(
            "SELECT * FROM company WHERE is_deleted = 0 ORDER BY sort_order ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list companies: {e}")))
    }

    /// Soft-delete a company; returns whether a live row was marked
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn soft_delete_company(&self, id: i64, audit: &AuditContext) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE company
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
        .map_err(|e| AppError::database(format!("Failed to delete company: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}
