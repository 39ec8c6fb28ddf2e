// ABOUTME: Persona table migration and CRUD operations
// ABOUTME: Personas belong to a company and carry profile text plus eight emotion baselines
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::Database;
use crate::audit::AuditContext;
use crate::errors::{AppError, AppResult};
use crate::models::{PersonaFields, PersonaRecord};
use anyhow::Result;
use persona_core::models::{EmotionLevel, Gender};

/// Optional narrowing for persona listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersonaFilter {
    /// Only personas of this company
    pub company_id: Option<i64>,
}

impl Database {
    /// Create the persona table
    pub(super) async fn migrate_personas(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS persona (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                company_id INTEGER NOT NULL REFERENCES company(id),
                name TEXT NOT NULL,
                age INTEGER DEFAULT 20,
                gender TEXT,
                location TEXT,
                job_title TEXT,
                interests TEXT,
                challenges TEXT,
                base_emotion_joy TEXT,
                base_emotion_trust TEXT,
                base_emotion_fear TEXT,
                base_emotion_surprise TEXT,
                base_emotion_sadness TEXT,
                base_emotion_disgust TEXT,
                base_emotion_anger TEXT,
                base_emotion_anticipation TEXT,
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

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_persona_company ON persona(company_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Fail with `ResourceNotFound` unless the company is live
    async fn require_company(&self, company_id: i64) -> AppResult<()> {
        if self.get_company(company_id).await?.is_none() {
            return Err(AppError::not_found(format!("Company {company_id} not found")));
        }
        Ok(())
    }

    /// Insert a persona under an existing company
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the company does not exist, or a
    /// database error if the insert fails
    pub async fn insert_persona(
        &self,
        fields: &PersonaFields,
        audit: &AuditContext,
    ) -> AppResult<PersonaRecord> {
        self.require_company(fields.company_id).await?;

        let now = AuditContext::now();
        let [joy, trust, fear, surprise, sadness, disgust, anger, anticipation] =
            fields.emotions.map(|level| level.map(EmotionLevel::as_str));

        sqlx::query_as::<_, PersonaRecord>(
            r"
            INSERT INTO persona (company_id, name, age, gender, location, job_title, interests, challenges,
                base_emotion_joy, base_emotion_trust, base_emotion_fear, base_emotion_surprise,
                base_emotion_sadness, base_emotion_disgust, base_emotion_anger, base_emotion_anticipation,
                created_by, created_date, changed_by, changed_date, changed_during_version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                $17, $18, $17, $18, $19)
            RETURNING *
            ",
        )
        .bind(fields.company_id)
        .bind(&fields.name)
        .bind(fields.age)
        .bind(fields.gender.map(Gender::as_str))
        .bind(&fields.location)
        .bind(&fields.job_title)
        .bind(&fields.interests)
        .bind(&fields.challenges)
        .bind(joy)
        .bind(trust)
        .bind(fear)
        .bind(surprise)
        .bind(sadness)
        .bind(disgust)
        .bind(anger)
        .bind(anticipation)
        .bind(&audit.actor)
        .bind(&now)
        .bind(&audit.version)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create persona: {e}")))
    }

    /// Update a persona, returning `None` when it does not exist
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the new company does not exist, or a
    /// database error if the update fails
    pub async fn update_persona(
        &self,
        id: i64,
        fields: &PersonaFields,
        audit: &AuditContext,
    ) -> AppResult<Option<PersonaRecord>> {
        self.require_company(fields.company_id).await?;

        let [joy, trust, fear, surprise, sadness, disgust, anger, anticipation] =
            fields.emotions.map(|level| level.map(EmotionLevel::as_str));

        sqlx::query_as::<_, PersonaRecord>(
            r"
            UPDATE persona
            SET company_id = $1, name = $2, age = $3, gender = $4, location = $5, job_title = $6,
                interests = $7, challenges = $8,
                base_emotion_joy = $9, base_emotion_trust = $10, base_emotion_fear = $11,
                base_emotion_surprise = $12, base_emotion_sadness = $13, base_emotion_disgust = $14,
                base_emotion_anger = $15, base_emotion_anticipation = $16,
                changed_by = $17, changed_date = $18, changed_during_version = $19
            WHERE id = $20 AND is_deleted = 0
            RETURNING *
            ",
        )
        .bind(fields.company_id)
        .bind(&fields.name)
        .bind(fields.age)
        .bind(fields.gender.map(Gender::as_str))
        .bind(&fields.location)
        .bind(&fields.job_title)
        .bind(&fields.interests)
        .bind(&fields.challenges)
        .bind(joy)
        .bind(trust)
        .bind(fear)
        .bind(surprise)
        .bind(sadness)
        .bind(disgust)
        .bind(anger)
        .bind(anticipation)
        .bind(&audit.actor)
        .bind(AuditContext::now())
        .bind(&audit.version)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update persona: {e}")))
    }

    /// Get a non-deleted persona
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_persona(&self, id: i64) -> AppResult<Option<PersonaRecord>> {
        sqlx::query_as::<_, PersonaRecord>(
            "SELECT * FROM persona WHERE id = $1 AND is_deleted = 0",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get persona: {e}")))
    }

    /// List non-deleted personas, optionally for one company
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_personas(&self, filter: PersonaFilter) -> AppResult<Vec<PersonaRecord>> {
        let query = match filter.company_id {
            Some(company_id) => sqlx::query_as::<_, PersonaRecord>(
                r"
                SELECT * FROM persona
                WHERE company_id = $1 AND is_deleted = 0
                ORDER BY sort_order ASC, id ASC
                ",
            )
            .bind(company_id),
            None => sqlx::query_as::<_, PersonaRecord>(
                "SELECT * FROM persona WHERE is_deleted = 0 ORDER BY sort_order ASC, id ASC",
            ),
        };

        query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list personas: {e}")))
    }

    /// Soft-delete a persona; returns whether a live row was marked
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn soft_delete_persona(&self, id: i64, audit: &AuditContext) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE persona
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
        .map_err(|e| AppError::database(format!("Failed to delete persona: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}
