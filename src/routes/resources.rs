// ABOUTME: Generic CRUD routes over the closed set of persona chat resources
// ABOUTME: Dispatches list/get/create/update/delete to the matching store operations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Resource routes
//!
//! `/{resource}` and `/{resource}/{id}` for `company`, `persona`,
//! `conversation`, and `conversation_log`. The path segment is parsed into a
//! [`Resource`] before anything touches the store, so table names never come
//! from the request.

use crate::audit::AuditContext;
use crate::database::{ConversationFilter, Database, LogFilter, PersonaFilter};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::{
    deserialize_optional_int, CompanyInput, ConversationInput, ConversationLogInput, PersonaInput,
};
use crate::server::AppState;
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

/// The resources exposed through the generic CRUD surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// `company`
    Company,
    /// `persona`
    Persona,
    /// `conversation`
    Conversation,
    /// `conversation_log`
    ConversationLog,
}

impl FromStr for Resource {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "company" => Ok(Self::Company),
            "persona" => Ok(Self::Persona),
            "conversation" => Ok(Self::Conversation),
            "conversation_log" => Ok(Self::ConversationLog),
            _ => Err(AppError::invalid_input("Invalid table")),
        }
    }
}

/// Listing filters; each applies only to its own resource
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    /// Personas of one company
    #[serde(default, deserialize_with = "deserialize_optional_int")]
    pub company_id: Option<i64>,
    /// Conversations of one persona
    #[serde(default, deserialize_with = "deserialize_optional_int")]
    pub persona_id: Option<i64>,
    /// Visible logs of one conversation
    #[serde(default, deserialize_with = "deserialize_optional_int")]
    pub conversation_id: Option<i64>,
}

/// Decode a request body into the resource's input type
fn decode<T: DeserializeOwned>(body: Value) -> AppResult<T> {
    serde_json::from_value(body)
        .map_err(|e| AppError::invalid_input(format!("Invalid request body: {e}")))
}

/// Serialize a record, or report it missing
fn found<T: serde::Serialize>(record: Option<T>, resource: Resource, id: i64) -> AppResult<Value> {
    let record = record.ok_or_else(|| resource.not_found(id))?;
    Ok(serde_json::to_value(record)?)
}

impl Resource {
    /// Name used in messages
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Company => "Company",
            Self::Persona => "Persona",
            Self::Conversation => "Conversation",
            Self::ConversationLog => "Conversation log",
        }
    }

    fn not_found(self, id: i64) -> AppError {
        AppError::not_found(format!("{} {id} not found", self.label()))
    }

    /// List live rows
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails
    pub async fn list(self, db: &Database, query: &ListQuery) -> AppResult<Value> {
        let rows = match self {
            Self::Company => serde_json::to_value(db.list_companies().await?)?,
            Self::Persona => serde_json::to_value(
                db.list_personas(PersonaFilter {
                    company_id: query.company_id,
                })
                .await?,
            )?,
            Self::Conversation => serde_json::to_value(
                db.list_conversations(ConversationFilter {
                    persona_id: query.persona_id,
                })
                .await?,
            )?,
            Self::ConversationLog => serde_json::to_value(
                db.list_logs(LogFilter {
                    conversation_id: query.conversation_id,
                })
                .await?,
            )?,
        };
        Ok(rows)
    }

    /// Get one live row
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for absent or soft-deleted rows
    pub async fn get(self, db: &Database, id: i64) -> AppResult<Value> {
        match self {
            Self::Company => found(db.get_company(id).await?, self, id),
            Self::Persona => found(db.get_persona(id).await?, self, id),
            Self::Conversation => found(db.get_conversation(id).await?, self, id),
            Self::ConversationLog => found(db.get_log(id).await?, self, id),
        }
    }

    /// Validate and insert a row
    ///
    /// # Errors
    ///
    /// Returns a 400-class error for invalid bodies, `ResourceNotFound` for a
    /// missing parent, or a database error
    pub async fn create(self, db: &Database, body: Value, audit: &AuditContext) -> AppResult<Value> {
        let record = match self {
            Self::Company => {
                let fields = decode::<CompanyInput>(body)?.validate()?;
                serde_json::to_value(db.insert_company(&fields, audit).await?)?
            }
            Self::Persona => {
                let fields = decode::<PersonaInput>(body)?.validate()?;
                serde_json::to_value(db.insert_persona(&fields, audit).await?)?
            }
            Self::Conversation => {
                let fields = decode::<ConversationInput>(body)?.validate()?;
                serde_json::to_value(db.insert_conversation(&fields, audit).await?)?
            }
            Self::ConversationLog => {
                let (conversation_id, entry) = decode::<ConversationLogInput>(body)?.into_entry();
                let conversation_id = conversation_id.ok_or_else(|| {
                    AppError::missing_field("Conversation ID is required for conversation log.")
                })?;
                serde_json::to_value(db.append_log(conversation_id, &entry, audit).await?)?
            }
        };
        Ok(record)
    }

    /// Validate and update a row
    ///
    /// # Errors
    ///
    /// Returns a 400-class error for invalid bodies, `ResourceNotFound` when
    /// the row is absent, or a database error
    pub async fn update(
        self,
        db: &Database,
        id: i64,
        body: Value,
        audit: &AuditContext,
    ) -> AppResult<Value> {
        match self {
            Self::Company => {
                let fields = decode::<CompanyInput>(body)?.validate()?;
                found(db.update_company(id, &fields, audit).await?, self, id)
            }
            Self::Persona => {
                let fields = decode::<PersonaInput>(body)?.validate()?;
                found(db.update_persona(id, &fields, audit).await?, self, id)
            }
            Self::Conversation => {
                let fields = decode::<ConversationInput>(body)?.validate()?;
                found(db.update_conversation(id, &fields, audit).await?, self, id)
            }
            Self::ConversationLog => {
                let (_, entry) = decode::<ConversationLogInput>(body)?.into_entry();
                found(db.update_log(id, &entry, audit).await?, self, id)
            }
        }
    }

    /// Soft-delete a row
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when no live row matched
    pub async fn delete(self, db: &Database, id: i64, audit: &AuditContext) -> AppResult<()> {
        let deleted = match self {
            Self::Company => db.soft_delete_company(id, audit).await?,
            Self::Persona => db.soft_delete_persona(id, audit).await?,
            Self::Conversation => db.soft_delete_conversation(id, audit).await?,
            Self::ConversationLog => db.soft_delete_log(id, audit).await?,
        };
        if deleted {
            Ok(())
        } else {
            Err(self.not_found(id))
        }
    }
}

// ============================================================================
// Routes
// ============================================================================

/// Resource routes handler
pub struct ResourceRoutes;

impl ResourceRoutes {
    /// Create all resource routes
    pub fn routes(state: Arc<AppState>) -> Router {
        Router::new()
            .route(
                "/:resource",
                get(Self::list)
                    .post(Self::create)
                    .fallback(Self::method_not_allowed),
            )
            .route(
                "/:resource/:id",
                get(Self::get)
                    .put(Self::update)
                    .delete(Self::delete)
                    .fallback(Self::method_not_allowed),
            )
            .with_state(state)
    }

    /// Parse the `:id` segment
    fn parse_id(id: &str) -> AppResult<i64> {
        id.parse()
            .map_err(|_| AppError::invalid_input(format!("Invalid id: {id}")))
    }

    async fn list(
        State(state): State<Arc<AppState>>,
        Path(resource): Path<String>,
        query: Result<Query<ListQuery>, QueryRejection>,
    ) -> Result<Response, AppError> {
        let resource: Resource = resource.parse()?;
        let Query(query) =
            query.map_err(|e| AppError::invalid_input(format!("Invalid query: {e}")))?;

        let rows = resource.list(&state.database, &query).await?;
        Ok(Json(rows).into_response())
    }

    async fn get(
        State(state): State<Arc<AppState>>,
        Path((resource, id)): Path<(String, String)>,
    ) -> Result<Response, AppError> {
        let resource: Resource = resource.parse()?;
        let id = Self::parse_id(&id)?;

        let record = resource.get(&state.database, id).await?;
        Ok(Json(record).into_response())
    }

    async fn create(
        State(state): State<Arc<AppState>>,
        Path(resource): Path<String>,
        body: Option<Json<Value>>,
    ) -> Result<Response, AppError> {
        let resource: Resource = resource.parse()?;
        let body = body.map_or(Value::Object(serde_json::Map::new()), |Json(body)| body);

        let record = resource.create(&state.database, body, &state.audit).await?;
        info!(resource = resource.label(), id = %record["id"], "Created record");
        Ok((StatusCode::CREATED, Json(record)).into_response())
    }

    async fn update(
        State(state): State<Arc<AppState>>,
        Path((resource, id)): Path<(String, String)>,
        body: Option<Json<Value>>,
    ) -> Result<Response, AppError> {
        let resource: Resource = resource.parse()?;
        let id = Self::parse_id(&id)?;
        let body = body.map_or(Value::Object(serde_json::Map::new()), |Json(body)| body);

        let record = resource
            .update(&state.database, id, body, &state.audit)
            .await?;
        Ok(Json(record).into_response())
    }

    async fn delete(
        State(state): State<Arc<AppState>>,
        Path((resource, id)): Path<(String, String)>,
    ) -> Result<Response, AppError> {
        let resource: Resource = resource.parse()?;
        let id = Self::parse_id(&id)?;

        resource.delete(&state.database, id, &state.audit).await?;
        info!(resource = resource.label(), id, "Soft-deleted record");
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    async fn method_not_allowed() -> AppError {
        AppError::new(ErrorCode::MethodNotAllowed, "Method Not Allowed")
    }
}
