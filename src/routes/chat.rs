// ABOUTME: Chat route handler for a single persona conversation turn
// ABOUTME: Decodes the request, runs the chat turn service, and maps failures to HTTP errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Chat route
//!
//! `POST /chat` takes `{persona_id, conversation_id?, user_question}` and
//! answers `{conversation_id, response, disposition, emoji}`.

use crate::chat::{ChatError, ChatTurnRequest};
use crate::errors::AppError;
use crate::server::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use std::sync::Arc;
use tracing::warn;

/// Chat routes handler
pub struct ChatRoutes;

impl ChatRoutes {
    /// Create the chat route
    pub fn routes(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/chat", post(Self::handle_chat))
            .with_state(state)
    }

    /// Run one chat turn
    async fn handle_chat(
        State(state): State<Arc<AppState>>,
        body: Result<Json<ChatTurnRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        // An undecodable body is treated like one missing its fields
        let request = body.map_or_else(
            |rejection| {
                warn!("Rejected chat body: {rejection}");
                ChatTurnRequest::default()
            },
            |Json(request)| request,
        );

        let reply = state
            .chat
            .run(request, &state.audit)
            .await
            .map_err(|e: ChatError| {
                warn!(error = %e, "Chat turn failed");
                AppError::from(e)
            })?;

        Ok(Json(reply).into_response())
    }
}
