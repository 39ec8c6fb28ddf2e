// ABOUTME: HTTP server assembly: shared state, router construction, and the listener loop
// ABOUTME: Merges health, chat, and resource routes behind CORS and request tracing layers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # HTTP Server
//!
//! [`AppState`] is built once at startup and shared with every handler
//! through an `Arc`. [`build_router`] is separate from [`serve`] so tests can
//! drive the router in-process.

use crate::audit::AuditContext;
use crate::chat::ChatTurnService;
use crate::config::ServerConfig;
use crate::database::Database;
use crate::llm::LlmGateway;
use crate::middleware::{setup_cors, trace_layer};
use crate::routes::{ChatRoutes, HealthRoutes, ResourceRoutes};
use anyhow::{Context, Result};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// State shared by every request handler
#[derive(Clone)]
pub struct AppState {
    /// Store handle
    pub database: Database,
    /// Chat turn orchestration
    pub chat: ChatTurnService,
    /// Audit identity recorded on every write
    pub audit: AuditContext,
}

impl AppState {
    /// Wire the store and gateway into handler state
    ///
    /// # Errors
    ///
    /// Returns an error if the chat service cannot be constructed
    pub fn new(
        database: Database,
        gateway: Arc<dyn LlmGateway>,
        audit: AuditContext,
    ) -> Result<Self> {
        let chat = ChatTurnService::new(database.clone(), gateway)
            .context("Failed to compile response recovery patterns")?;
        Ok(Self {
            database,
            chat,
            audit,
        })
    }
}

/// Build the full application router
#[must_use]
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let state = Arc::new(state);

    Router::new()
        .merge(HealthRoutes::routes())
        .merge(ChatRoutes::routes(state.clone()))
        .merge(ResourceRoutes::routes(state))
        .layer(setup_cors(config))
        .layer(trace_layer())
}

/// Bind the configured address and serve until Ctrl-C
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails
pub async fn serve(state: AppState, config: &ServerConfig) -> Result<()> {
    let app = build_router(state, config);
    let bind_addr = format!("{}:{}", config.http_host, config.http_port);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind HTTP server to {bind_addr}"))?;
    info!("HTTP server listening on http://{bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("HTTP server stopped");
    Ok(())
}

/// Resolve on Ctrl-C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining connections");
}
