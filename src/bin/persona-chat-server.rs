// ABOUTME: Server binary for the persona chat simulation API
// ABOUTME: Loads configuration, opens the store, wires the LLM gateway, and serves HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Persona Chat Server Binary
//!
//! Starts the HTTP API for companies, personas, conversations, and chat turns.

use anyhow::{Context, Result};
use clap::Parser;
use persona_chat_server::{
    config::{DatabaseUrl, ServerConfig},
    database::Database,
    llm::HttpLlmGateway,
    logging,
    server::{self, AppState},
};
use std::sync::Arc;
use tracing::{error, info};

/// Command-line overrides applied on top of the environment
#[derive(Parser)]
#[command(name = "persona-chat-server")]
#[command(about = "Persona chat simulation API - companies, personas, and LLM-backed conversations")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL (`sqlite:<path>` or `sqlite::memory:`)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(database_url) = args.database_url {
        config.database_url = DatabaseUrl::parse_url(&database_url)?;
    }

    info!(
        "Starting persona chat server: http={}:{} database={} cors={:?}",
        config.http_host, config.http_port, config.database_url, config.cors_allowed_origins
    );

    if let DatabaseUrl::SQLite { path } = &config.database_url {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory {}", parent.display())
            })?;
        }
    }

    let database = Database::new(&config.database_url.to_connection_string()).await?;
    let gateway = Arc::new(HttpLlmGateway::new(&config.llm)?);
    let state = AppState::new(database, gateway, config.audit_context())?;

    if let Err(e) = server::serve(state, &config).await {
        error!("Server error: {e:#}");
        return Err(e);
    }

    Ok(())
}
