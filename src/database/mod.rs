// ABOUTME: SQLite store for companies, personas, conversations, and transcript logs
// ABOUTME: Owns the connection pool, runs table migrations, and hosts per-table operations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Database Management
//!
//! One [`Database`] wraps a `SqlitePool`. Each table module adds its own
//! `impl Database` block with a `migrate_*` step and CRUD operations; the
//! `chat_context` module adds the two read queries the chat turn needs.
//!
//! Reads never return soft-deleted rows (`is_deleted = 1`), and listings are
//! ordered by `(sort_order ASC, id ASC)`.

mod chat_context;
mod companies;
mod conversation_logs;
mod conversations;
mod personas;

pub use chat_context::{HistoryRow, TurnContext};
pub use conversation_logs::LogFilter;
pub use conversations::ConversationFilter;
pub use personas::PersonaFilter;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Wait this long on a locked database before failing a statement
const BUSY_TIMEOUT_SECS: u64 = 5;

/// Pool size for file-backed databases
const MAX_CONNECTIONS: u32 = 8;

/// Store handle shared by every request
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Open (creating if needed) the database and run migrations
    ///
    /// `sqlite::memory:` is supported for tests; it is served by a single
    /// connection so every query sees the same in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is malformed, the file cannot be opened,
    /// or a migration statement fails.
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database URL: {database_url}"))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(BUSY_TIMEOUT_SECS));

        let max_connections = if database_url.contains(":memory:") {
            1
        } else {
            MAX_CONNECTIONS
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database {database_url}"))?;

        let db = Self { pool };
        db.migrate().await?;
        info!("Database ready: {database_url}");

        Ok(db)
    }

    /// Get a reference to the pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Create all tables and indexes
    ///
    /// # Errors
    ///
    /// Returns an error if any DDL statement fails
    pub async fn migrate(&self) -> Result<()> {
        self.migrate_companies().await?;
        self.migrate_personas().await?;
        self.migrate_conversations().await?;
        self.migrate_conversation_logs().await?;
        Ok(())
    }
}
