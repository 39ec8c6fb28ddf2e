// ABOUTME: Main library entry point for the persona chat simulation service
// ABOUTME: Exposes the store, LLM gateway, chat turn pipeline, and HTTP surface
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Persona Chat Server
//!
//! Simulated customer conversations: companies define which LLM provider
//! and key to use, personas carry a profile and an emotional baseline, and
//! `POST /chat` asks the provider to answer in character. Every turn is
//! recorded in the conversation log, including the raw provider payload.
//!
//! ## Architecture
//!
//! - **Database**: SQLite store for companies, personas, conversations, and logs
//! - **LLM**: provider gateway for `OpenAI` Responses and Groq chat completions
//! - **Chat**: prompt composition, history window, reply salvage, orchestration
//! - **Routes**: generic CRUD surface plus the chat and health endpoints
//! - **Config**: environment-driven server, store, and provider settings
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use persona_chat_server::config::ServerConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Persona chat server configured on port {}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Audit identity threaded into store writes
pub mod audit;

/// Chat turn pipeline
pub mod chat;

/// Environment configuration
pub mod config;

/// SQLite store
pub mod database;

/// Unified error handling (re-exported from `persona-core`)
pub mod errors;

/// LLM provider gateway
pub mod llm;

/// Structured logging setup
pub mod logging;

/// HTTP middleware (CORS, request tracing)
pub mod middleware;

/// Records and request inputs
pub mod models;

/// HTTP routes
pub mod routes;

/// Router assembly and listener
pub mod server;

/// Request body validation
pub mod validation;
