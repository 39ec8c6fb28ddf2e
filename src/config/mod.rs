// ABOUTME: Configuration management module for server settings
// ABOUTME: Re-exports the environment-driven server, database, and LLM configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Environment and server configuration
pub mod environment;

pub use environment::{DatabaseUrl, LlmConfig, ServerConfig};
