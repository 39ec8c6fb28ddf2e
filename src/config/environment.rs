// ABOUTME: Environment configuration for the persona chat server
// ABOUTME: Parses listener, database, CORS, LLM endpoint/timeout, and audit settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration

use crate::audit::AuditContext;
use anyhow::{bail, Context, Result};
use persona_core::constants::{defaults, llm};
use std::env;
use std::path::PathBuf;
use tracing::info;

/// Type-safe database location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseUrl {
    /// `SQLite` database file
    SQLite {
        /// File path, relative to the working directory unless absolute
        path: PathBuf,
    },
    /// In-memory `SQLite` (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse `sqlite:<path>`, `sqlite://<path>`, `sqlite::memory:`, or a bare path
    ///
    /// # Errors
    ///
    /// Returns an error for an empty value or a non-`SQLite` URL scheme
    pub fn parse_url(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            bail!("Database URL is empty");
        }

        let path = s
            .strip_prefix("sqlite://")
            .or_else(|| s.strip_prefix("sqlite:"));

        match path {
            Some(":memory:") => Ok(Self::Memory),
            Some(path) => Ok(Self::SQLite {
                path: PathBuf::from(path),
            }),
            None if s.contains("://") => bail!("Unsupported database URL: {s}"),
            None => Ok(Self::SQLite {
                path: PathBuf::from(s),
            }),
        }
    }

    /// Convert to a connection string `sqlx` understands
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl std::fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_connection_string())
    }
}

/// Outbound LLM settings shared by every provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    /// `ChatGPT` responses endpoint
    pub openai_responses_url: String,
    /// `Groq` chat-completions endpoint
    pub groq_chat_completions_url: String,
    /// Whole-request timeout
    pub request_timeout_secs: u64,
    /// TCP/TLS connect timeout
    pub connect_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            openai_responses_url: llm::OPENAI_RESPONSES_URL.to_owned(),
            groq_chat_completions_url: llm::GROQ_CHAT_COMPLETIONS_URL.to_owned(),
            request_timeout_secs: llm::REQUEST_TIMEOUT_SECS,
            connect_timeout_secs: llm::CONNECT_TIMEOUT_SECS,
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Listen address
    pub http_host: String,
    /// Listen port
    pub http_port: u16,
    /// Database location
    pub database_url: DatabaseUrl,
    /// Allowed CORS origins; `["*"]` allows any
    pub cors_allowed_origins: Vec<String>,
    /// Provider endpoints and timeouts
    pub llm: LlmConfig,
    /// Actor recorded on writes
    pub audit_user: String,
    /// Version recorded on writes
    pub audit_version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_host: defaults::HTTP_HOST.to_owned(),
            http_port: defaults::HTTP_PORT,
            database_url: DatabaseUrl::SQLite {
                path: PathBuf::from("./data/personas.db"),
            },
            cors_allowed_origins: parse_origins(defaults::CORS_ALLOWED_ORIGINS),
            llm: LlmConfig::default(),
            audit_user: defaults::AUDIT_ACTOR.to_owned(),
            audit_version: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable does not parse or the
    /// database URL is unsupported
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable does not parse or the
    /// database URL is unsupported
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());

        Ok(Self {
            http_host: var_or("HTTP_HOST", defaults::HTTP_HOST),
            http_port: var_or("HTTP_PORT", &defaults::HTTP_PORT.to_string())
                .parse()
                .context("Invalid HTTP_PORT value")?,
            database_url: DatabaseUrl::parse_url(&var_or("DATABASE_URL", defaults::DATABASE_URL))
                .context("Invalid DATABASE_URL value")?,
            cors_allowed_origins: parse_origins(&var_or(
                "CORS_ALLOWED_ORIGINS",
                defaults::CORS_ALLOWED_ORIGINS,
            )),
            llm: LlmConfig {
                openai_responses_url: var_or("OPENAI_RESPONSES_URL", llm::OPENAI_RESPONSES_URL),
                groq_chat_completions_url: var_or(
                    "GROQ_CHAT_COMPLETIONS_URL",
                    llm::GROQ_CHAT_COMPLETIONS_URL,
                ),
                request_timeout_secs: var_or(
                    "LLM_REQUEST_TIMEOUT_SECS",
                    &llm::REQUEST_TIMEOUT_SECS.to_string(),
                )
                .parse()
                .context("Invalid LLM_REQUEST_TIMEOUT_SECS value")?,
                connect_timeout_secs: var_or(
                    "LLM_CONNECT_TIMEOUT_SECS",
                    &llm::CONNECT_TIMEOUT_SECS.to_string(),
                )
                .parse()
                .context("Invalid LLM_CONNECT_TIMEOUT_SECS value")?,
            },
            audit_user: var_or("AUDIT_USER", defaults::AUDIT_ACTOR),
            audit_version: var_or("AUDIT_VERSION", env!("CARGO_PKG_VERSION")),
        })
    }

    /// Audit context for writes made on behalf of HTTP callers
    #[must_use]
    pub fn audit_context(&self) -> AuditContext {
        AuditContext::new(&self.audit_user, &self.audit_version)
    }

    /// Whether any origin is allowed
    #[must_use]
    pub fn allows_any_origin(&self) -> bool {
        self.cors_allowed_origins.iter().any(|origin| origin == "*")
    }
}

/// Parse comma-separated CORS origins
fn parse_origins(origins_str: &str) -> Vec<String> {
    if origins_str.trim() == "*" {
        vec!["*".to_owned()]
    } else {
        origins_str
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_match_web_client() {
        let config = ServerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.http_port, 3500);
        assert_eq!(config.cors_allowed_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.llm.request_timeout_secs, 60);
        assert_eq!(config.audit_user, "web-user");
        assert_eq!(
            config.database_url,
            DatabaseUrl::SQLite {
                path: PathBuf::from("./data/personas.db")
            }
        );
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("HTTP_PORT", "8088"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("CORS_ALLOWED_ORIGINS", "http://a.test, http://b.test"),
            ("GROQ_CHAT_COMPLETIONS_URL", "http://127.0.0.1:9/groq"),
            ("LLM_REQUEST_TIMEOUT_SECS", "5"),
            ("AUDIT_USER", "qa"),
        ]))
        .unwrap();

        assert_eq!(config.http_port, 8088);
        assert!(config.database_url.is_memory());
        assert_eq!(
            config.cors_allowed_origins,
            vec!["http://a.test", "http://b.test"]
        );
        assert_eq!(config.llm.groq_chat_completions_url, "http://127.0.0.1:9/groq");
        assert_eq!(config.llm.request_timeout_secs, 5);
        assert_eq!(config.audit_context().actor, "qa");
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let result = ServerConfig::from_lookup(lookup_from(&[("HTTP_PORT", "http")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_database_url_parsing() {
        assert_eq!(
            DatabaseUrl::parse_url("sqlite:./test.db").unwrap(),
            DatabaseUrl::SQLite {
                path: PathBuf::from("./test.db")
            }
        );
        assert_eq!(
            DatabaseUrl::parse_url("sqlite://data/p.db")
                .unwrap()
                .to_connection_string(),
            "sqlite:data/p.db"
        );
        assert!(DatabaseUrl::parse_url("sqlite::memory:").unwrap().is_memory());
        assert!(DatabaseUrl::parse_url("./plain.db").is_ok());
        assert!(DatabaseUrl::parse_url("postgres://localhost/db").is_err());
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(parse_origins("*"), vec!["*"]);
        assert_eq!(parse_origins(" , "), Vec::<String>::new());
    }
}
