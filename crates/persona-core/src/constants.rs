// ABOUTME: Application-wide constants for the persona chat service
// ABOUTME: Provider endpoints, model identifiers, and data model defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Service identity used in logs and the health endpoint
pub mod service {
    /// Service name
    pub const SERVICE_NAME: &str = "persona-chat-server";
}

/// Defaults applied by the store and the chat flow
pub mod defaults {
    /// Maximum number of log rows replayed into a prompt
    pub const HISTORY_WINDOW: i64 = 20;

    /// Persona age when the client omits it
    pub const PERSONA_AGE: i64 = 20;

    /// Disposition reported when a conversation has no prior persona turn
    pub const NO_DISPOSITION: &str = "None";

    /// HTTP port (matches the web client's default backend URL)
    pub const HTTP_PORT: u16 = 3500;

    /// Bind address
    pub const HTTP_HOST: &str = "0.0.0.0";

    /// `SQLite` database location
    pub const DATABASE_URL: &str = "sqlite:./data/personas.db";

    /// Origin of the web client
    pub const CORS_ALLOWED_ORIGINS: &str = "http://localhost:3000";

    /// Audit actor recorded on writes made through the HTTP layer
    pub const AUDIT_ACTOR: &str = "web-user";
}

/// Fixed LLM provider wire contracts
pub mod llm {
    /// `OpenAI` responses endpoint
    pub const OPENAI_RESPONSES_URL: &str = "https://api.openai.com/v1/responses";

    /// Model sent to the `OpenAI` responses endpoint
    pub const OPENAI_MODEL: &str = "gpt-4o";

    /// Groq chat-completions endpoint
    pub const GROQ_CHAT_COMPLETIONS_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

    /// Model sent to the Groq chat-completions endpoint
    pub const GROQ_MODEL: &str = "llama-3.3-70b-versatile";

    /// Whole-request timeout for a provider call
    pub const REQUEST_TIMEOUT_SECS: u64 = 60;

    /// TCP/TLS connect timeout for a provider call
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;
}
