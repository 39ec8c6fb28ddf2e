// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides in-memory databases, seeding helpers, fake gateways, and a provider stub
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `persona_chat_server`

use anyhow::Result;
use async_trait::async_trait;
use axum::{http::HeaderMap, routing::post, Json, Router};
use persona_chat_server::{
    audit::AuditContext,
    config::ServerConfig,
    database::Database,
    llm::{ChatMessage, GatewayError, LlmGateway},
    models::{CompanyInput, CompanyRecord, ConversationRecord, LogEntry, PersonaInput, PersonaRecord},
    server::{build_router, AppState},
};
use persona_core::models::LlmKind;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex, Once};
use tokio::net::TcpListener;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Audit identity used by every test write
pub fn test_audit() -> AuditContext {
    AuditContext::new("test-user", "test-1.0")
}

/// Standard test database setup
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    Database::new("sqlite::memory:").await
}

// ============================================================================
// Seeding
// ============================================================================

/// Insert a company configured for the given LLM label
pub async fn seed_company(db: &Database, llm: &str) -> CompanyRecord {
    let fields = CompanyInput {
        name: Some("Acme Grocers".to_owned()),
        industry: Some("Retail".to_owned()),
        size: Some("Large".to_owned()),
        llm: Some(llm.to_owned()),
        llm_api_key: Some("test-api-key".to_owned()),
        tags: Some("groceries, delivery".to_owned()),
    }
    .validate()
    .expect("valid company");
    db.insert_company(&fields, &test_audit())
        .await
        .expect("insert company")
}

/// Insert a company whose `llm` column holds a label the gateway cannot call
pub async fn seed_company_with_raw_llm(db: &Database, llm: &str) -> i64 {
    let company = seed_company(db, "Groq").await;
    sqlx::query("UPDATE company SET llm = $1 WHERE id = $2")
        .bind(llm)
        .bind(company.id)
        .execute(db.pool())
        .await
        .expect("override llm label");
    company.id
}

/// Insert a persona for a company
pub async fn seed_persona(db: &Database, company_id: i64) -> PersonaRecord {
    let fields = PersonaInput {
        company_id: Some(company_id),
        name: Some("Dana".to_owned()),
        age: Some(34),
        gender: Some("Female".to_owned()),
        location: Some("Denver".to_owned()),
        job_title: Some("Store Manager".to_owned()),
        interests: Some("hiking".to_owned()),
        challenges: Some("late deliveries".to_owned()),
        base_emotion_joy: Some("High".to_owned()),
        base_emotion_trust: Some("Moderate".to_owned()),
        base_emotion_anger: Some("Low".to_owned()),
        ..PersonaInput::default()
    }
    .validate()
    .expect("valid persona");
    db.insert_persona(&fields, &test_audit())
        .await
        .expect("insert persona")
}

/// Open an empty conversation for a persona
pub async fn seed_conversation(db: &Database, persona_id: i64) -> ConversationRecord {
    db.open_conversation(persona_id, &test_audit())
        .await
        .expect("open conversation")
}

/// Append `count` alternating user/persona rows with statements `msg 1..=count`
pub async fn seed_history(db: &Database, conversation_id: i64, count: usize) {
    for n in 1..=count {
        let statement = format!("msg {n}");
        let entry = if n % 2 == 1 {
            LogEntry::user_turn(&statement)
        } else {
            LogEntry::persona_turn(
                Some(statement),
                Some(format!("mood {n}")),
                Some("🙂".to_owned()),
                "{}".to_owned(),
            )
        };
        db.append_log(conversation_id, &entry, &test_audit())
            .await
            .expect("append log");
    }
}

/// Count live rows in a table
pub async fn count_rows(db: &Database, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table} WHERE is_deleted = 0"))
        .fetch_one(db.pool())
        .await
        .expect("count rows")
}

// ============================================================================
// Provider payloads
// ============================================================================

/// Chat-completions payload carrying `text`
pub fn chat_completions_payload(text: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": text}}]
    })
}

/// Responses payload carrying `text`
pub fn responses_payload(text: &str) -> Value {
    json!({
        "id": "resp-test",
        "output": [{"type": "message", "content": [{"type": "output_text", "text": text}]}]
    })
}

// ============================================================================
// Fake gateway
// ============================================================================

/// One recorded gateway call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub provider: LlmKind,
    pub api_key: String,
    pub messages: Vec<ChatMessage>,
}

/// Gateway that answers every call with a fixed payload and records the call
pub struct RecordingGateway {
    payload: Option<Value>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingGateway {
    /// Answer with `payload`
    pub fn replying(payload: Value) -> Arc<Self> {
        Arc::new(Self {
            payload: Some(payload),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Fail every call with a 503
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            payload: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Calls received so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmGateway for RecordingGateway {
    async fn complete(
        &self,
        provider: LlmKind,
        api_key: &str,
        messages: &[ChatMessage],
    ) -> Result<Value, GatewayError> {
        self.calls.lock().unwrap().push(RecordedCall {
            provider,
            api_key: api_key.to_owned(),
            messages: messages.to_vec(),
        });
        self.payload.clone().ok_or(GatewayError::Status {
            provider,
            status: 503,
            body: "service unavailable".to_owned(),
        })
    }
}

/// Full application router over `db` and `gateway`
pub fn test_router(db: &Database, gateway: Arc<dyn LlmGateway>) -> Router {
    let state = AppState::new(db.clone(), gateway, test_audit()).expect("app state");
    build_router(state, &ServerConfig::default())
}

// ============================================================================
// Provider stub
// ============================================================================

/// Request captured by the provider stub
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub authorization: Option<String>,
    pub body: Value,
}

/// In-process provider endpoint bound to an ephemeral port
pub struct ProviderStub {
    pub url: String,
    pub requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

/// Serve `payload` with `status` at `POST /v1/chat`
pub async fn spawn_provider_stub(status: u16, payload: Value) -> ProviderStub {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let captured = requests.clone();

    let app = Router::new().route(
        "/v1/chat",
        post(move |headers: HeaderMap, Json(body): Json<Value>| {
            let captured = captured.clone();
            let payload = payload.clone();
            async move {
                captured.lock().unwrap().push(CapturedRequest {
                    authorization: headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(ToOwned::to_owned),
                    body,
                });
                (
                    axum::http::StatusCode::from_u16(status).unwrap(),
                    Json(payload),
                )
            }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
    let addr = listener.local_addr().expect("stub addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    ProviderStub {
        url: format!("http://{addr}/v1/chat"),
        requests,
    }
}
