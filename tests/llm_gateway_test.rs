// ABOUTME: Integration tests for the reqwest LLM gateway against in-process provider stubs
// ABOUTME: Covers request shape, auth header, error statuses, timeouts, and unreadable bodies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use axum::{routing::post, Router};
use common::{chat_completions_payload, init_test_logging, spawn_provider_stub};
use persona_chat_server::{
    config::LlmConfig,
    llm::{extract_response_text, ChatMessage, GatewayError, HttpLlmGateway, LlmGateway},
};
use persona_core::models::LlmKind;
use serde_json::json;
use std::time::Duration;
use tokio::net::TcpListener;

fn gateway_for(url: &str, request_timeout_secs: u64) -> HttpLlmGateway {
    HttpLlmGateway::new(&LlmConfig {
        openai_responses_url: url.to_owned(),
        groq_chat_completions_url: url.to_owned(),
        request_timeout_secs,
        connect_timeout_secs: 1,
    })
    .unwrap()
}

/// Serve `app` on an ephemeral port and return its URL
async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    format!("http://{addr}/v1/chat")
}

#[tokio::test]
async fn test_payload_returned_untouched() {
    init_test_logging();
    let payload = chat_completions_payload("{\"response\": \"ok\"}");
    let stub = spawn_provider_stub(200, payload.clone()).await;

    let result = gateway_for(&stub.url, 5)
        .complete(LlmKind::Groq, "gsk_abc", &[ChatMessage::user("Hi")])
        .await
        .unwrap();

    assert_eq!(result, payload);
    assert_eq!(
        extract_response_text(&result).as_deref(),
        Some("{\"response\": \"ok\"}")
    );
    let requests = stub.requests.lock().unwrap().clone();
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer gsk_abc"));
    assert_eq!(
        requests[0].body["messages"],
        json!([{"role": "user", "content": "Hi"}])
    );
}

#[tokio::test]
async fn test_non_success_status_carries_excerpt() {
    init_test_logging();
    let stub = spawn_provider_stub(429, json!({"error": {"message": "rate limited"}})).await;

    let err = gateway_for(&stub.url, 5)
        .complete(LlmKind::ChatGpt, "sk_abc", &[ChatMessage::user("Hi")])
        .await
        .unwrap_err();

    match err {
        GatewayError::Status {
            provider,
            status,
            body,
        } => {
            assert_eq!(provider, LlmKind::ChatGpt);
            assert_eq!(status, 429);
            assert!(body.contains("rate limited"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreadable_body_is_decode_error() {
    init_test_logging();
    let url = serve(Router::new().route("/v1/chat", post(|| async { "not json at all" }))).await;

    let err = gateway_for(&url, 5)
        .complete(LlmKind::Groq, "gsk_abc", &[ChatMessage::user("Hi")])
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Decode { .. }));
}

#[tokio::test]
async fn test_slow_provider_times_out() {
    init_test_logging();
    let url = serve(Router::new().route(
        "/v1/chat",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "{}"
        }),
    ))
    .await;

    let err = gateway_for(&url, 1)
        .complete(LlmKind::Groq, "gsk_abc", &[ChatMessage::user("Hi")])
        .await
        .unwrap_err();

    match err {
        GatewayError::Transport { message, .. } => assert!(message.contains("timed out")),
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_refused_connection_is_transport_error() {
    init_test_logging();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = gateway_for(&format!("http://{addr}/v1/chat"), 5)
        .complete(LlmKind::Groq, "gsk_abc", &[ChatMessage::user("Hi")])
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Transport { .. }));
}
