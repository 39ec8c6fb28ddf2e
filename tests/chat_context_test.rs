// ABOUTME: Integration tests for the chat read queries: turn context and history window
// ABOUTME: Covers last-disposition lookup, soft-deleted parents, and window ordering
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{
    create_test_database, seed_company, seed_conversation, seed_history, seed_persona, test_audit,
};
use persona_chat_server::models::LogEntry;
use persona_core::constants::defaults::HISTORY_WINDOW;

#[tokio::test]
async fn test_context_without_conversation_has_no_disposition() {
    let db = create_test_database().await.unwrap();
    let company = seed_company(&db, "Groq").await;
    let persona = seed_persona(&db, company.id).await;

    let ctx = db
        .load_turn_context(None, persona.id)
        .await
        .unwrap()
        .expect("context");
    assert_eq!(ctx.company_name, "Acme Grocers");
    assert_eq!(ctx.persona_name, "Dana");
    assert_eq!(ctx.llm.as_deref(), Some("Groq"));
    assert_eq!(ctx.base_emotion_joy.as_deref(), Some("High"));
    assert_eq!(ctx.last_disposition, "None");
}

#[tokio::test]
async fn test_context_reports_newest_disposition() {
    let db = create_test_database().await.unwrap();
    let company = seed_company(&db, "Groq").await;
    let persona = seed_persona(&db, company.id).await;
    let conversation = seed_conversation(&db, persona.id).await;
    seed_history(&db, conversation.id, 4).await;

    let ctx = db
        .load_turn_context(Some(conversation.id), persona.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ctx.last_disposition, "mood 4");
}

#[tokio::test]
async fn test_context_skips_blank_disposition_of_newest_row() {
    let db = create_test_database().await.unwrap();
    let company = seed_company(&db, "Groq").await;
    let persona = seed_persona(&db, company.id).await;
    let conversation = seed_conversation(&db, persona.id).await;
    seed_history(&db, conversation.id, 2).await;
    // A trailing user turn carries an empty disposition
    db.append_log(conversation.id, &LogEntry::user_turn("and?"), &test_audit())
        .await
        .unwrap();

    let ctx = db
        .load_turn_context(Some(conversation.id), persona.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ctx.last_disposition, "None");
}

#[tokio::test]
async fn test_context_missing_for_deleted_company_or_persona() {
    let db = create_test_database().await.unwrap();
    let company = seed_company(&db, "Groq").await;
    let persona = seed_persona(&db, company.id).await;

    assert!(db.load_turn_context(None, 999).await.unwrap().is_none());

    db.soft_delete_company(company.id, &test_audit())
        .await
        .unwrap();
    assert!(db.load_turn_context(None, persona.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_context_debug_redacts_api_key() {
    let db = create_test_database().await.unwrap();
    let company = seed_company(&db, "Groq").await;
    let persona = seed_persona(&db, company.id).await;

    let ctx = db.load_turn_context(None, persona.id).await.unwrap().unwrap();
    let rendered = format!("{ctx:?}");
    assert!(!rendered.contains("test-api-key"));
    assert!(rendered.contains("[REDACTED]"));
}

#[tokio::test]
async fn test_history_window_keeps_newest_rows_oldest_first() {
    let db = create_test_database().await.unwrap();
    let company = seed_company(&db, "Groq").await;
    let persona = seed_persona(&db, company.id).await;
    let conversation = seed_conversation(&db, persona.id).await;
    seed_history(&db, conversation.id, 25).await;

    let history = db
        .recent_history(Some(conversation.id), HISTORY_WINDOW)
        .await
        .unwrap();

    let statements: Vec<String> = history
        .iter()
        .map(|row| row.statement.clone().unwrap_or_default())
        .collect();
    let expected: Vec<String> = (6..=25).map(|n| format!("msg {n}")).collect();
    assert_eq!(statements, expected);
    assert_eq!(history[0].is_persona_response, 1);
    assert_eq!(history[19].is_persona_response, 0);
}

#[tokio::test]
async fn test_history_window_orders_by_sort_order_before_id() {
    let db = create_test_database().await.unwrap();
    let company = seed_company(&db, "Groq").await;
    let persona = seed_persona(&db, company.id).await;
    let conversation = seed_conversation(&db, persona.id).await;
    seed_history(&db, conversation.id, 25).await;

    sqlx::query("UPDATE conversation_log SET sort_order = 9 WHERE statement = 'msg 1'")
        .execute(db.pool())
        .await
        .unwrap();

    let history = db
        .recent_history(Some(conversation.id), HISTORY_WINDOW)
        .await
        .unwrap();

    let statements: Vec<String> = history
        .iter()
        .map(|row| row.statement.clone().unwrap_or_default())
        .collect();
    let mut expected: Vec<String> = (7..=25).map(|n| format!("msg {n}")).collect();
    expected.push("msg 1".to_owned());
    assert_eq!(statements, expected);
    assert_eq!(history[19].sort_order, 9);
}

#[tokio::test]
async fn test_history_excludes_deleted_rows_and_other_conversations() {
    let db = create_test_database().await.unwrap();
    let company = seed_company(&db, "Groq").await;
    let persona = seed_persona(&db, company.id).await;
    let conversation = seed_conversation(&db, persona.id).await;
    let other = seed_conversation(&db, persona.id).await;
    seed_history(&db, conversation.id, 3).await;
    seed_history(&db, other.id, 5).await;

    let first = db
        .list_logs(persona_chat_server::database::LogFilter {
            conversation_id: Some(conversation.id),
        })
        .await
        .unwrap()[0]
        .id;
    db.soft_delete_log(first, &test_audit()).await.unwrap();

    let history = db
        .recent_history(Some(conversation.id), HISTORY_WINDOW)
        .await
        .unwrap();
    let statements: Vec<_> = history.iter().map(|r| r.statement.as_deref()).collect();
    assert_eq!(statements, vec![Some("msg 2"), Some("msg 3")]);
}

#[tokio::test]
async fn test_history_without_conversation_is_empty() {
    let db = create_test_database().await.unwrap();
    assert!(db.recent_history(None, HISTORY_WINDOW).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_conversation_ownership() {
    let db = create_test_database().await.unwrap();
    let company = seed_company(&db, "Groq").await;
    let dana = seed_persona(&db, company.id).await;
    let sam = seed_persona(&db, company.id).await;
    let conversation = seed_conversation(&db, dana.id).await;

    assert!(db.conversation_belongs_to(conversation.id, dana.id).await.unwrap());
    assert!(!db.conversation_belongs_to(conversation.id, sam.id).await.unwrap());
    assert!(!db.conversation_belongs_to(404, dana.id).await.unwrap());
}
