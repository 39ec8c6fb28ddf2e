// ABOUTME: Record and request-body types for companies, personas, conversations, and logs
// ABOUTME: Records mirror table rows; inputs are the lenient JSON shapes the web client posts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! Two families of types live here:
//!
//! - **Records** (`CompanyRecord`, `PersonaRecord`, ...) are read straight from
//!   the store with `sqlx::FromRow` and serialized back to the client as-is.
//!   Vocabulary columns (`size`, `llm`, `gender`, ...) stay plain text so rows
//!   written by older clients still load.
//! - **Inputs** (`CompanyInput`, ...) are request bodies. Every field is
//!   optional and ids/integers are accepted as numbers or numeric strings;
//!   `crate::validation` turns them into checked field sets.

use persona_core::models::{
    CompanySize, ConversationState, EmotionLevel, Gender, LlmKind, BASE_EMOTIONS,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ============================================================================
// Records
// ============================================================================

/// Audit columns shared by every table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditColumns {
    /// Actor that inserted the row
    pub created_by: Option<String>,
    /// Insert timestamp (RFC 3339)
    pub created_date: Option<String>,
    /// Actor of the last change
    pub changed_by: Option<String>,
    /// Timestamp of the last change (RFC 3339)
    pub changed_date: Option<String>,
    /// Application version that made the last change
    pub changed_during_version: Option<String>,
}

/// Company row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CompanyRecord {
    /// Primary key
    pub id: i64,
    /// Company name
    pub name: String,
    /// Industry
    pub industry: String,
    /// `Small` | `Medium` | `Large`
    pub size: Option<String>,
    /// `ChatGPT` | `Groq`
    pub llm: Option<String>,
    /// Provider API key (bearer token)
    pub llm_api_key: String,
    /// Free-text tags
    pub tags: Option<String>,
    /// Soft-delete flag
    pub is_deleted: i64,
    /// Manual ordering
    pub sort_order: i64,
    /// Audit columns
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditColumns,
}

/// Persona row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PersonaRecord {
    /// Primary key
    pub id: i64,
    /// Owning company
    pub company_id: i64,
    /// Persona name
    pub name: String,
    /// Age in years
    pub age: Option<i64>,
    /// `Male` | `Female` | `Non-binary` | `Other`
    pub gender: Option<String>,
    /// Branch location
    pub location: Option<String>,
    /// Job title
    pub job_title: Option<String>,
    /// Interests
    pub interests: Option<String>,
    /// Problems the persona starts the day with
    pub challenges: Option<String>,
    /// Joy baseline
    pub base_emotion_joy: Option<String>,
    /// Trust baseline
    pub base_emotion_trust: Option<String>,
    /// Fear baseline
    pub base_emotion_fear: Option<String>,
    /// Surprise baseline
    pub base_emotion_surprise: Option<String>,
    /// Sadness baseline
    pub base_emotion_sadness: Option<String>,
    /// Disgust baseline
    pub base_emotion_disgust: Option<String>,
    /// Anger baseline
    pub base_emotion_anger: Option<String>,
    /// Anticipation baseline
    pub base_emotion_anticipation: Option<String>,
    /// Soft-delete flag
    pub is_deleted: i64,
    /// Manual ordering
    pub sort_order: i64,
    /// Audit columns
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditColumns,
}

/// Conversation row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ConversationRecord {
    /// Primary key
    pub id: i64,
    /// Owning persona
    pub persona_id: i64,
    /// Display name
    pub name: Option<String>,
    /// `Pending` | `Resolved` | `Unresolved`
    pub conversation_state: Option<String>,
    /// Summary text
    pub conversation_summary: Option<String>,
    /// Refreshed whenever a log row is appended
    pub date_last_message: Option<String>,
    /// Message counter
    pub message_count: i64,
    /// Outcome score
    pub score: Option<f64>,
    /// Keywords
    pub keywords: Option<String>,
    /// 0/1 flag
    pub is_follow_up_needed: i64,
    /// Next step text
    pub next_step: Option<String>,
    /// Soft-delete flag
    pub is_deleted: i64,
    /// Manual ordering
    pub sort_order: i64,
    /// Audit columns
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditColumns,
}

/// Conversation transcript row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ConversationLogRecord {
    /// Primary key
    pub id: i64,
    /// Owning conversation
    pub conversation_id: i64,
    /// 0/1 flag, hidden rows are excluded from filtered listings
    pub is_visible: i64,
    /// 0 = user turn, 1 = persona turn
    pub is_persona_response: i64,
    /// Spoken text
    pub statement: Option<String>,
    /// Self-reported disposition (persona turns)
    pub disposition: Option<String>,
    /// Disposition emoji (persona turns)
    pub emoji: Option<String>,
    /// Full provider payload (persona turns)
    pub raw_response: Option<String>,
    /// Soft-delete flag
    pub is_deleted: i64,
    /// Manual ordering
    pub sort_order: i64,
    /// Audit columns
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditColumns,
}

// ============================================================================
// Request bodies
// ============================================================================

/// Company create/update body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyInput {
    /// Company name (required)
    #[serde(default)]
    pub name: Option<String>,
    /// Industry (required)
    #[serde(default)]
    pub industry: Option<String>,
    /// Size label
    #[serde(default)]
    pub size: Option<String>,
    /// LLM label
    #[serde(default)]
    pub llm: Option<String>,
    /// Provider API key (required)
    #[serde(default)]
    pub llm_api_key: Option<String>,
    /// Free-text tags
    #[serde(default)]
    pub tags: Option<String>,
}

/// Persona create/update body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonaInput {
    /// Owning company (required)
    #[serde(default, deserialize_with = "deserialize_optional_int")]
    pub company_id: Option<i64>,
    /// Persona name (required)
    #[serde(default)]
    pub name: Option<String>,
    /// Age, defaults to 20
    #[serde(default, deserialize_with = "deserialize_optional_int")]
    pub age: Option<i64>,
    /// Gender label
    #[serde(default)]
    pub gender: Option<String>,
    /// Branch location
    #[serde(default)]
    pub location: Option<String>,
    /// Job title
    #[serde(default)]
    pub job_title: Option<String>,
    /// Interests
    #[serde(default)]
    pub interests: Option<String>,
    /// Challenges
    #[serde(default)]
    pub challenges: Option<String>,
    /// Joy baseline label
    #[serde(default)]
    pub base_emotion_joy: Option<String>,
    /// Trust baseline label
    #[serde(default)]
    pub base_emotion_trust: Option<String>,
    /// Fear baseline label
    #[serde(default)]
    pub base_emotion_fear: Option<String>,
    /// Surprise baseline label
    #[serde(default)]
    pub base_emotion_surprise: Option<String>,
    /// Sadness baseline label
    #[serde(default)]
    pub base_emotion_sadness: Option<String>,
    /// Disgust baseline label
    #[serde(default)]
    pub base_emotion_disgust: Option<String>,
    /// Anger baseline label
    #[serde(default)]
    pub base_emotion_anger: Option<String>,
    /// Anticipation baseline label
    #[serde(default)]
    pub base_emotion_anticipation: Option<String>,
}

impl PersonaInput {
    /// Emotion labels paired with their column suffix, in `BASE_EMOTIONS` order
    #[must_use]
    pub fn emotion_labels(&self) -> [(&'static str, Option<&str>); 8] {
        let values = [
            &self.base_emotion_joy,
            &self.base_emotion_trust,
            &self.base_emotion_fear,
            &self.base_emotion_surprise,
            &self.base_emotion_sadness,
            &self.base_emotion_disgust,
            &self.base_emotion_anger,
            &self.base_emotion_anticipation,
        ];
        let mut labels = [("", None); 8];
        for (slot, (name, value)) in labels.iter_mut().zip(BASE_EMOTIONS.iter().zip(values)) {
            *slot = (*name, value.as_deref());
        }
        labels
    }
}

/// Conversation create/update body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConversationInput {
    /// Owning persona (required)
    #[serde(default, deserialize_with = "deserialize_optional_int")]
    pub persona_id: Option<i64>,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// State label
    #[serde(default)]
    pub conversation_state: Option<String>,
    /// Summary
    #[serde(default)]
    pub conversation_summary: Option<String>,
    /// Message counter
    #[serde(default, deserialize_with = "deserialize_optional_int")]
    pub message_count: Option<i64>,
    /// Outcome score
    #[serde(default)]
    pub score: Option<f64>,
    /// Keywords
    #[serde(default)]
    pub keywords: Option<String>,
    /// 0/1 (booleans accepted)
    #[serde(default, deserialize_with = "deserialize_optional_int")]
    pub is_follow_up_needed: Option<i64>,
    /// Next step
    #[serde(default)]
    pub next_step: Option<String>,
}

/// Conversation log create/update body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConversationLogInput {
    /// Owning conversation (required on create)
    #[serde(default, deserialize_with = "deserialize_optional_int")]
    pub conversation_id: Option<i64>,
    /// 0/1, defaults to 1
    #[serde(default, deserialize_with = "deserialize_optional_int")]
    pub is_visible: Option<i64>,
    /// 0/1, defaults to 0
    #[serde(default, deserialize_with = "deserialize_optional_int")]
    pub is_persona_response: Option<i64>,
    /// Spoken text
    #[serde(default)]
    pub statement: Option<String>,
    /// Disposition
    #[serde(default)]
    pub disposition: Option<String>,
    /// Emoji
    #[serde(default)]
    pub emoji: Option<String>,
    /// Raw provider payload
    #[serde(default)]
    pub raw_response: Option<String>,
}

// ============================================================================
// Validated field sets
// ============================================================================

/// Checked company fields ready to bind
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyFields {
    /// Company name
    pub name: String,
    /// Industry
    pub industry: String,
    /// Size
    pub size: Option<CompanySize>,
    /// LLM backend
    pub llm: Option<LlmKind>,
    /// Provider API key
    pub llm_api_key: String,
    /// Tags, empty when absent
    pub tags: String,
}

/// Checked persona fields ready to bind
#[derive(Debug, Clone, PartialEq)]
pub struct PersonaFields {
    /// Owning company
    pub company_id: i64,
    /// Persona name
    pub name: String,
    /// Age
    pub age: i64,
    /// Gender
    pub gender: Option<Gender>,
    /// Branch location
    pub location: Option<String>,
    /// Job title
    pub job_title: Option<String>,
    /// Interests
    pub interests: Option<String>,
    /// Challenges
    pub challenges: Option<String>,
    /// Emotion baselines in `BASE_EMOTIONS` order
    pub emotions: [Option<EmotionLevel>; 8],
}

/// Checked conversation fields ready to bind
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationFields {
    /// Owning persona
    pub persona_id: i64,
    /// Display name
    pub name: String,
    /// State
    pub conversation_state: Option<ConversationState>,
    /// Summary
    pub conversation_summary: String,
    /// Message counter
    pub message_count: i64,
    /// Outcome score
    pub score: Option<f64>,
    /// Keywords
    pub keywords: String,
    /// 0/1 flag
    pub is_follow_up_needed: i64,
    /// Next step
    pub next_step: String,
}

/// One transcript entry, independent of which conversation it lands in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// 0/1 visibility flag
    pub is_visible: i64,
    /// 0 = user turn, 1 = persona turn
    pub is_persona_response: i64,
    /// Spoken text
    pub statement: Option<String>,
    /// Disposition
    pub disposition: Option<String>,
    /// Emoji
    pub emoji: Option<String>,
    /// Raw provider payload
    pub raw_response: Option<String>,
}

impl LogEntry {
    /// The user's side of a chat turn: empty disposition, emoji, and payload
    #[must_use]
    pub fn user_turn(question: &str) -> Self {
        Self {
            is_visible: 1,
            is_persona_response: 0,
            statement: Some(question.to_owned()),
            disposition: Some(String::new()),
            emoji: Some(String::new()),
            raw_response: Some(String::new()),
        }
    }

    /// The persona's side of a chat turn
    #[must_use]
    pub fn persona_turn(
        response: Option<String>,
        disposition: Option<String>,
        emoji: Option<String>,
        raw_response: String,
    ) -> Self {
        Self {
            is_visible: 1,
            is_persona_response: 1,
            statement: response,
            disposition,
            emoji,
            raw_response: Some(raw_response),
        }
    }
}

impl ConversationLogInput {
    /// Split into the owning conversation id and the entry to write
    #[must_use]
    pub fn into_entry(self) -> (Option<i64>, LogEntry) {
        let entry = LogEntry {
            is_visible: self.is_visible.unwrap_or(1),
            is_persona_response: self.is_persona_response.unwrap_or(0),
            statement: self.statement,
            disposition: self.disposition,
            emoji: self.emoji,
            raw_response: self.raw_response,
        };
        (self.conversation_id, entry)
    }
}

// ============================================================================
// Lenient integer fields
// ============================================================================

/// Accept `12`, `"12"`, `true`/`false`, `null`, or `""` for an optional integer
///
/// The web client posts route parameters as strings and checkbox state as
/// booleans; both land in integer columns.
///
/// # Errors
///
/// Returns a deserialization error for non-numeric strings, fractional
/// numbers, and non-scalar values.
pub fn deserialize_optional_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(flag)) => Ok(Some(i64::from(flag))),
        Some(Value::Number(number)) => number
            .as_i64()
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected an integer, got {number}"))),
        Some(Value::String(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                trimmed
                    .parse::<i64>()
                    .map(Some)
                    .map_err(|_| D::Error::custom(format!("expected an integer, got \"{text}\"")))
            }
        }
        Some(other) => Err(D::Error::custom(format!(
            "expected an integer, got {other}"
        ))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ids_accept_numbers_and_numeric_strings() {
        let input: ConversationLogInput =
            serde_json::from_value(json!({"conversation_id": "42", "is_visible": true})).unwrap();
        assert_eq!(input.conversation_id, Some(42));
        assert_eq!(input.is_visible, Some(1));

        let input: PersonaInput =
            serde_json::from_value(json!({"company_id": 7, "age": ""})).unwrap();
        assert_eq!(input.company_id, Some(7));
        assert_eq!(input.age, None);
    }

    #[test]
    fn test_non_numeric_id_is_rejected() {
        let result: Result<PersonaInput, _> =
            serde_json::from_value(json!({"company_id": "seven"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_emotion_labels_follow_base_emotion_order() {
        let input = PersonaInput {
            base_emotion_joy: Some("High".to_owned()),
            base_emotion_anticipation: Some("Low".to_owned()),
            ..PersonaInput::default()
        };
        let labels = input.emotion_labels();
        assert_eq!(labels[0], ("joy", Some("High")));
        assert_eq!(labels[3], ("surprise", None));
        assert_eq!(labels[7], ("anticipation", Some("Low")));
    }

    #[test]
    fn test_log_input_defaults_to_visible_user_turn() {
        let input: ConversationLogInput =
            serde_json::from_value(json!({"conversation_id": 3, "statement": "hi"})).unwrap();
        let (conversation_id, entry) = input.into_entry();
        assert_eq!(conversation_id, Some(3));
        assert_eq!(entry.is_visible, 1);
        assert_eq!(entry.is_persona_response, 0);
    }
}
