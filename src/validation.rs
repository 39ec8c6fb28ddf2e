// ABOUTME: Field validation for company, persona, and conversation request bodies
// ABOUTME: Converts lenient inputs into checked field sets or a 400-class AppError
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Request validation
//!
//! Vocabulary fields are optional but, when present, must carry one of the
//! exact labels of their enum. Required text fields must be non-blank.

use crate::errors::{AppError, AppResult};
use crate::models::{
    CompanyFields, CompanyInput, ConversationFields, ConversationInput, PersonaFields,
    PersonaInput,
};
use persona_core::constants::defaults;
use std::str::FromStr;

/// Parse an optional vocabulary label, treating blank as absent
fn parse_label<T: FromStr<Err = String>>(value: Option<&str>) -> AppResult<Option<T>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(label) => label.parse::<T>().map(Some).map_err(AppError::invalid_input),
    }
}

/// Require a non-blank text field
fn required(value: Option<String>, message: &str) -> AppResult<String> {
    value
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| AppError::missing_field(message))
}

impl CompanyInput {
    /// Check vocabulary and required fields
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an unknown size or LLM label and
    /// `MissingRequiredField` when name, industry, or API key is blank.
    pub fn validate(self) -> AppResult<CompanyFields> {
        let size = parse_label(self.size.as_deref())?;
        let llm = parse_label(self.llm.as_deref())?;

        Ok(CompanyFields {
            name: required(self.name, "Company name is required.")?,
            industry: required(self.industry, "Industry is required.")?,
            size,
            llm,
            llm_api_key: required(self.llm_api_key, "LLM API Key is required.")?,
            tags: self.tags.unwrap_or_default(),
        })
    }
}

impl PersonaInput {
    /// Check vocabulary and required fields
    ///
    /// # Errors
    ///
    /// Returns `MissingRequiredField` without a company id or name and
    /// `InvalidInput` for an unknown gender or emotion label.
    pub fn validate(self) -> AppResult<PersonaFields> {
        let company_id = self
            .company_id
            .ok_or_else(|| AppError::missing_field("Company ID is required for persona."))?;

        let mut emotions = [None; 8];
        for (slot, (emotion, label)) in emotions.iter_mut().zip(self.emotion_labels()) {
            *slot = parse_label(label).map_err(|_| {
                AppError::invalid_input(format!(
                    "Invalid emotion for base_emotion_{emotion}: {}",
                    label.unwrap_or_default()
                ))
            })?;
        }
        let gender = parse_label(self.gender.as_deref())?;

        Ok(PersonaFields {
            company_id,
            name: required(self.name, "Persona name is required.")?,
            age: self
                .age
                .filter(|age| *age != 0)
                .unwrap_or(defaults::PERSONA_AGE),
            gender,
            location: self.location,
            job_title: self.job_title,
            interests: self.interests,
            challenges: self.challenges,
            emotions,
        })
    }
}

impl ConversationInput {
    /// Check the state label and owning persona
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an unknown state and
    /// `MissingRequiredField` without a persona id.
    pub fn validate(self) -> AppResult<ConversationFields> {
        let conversation_state = parse_label(self.conversation_state.as_deref())
            .map_err(|_| AppError::invalid_input("Invalid conversation state"))?;
        let persona_id = self
            .persona_id
            .ok_or_else(|| AppError::missing_field("Persona ID is required for conversation."))?;

        Ok(ConversationFields {
            persona_id,
            name: self.name.unwrap_or_default(),
            conversation_state,
            conversation_summary: self.conversation_summary.unwrap_or_default(),
            message_count: self.message_count.unwrap_or(0),
            score: self.score,
            keywords: self.keywords.unwrap_or_default(),
            is_follow_up_needed: self.is_follow_up_needed.unwrap_or(0),
            next_step: self.next_step.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use persona_core::errors::ErrorCode;
    use persona_core::models::{CompanySize, EmotionLevel, Gender, LlmKind};

    fn company() -> CompanyInput {
        CompanyInput {
            name: Some("Acme".to_owned()),
            industry: Some("Retail".to_owned()),
            size: Some("Medium".to_owned()),
            llm: Some("Groq".to_owned()),
            llm_api_key: Some("gsk_test".to_owned()),
            tags: None,
        }
    }

    #[test]
    fn test_valid_company() {
        let fields = company().validate().unwrap();
        assert_eq!(fields.size, Some(CompanySize::Medium));
        assert_eq!(fields.llm, Some(LlmKind::Groq));
        assert_eq!(fields.tags, "");
    }

    #[test]
    fn test_company_rejects_unknown_llm() {
        let input = CompanyInput {
            llm: Some("Claude".to_owned()),
            ..company()
        };
        let err = input.validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert_eq!(err.message, "Invalid LLM: Claude");
    }

    #[test]
    fn test_company_requires_api_key() {
        let input = CompanyInput {
            llm_api_key: Some("   ".to_owned()),
            ..company()
        };
        let err = input.validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingRequiredField);
        assert_eq!(err.message, "LLM API Key is required.");
    }

    #[test]
    fn test_persona_defaults_age_and_parses_emotions() {
        let input = PersonaInput {
            company_id: Some(1),
            name: Some("Dana".to_owned()),
            gender: Some("Non-binary".to_owned()),
            base_emotion_trust: Some("Very High".to_owned()),
            ..PersonaInput::default()
        };
        let fields = input.validate().unwrap();
        assert_eq!(fields.age, 20);
        assert_eq!(fields.gender, Some(Gender::NonBinary));
        assert_eq!(fields.emotions[1], Some(EmotionLevel::VeryHigh));
        assert_eq!(fields.emotions[0], None);
    }

    #[test]
    fn test_persona_rejects_bad_emotion_with_field_name() {
        let input = PersonaInput {
            company_id: Some(1),
            name: Some("Dana".to_owned()),
            base_emotion_anger: Some("Furious".to_owned()),
            ..PersonaInput::default()
        };
        let err = input.validate().unwrap_err();
        assert_eq!(err.message, "Invalid emotion for base_emotion_anger: Furious");
    }

    #[test]
    fn test_persona_requires_company() {
        let input = PersonaInput {
            name: Some("Dana".to_owned()),
            ..PersonaInput::default()
        };
        let err = input.validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingRequiredField);
    }

    #[test]
    fn test_conversation_state_checked() {
        let input = ConversationInput {
            persona_id: Some(4),
            conversation_state: Some("Closed".to_owned()),
            ..ConversationInput::default()
        };
        let err = input.validate().unwrap_err();
        assert_eq!(err.message, "Invalid conversation state");
    }
}
