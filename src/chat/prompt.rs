// ABOUTME: Deterministic prompt composition for a persona chat turn
// ABOUTME: Renders the system prompt from traits, the user prompt, and the full message sequence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::database::{HistoryRow, TurnContext};
use crate::llm::ChatMessage;

/// Rendered in place of an empty profile field
const NOT_SPECIFIED: &str = "not specified";

/// Rendered in place of an empty emotion baseline
const NO_EMOTION: &str = "None";

/// Non-blank text or a placeholder
fn or_placeholder<'a>(value: Option<&'a str>, placeholder: &'a str) -> &'a str {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .unwrap_or(placeholder)
}

/// Profile field or `not specified`
fn field(value: Option<&str>) -> &str {
    or_placeholder(value, NOT_SPECIFIED)
}

/// Emotion baseline or `None`
fn emotion(value: Option<&str>) -> &str {
    or_placeholder(value, NO_EMOTION)
}

/// Output contract placed at the top of every system prompt
const OUTPUT_CONTRACT: &str = "You will ONLY respond with unformatted (no asterisks, ampersands or hyphens) text as a JSON response structured as \
{\"response\": \"response to question\", \"disposition\": \"new one to three word disposition\", \"emoji\": \"disposition as an emoji\"}.\n\
Make certain the response is a valid JSON structure.";

/// System prompt carrying the output contract and the persona's traits
///
/// Identical contexts always render byte-identical prompts.
#[must_use]
pub fn system_prompt(ctx: &TurnContext) -> String {
    let persona = field(Some(ctx.persona_name.as_str()));
    let company = field(Some(ctx.company_name.as_str()));
    let industry = field(Some(ctx.industry.as_str()));
    let size = field(ctx.size.as_deref());
    let tags = field(ctx.tags.as_deref());
    let challenges = field(ctx.challenges.as_deref());
    let gender = field(ctx.gender.as_deref());
    let job_title = field(ctx.job_title.as_deref());
    let location = field(ctx.location.as_deref());
    let interests = field(ctx.interests.as_deref());

    let joy = emotion(ctx.base_emotion_joy.as_deref());
    let trust = emotion(ctx.base_emotion_trust.as_deref());
    let fear = emotion(ctx.base_emotion_fear.as_deref());
    let surprise = emotion(ctx.base_emotion_surprise.as_deref());
    let sadness = emotion(ctx.base_emotion_sadness.as_deref());
    let disgust = emotion(ctx.base_emotion_disgust.as_deref());
    let anger = emotion(ctx.base_emotion_anger.as_deref());
    let anticipation = emotion(ctx.base_emotion_anticipation.as_deref());

    format!(
        "{OUTPUT_CONTRACT}\n\
         You will respond as {persona}.\n\
         You work at the {company} company which is a {size} {industry} company and involved in {tags}.\n\
         You started the day having problems with {challenges} but one or more might be resolved already.\n\
         You are {gender} who works as a {job_title} with the {location} branch and your interests include {interests}.\n\
         You can express a range of emotions and your emotional baseline to input is joy is {joy}, trust is {trust}, \
         fear is {fear}, surprise is {surprise}, sadness is {sadness}, disgust is {disgust}, anger is {anger}, \
         and anticipation is {anticipation}.\n\
         When expressing emotion, ensure it feels natural and proportionate to the situation described in the input \
         as influenced by your emotional baseline."
    )
}

/// User prompt carrying the current disposition and the new question
#[must_use]
pub fn user_prompt(last_disposition: &str, question: &str) -> String {
    format!("\nYOUR CURRENT DISPOSITION: {last_disposition}\nUSER QUESTION: {question}")
}

/// Full message sequence: system prompt, history in order, then the new question
#[must_use]
pub fn compose_messages(
    ctx: &TurnContext,
    history: &[HistoryRow],
    question: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(system_prompt(ctx)));

    for row in history {
        let content = row.statement.clone().unwrap_or_default();
        messages.push(if row.is_persona_response == 1 {
            ChatMessage::assistant(content)
        } else {
            ChatMessage::user(content)
        });
    }

    messages.push(ChatMessage::user(user_prompt(&ctx.last_disposition, question)));
    messages
}
