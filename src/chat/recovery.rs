// ABOUTME: Staged salvage of the persona's JSON reply from unreliable LLM text
// ABOUTME: Direct parse first, then outer-brace extraction with regex quoting and trailing-comma repair
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Response Recovery
//!
//! The persona is told to answer with `{"response", "disposition", "emoji"}`
//! but models wrap the object in prose or markdown, drop quotes, and leave
//! trailing commas. Recovery runs in a fixed order:
//!
//! 1. Parse the trimmed text as JSON.
//! 2. Otherwise take everything from the first `{` to the last `}`. No braces
//!    at all is terminal.
//! 3. Quote bare keys before a colon, quote bare word values after a colon
//!    (except words starting with `true`, `false`, or `null`), and drop commas
//!    before `}` or `]`.
//! 4. Parse the repaired candidate. Failure is terminal and keeps the
//!    candidate for diagnosis.
//!
//! The repair is textual, not a JSON grammar. It also rewrites text inside
//! string values (`"at 10:30"` gains stray quotes), so some inputs that look
//! salvageable are rejected. Missing fields after a successful parse are not
//! an error; they come back as `None`.

use regex::{Captures, Regex};
use serde_json::{Map, Value};
use std::fmt;
use tracing::warn;

/// Which step produced the reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// The text was valid JSON as-is
    Direct,
    /// The text needed brace extraction and textual repair
    Repaired,
}

/// Persona reply fields pulled out of the model output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredReply {
    /// What the persona says
    pub response: Option<String>,
    /// One to three word mood label
    pub disposition: Option<String>,
    /// Mood as an emoji
    pub emoji: Option<String>,
    /// Step that produced the fields
    pub stage: Stage,
}

/// Terminal recovery failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unrecoverable {
    /// Parser message from the last attempt
    pub reason: String,
    /// Text as received from the provider
    pub raw: String,
    /// Repaired candidate, absent when no braces were found
    pub cleaned: Option<String>,
}

impl fmt::Display for Unrecoverable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.cleaned.is_some() {
            write!(
                f,
                "LLM response was not valid JSON after cleanup attempt: {}",
                self.reason
            )
        } else {
            write!(
                f,
                "LLM response was not valid JSON and no curly braces found: {}",
                self.reason
            )
        }
    }
}

impl std::error::Error for Unrecoverable {}

/// Compiled repair patterns
#[derive(Debug, Clone)]
pub struct ResponseRecovery {
    outer_braces: Regex,
    bare_key: Regex,
    bare_value: Regex,
    trailing_comma: Regex,
}

impl ResponseRecovery {
    /// Compile the repair patterns
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern fails to compile
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            outer_braces: Regex::new(r"(?s)\{.*\}")?,
            bare_key: Regex::new(r#"(['"])?([a-zA-Z0-9_]+)(['"])?:"#)?,
            bare_value: Regex::new(r":(\s*)([a-zA-Z0-9_]+)")?,
            trailing_comma: Regex::new(r",\s*([\]}])")?,
        })
    }

    /// Run the staged recovery over model output
    ///
    /// # Errors
    ///
    /// Returns [`Unrecoverable`] when the text has no braces or the repaired
    /// candidate still does not parse
    pub fn recover(&self, text: &str) -> Result<RecoveredReply, Unrecoverable> {
        let trimmed = text.trim();

        let direct_error = match serde_json::from_str::<Value>(trimmed) {
            Ok(value) => return Ok(reply_from(&value, Stage::Direct)),
            Err(e) => e,
        };

        let Some(candidate) = self.outer_braces.find(trimmed) else {
            return Err(Unrecoverable {
                reason: direct_error.to_string(),
                raw: text.to_owned(),
                cleaned: None,
            });
        };

        let cleaned = self.repair(candidate.as_str());
        match serde_json::from_str::<Value>(&cleaned) {
            Ok(value) => {
                warn!("LLM response needed repair before parsing");
                Ok(reply_from(&value, Stage::Repaired))
            }
            Err(e) => Err(Unrecoverable {
                reason: e.to_string(),
                raw: text.to_owned(),
                cleaned: Some(cleaned),
            }),
        }
    }

    /// Textual repair of a brace-delimited candidate
    #[must_use]
    pub fn repair(&self, candidate: &str) -> String {
        let quoted_keys = self.bare_key.replace_all(candidate, r#""${2}":"#);
        let quoted_values = self.bare_value.replace_all(&quoted_keys, |caps: &Captures| {
            let word = &caps[2];
            if ["true", "false", "null"]
                .iter()
                .any(|literal| word.starts_with(literal))
            {
                caps[0].to_owned()
            } else {
                format!(":{}\"{word}\"", &caps[1])
            }
        });
        self.trailing_comma
            .replace_all(&quoted_values, "${1}")
            .into_owned()
    }
}

/// Pull the three reply fields out of a parsed value
fn reply_from(value: &Value, stage: Stage) -> RecoveredReply {
    let empty = Map::new();
    let object = value.as_object().unwrap_or(&empty);
    let field = |key: &str| match object.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(other) => Some(other.to_string()),
    };

    RecoveredReply {
        response: field("response"),
        disposition: field("disposition"),
        emoji: field("emoji"),
        stage,
    }
}
