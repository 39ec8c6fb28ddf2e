// ABOUTME: Closed vocabularies of the company/persona/conversation data model
// ABOUTME: String-backed enums with exact wire labels, parsing, and display
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Domain vocabularies
//!
//! The store keeps these values as plain text so the web client can round-trip
//! them untouched. Each enum knows its exact label (`"Very High"`,
//! `"Non-binary"`) and rejects anything else when parsed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! labeled_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $what:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Every allowed value, in declaration order
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Exact label stored in the database and sent over the wire
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok(Self::$variant),)+
                    other => Err(format!("Invalid {}: {other}", $what)),
                }
            }
        }
    };
}

labeled_enum! {
    /// Company headcount bracket
    CompanySize, "company size" {
        /// Small company
        Small => "Small",
        /// Medium company
        Medium => "Medium",
        /// Large company
        Large => "Large",
    }
}

labeled_enum! {
    /// LLM backend a company is configured to use
    LlmKind, "LLM" {
        /// `OpenAI` responses API
        ChatGpt => "ChatGPT",
        /// Groq chat-completions API
        Groq => "Groq",
    }
}

labeled_enum! {
    /// Persona gender
    Gender, "gender" {
        /// Male
        Male => "Male",
        /// Female
        Female => "Female",
        /// Non-binary
        NonBinary => "Non-binary",
        /// Other
        Other => "Other",
    }
}

labeled_enum! {
    /// Baseline intensity of one of the eight base emotions
    EmotionLevel, "emotion level" {
        /// Not present
        None => "None",
        /// Low
        Low => "Low",
        /// Moderate
        Moderate => "Moderate",
        /// High
        High => "High",
        /// Very high
        VeryHigh => "Very High",
    }
}

labeled_enum! {
    /// Outcome state of a conversation
    ConversationState, "conversation state" {
        /// Still open
        Pending => "Pending",
        /// Closed with the persona's problem solved
        Resolved => "Resolved",
        /// Closed without a resolution
        Unresolved => "Unresolved",
    }
}

/// The eight base emotions, in the order they are stored and rendered
pub const BASE_EMOTIONS: [&str; 8] = [
    "joy",
    "trust",
    "fear",
    "surprise",
    "sadness",
    "disgust",
    "anger",
    "anticipation",
];

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip_through_from_str() {
        for level in EmotionLevel::ALL {
            assert_eq!(level.as_str().parse::<EmotionLevel>(), Ok(*level));
        }
        assert_eq!("Non-binary".parse::<Gender>(), Ok(Gender::NonBinary));
    }

    #[test]
    fn test_unknown_llm_is_rejected_with_label() {
        let err = "Claude".parse::<LlmKind>().unwrap_err();
        assert_eq!(err, "Invalid LLM: Claude");
    }

    #[test]
    fn test_serde_uses_exact_labels() {
        let json = serde_json::to_string(&EmotionLevel::VeryHigh).unwrap();
        assert_eq!(json, "\"Very High\"");
        let kind: LlmKind = serde_json::from_str("\"ChatGPT\"").unwrap();
        assert_eq!(kind, LlmKind::ChatGpt);
    }
}
