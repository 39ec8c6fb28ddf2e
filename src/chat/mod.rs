// ABOUTME: Persona chat turn: prompt composition, reply salvage, and orchestration
// ABOUTME: Ties the store, the LLM gateway, and the transcript writer into one request flow
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Chat Turn
//!
//! One turn runs in this order:
//!
//! 1. persona/company traits, the 20-row history window, and conversation
//!    ownership are read concurrently
//! 2. the company's LLM label is resolved (nothing has been written yet)
//! 3. a conversation is opened if the caller did not name one
//! 4. the user's question is logged
//! 5. the provider is called and its text extracted
//! 6. the `{response, disposition, emoji}` reply is salvaged
//! 7. the persona's reply is logged with the full provider payload
//!
//! Concurrent turns on one conversation are not serialized; their log rows
//! may interleave, but each row is written whole.

mod error;
/// System and user prompt rendering
pub mod prompt;
pub mod recovery;
mod turn;

pub use error::ChatError;
pub use recovery::{RecoveredReply, ResponseRecovery, Stage, Unrecoverable};
pub use turn::{ChatTurnReply, ChatTurnRequest, ChatTurnService};
