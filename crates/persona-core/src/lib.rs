// ABOUTME: Core types and constants for the persona chat simulation service
// ABOUTME: Foundation crate with error handling, domain vocabularies, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Persona Core
//!
//! Foundation crate shared by the persona chat server. It changes rarely and
//! holds no I/O:
//!
//! - **errors**: `AppError`, `ErrorCode`, and the HTTP error body
//! - **models**: closed vocabularies (`LlmKind`, `EmotionLevel`, ...)
//! - **constants**: provider endpoints, model ids, and defaults

/// Unified error handling with stable codes and HTTP status mapping
pub mod errors;

/// Closed vocabularies of the data model
pub mod models;

/// Application constants organized by concern
pub mod constants;
