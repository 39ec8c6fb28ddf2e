// ABOUTME: Error types re-exported from persona-core for crate-local paths
// ABOUTME: Keeps `crate::errors::AppError` stable for handlers, store, and chat flow
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use persona_core::errors::*;
