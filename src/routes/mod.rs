// ABOUTME: Route module organization for the persona chat HTTP endpoints
// ABOUTME: Groups health, chat, and generic resource routes by concern
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Route module
//!
//! Each module holds route definitions and thin handlers that delegate to
//! the store or the chat turn service.

/// Chat turn route
pub mod chat;
/// Health check route
pub mod health;
/// Generic CRUD routes for companies, personas, conversations, and logs
pub mod resources;

/// Chat route handlers
pub use chat::ChatRoutes;
/// Health check route handlers
pub use health::HealthRoutes;
/// Resource route handlers
pub use resources::{ListQuery, Resource, ResourceRoutes};
