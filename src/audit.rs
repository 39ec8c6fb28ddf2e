// ABOUTME: Explicit audit context threaded into every store write
// ABOUTME: Replaces process-wide "current user/version" constants with a caller-supplied value
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::Utc;

/// Who is writing, and from which application version
///
/// Every insert records `created_by`/`changed_by`/`changed_during_version`
/// from this value, and every update or soft delete refreshes `changed_by`,
/// `changed_date`, and `changed_during_version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditContext {
    /// Actor recorded in `created_by` / `changed_by`
    pub actor: String,
    /// Application version recorded in `changed_during_version`
    pub version: String,
}

impl AuditContext {
    /// Create an audit context
    #[must_use]
    pub fn new(actor: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            version: version.into(),
        }
    }

    /// Timestamp for `created_date` / `changed_date` columns (RFC 3339, UTC)
    #[must_use]
    pub fn now() -> String {
        Utc::now().to_rfc3339()
    }
}

impl Default for AuditContext {
    fn default() -> Self {
        Self::new(
            persona_core::constants::defaults::AUDIT_ACTOR,
            env!("CARGO_PKG_VERSION"),
        )
    }
}
