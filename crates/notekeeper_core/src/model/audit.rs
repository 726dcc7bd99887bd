//! Audit record model.
//!
//! # Responsibility
//! - Define the immutable action record persisted by the audit trail.
//!
//! # Invariants
//! - Records are append-only; no code path mutates or deletes one.
//! - The identity reference is weak: it survives identity removal by
//!   nulling, never by cascading into the trail.

use serde::{Deserialize, Serialize};

/// One persisted audit trail entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Storage-assigned sequence id, monotonically increasing per store.
    pub id: i64,
    /// Acting identity; `None` once the referenced identity is gone.
    pub username: Option<String>,
    /// Record time in Unix epoch milliseconds.
    pub timestamp: i64,
    /// Action kind, e.g. `login`, `add` or `view_task`.
    pub action: String,
    /// Whether the recorded action succeeded.
    pub success: bool,
    /// Free-text description of what happened.
    pub detail: String,
}

/// Write model for appending one audit record.
///
/// The store assigns `id` and `timestamp` at append time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditRecord<'a> {
    pub username: Option<&'a str>,
    pub action: &'a str,
    pub success: bool,
    pub detail: &'a str,
}
