//! Audit trail recording facade.
//!
//! # Responsibility
//! - Append one immutable record per sensitive action outcome.
//! - Mirror every record to the diagnostic logger.
//!
//! # Invariants
//! - Records are only ever appended; nothing in the crate mutates one.
//! - Appends from one logical operation happen in causal order because
//!   `record` writes synchronously before returning.

use crate::model::audit::{AuditRecord, NewAuditRecord};
use crate::repo::audit_repo::AuditRepository;
use crate::repo::RepoResult;
use log::{error, info};

/// Append-only recorder wired to the audit repository.
pub struct AuditTrail<R: AuditRepository> {
    repo: R,
}

impl<R: AuditRepository> AuditTrail<R> {
    /// Creates a trail using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Appends one action record and mirrors it to the logger.
    ///
    /// Failed actions log at error level, successes at info, so the log file
    /// tells the same story as the persisted trail.
    pub fn record(
        &self,
        username: Option<&str>,
        action: &str,
        success: bool,
        detail: &str,
    ) -> RepoResult<i64> {
        let actor = username.unwrap_or("-");
        if success {
            info!(
                "event=user_action module=audit status=ok username={actor} action={action} detail=\"{detail}\""
            );
        } else {
            error!(
                "event=user_action module=audit status=error username={actor} action={action} detail=\"{detail}\""
            );
        }

        self.repo.append(&NewAuditRecord {
            username,
            action,
            success,
            detail,
        })
    }

    /// Lists every record in append order.
    pub fn records(&self) -> RepoResult<Vec<AuditRecord>> {
        self.repo.list_all()
    }

    /// Lists records attributed to one identity, in append order.
    pub fn records_for(&self, username: &str) -> RepoResult<Vec<AuditRecord>> {
        self.repo.list_for(username)
    }

    /// Total number of records appended so far.
    pub fn count(&self) -> RepoResult<u64> {
        self.repo.count()
    }
}
