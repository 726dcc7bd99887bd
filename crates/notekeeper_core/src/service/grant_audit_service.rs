//! Audited grant/revoke operations.
//!
//! # Responsibility
//! - Wrap matrix mutations with before/after diff auditing.
//!
//! # Invariants
//! - One audit record is appended per grant actually added or removed;
//!   no-op calls (re-granting a held permission) append nothing.
//! - The target identity is resolved before any mutation is attempted.
//!
//! Recording the diff instead of the call keeps the trail faithful to the
//! state change: the record set reconstructs exactly which authorization
//! facts appeared or disappeared, and when.

use crate::model::access::{AccessLevel, Resource};
use crate::model::identity::Identity;
use crate::repo::audit_repo::AuditRepository;
use crate::repo::grant_repo::GrantRepository;
use crate::repo::identity_repo::IdentityRepository;
use crate::service::audit_trail::AuditTrail;
use crate::service::permission_matrix::{GrantDiff, PermissionMatrix};
use crate::service::AccessResult;

/// Diff-based auditor for administrative permission changes.
pub struct GrantAuditService<'a, G: GrantRepository, I: IdentityRepository, A: AuditRepository> {
    matrix: &'a PermissionMatrix<G, I>,
    trail: &'a AuditTrail<A>,
}

impl<'a, G: GrantRepository, I: IdentityRepository, A: AuditRepository>
    GrantAuditService<'a, G, I, A>
{
    pub fn new(matrix: &'a PermissionMatrix<G, I>, trail: &'a AuditTrail<A>) -> Self {
        Self { matrix, trail }
    }

    /// Grants (resource, access) to the target and audits the change.
    pub fn grant(
        &self,
        resource: Resource,
        username: &str,
        access: AccessLevel,
        guarantor: &str,
    ) -> AccessResult<Identity> {
        let identity = self.matrix.identity(username)?;
        let diff = self.matrix.grant_diff(username, resource, access)?;
        self.record_diff(username, guarantor, &diff)?;
        Ok(identity)
    }

    /// Revokes (resource, access) from the target and audits the change.
    pub fn revoke(
        &self,
        resource: Resource,
        username: &str,
        access: AccessLevel,
        guarantor: &str,
    ) -> AccessResult<Identity> {
        let identity = self.matrix.identity(username)?;
        let diff = self.matrix.revoke_diff(username, resource, access)?;
        self.record_diff(username, guarantor, &diff)?;
        Ok(identity)
    }

    fn record_diff(&self, username: &str, guarantor: &str, diff: &GrantDiff) -> AccessResult<()> {
        for grant in diff.added() {
            self.trail.record(
                Some(username),
                grant.access.as_str(),
                true,
                &format!("Granted {grant} to {username} by {guarantor}"),
            )?;
        }

        for grant in diff.removed() {
            self.trail.record(
                Some(username),
                grant.access.as_str(),
                true,
                &format!("Revoked {grant} from {username} by {guarantor}"),
            )?;
        }

        Ok(())
    }
}
