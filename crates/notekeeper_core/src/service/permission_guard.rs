//! Permission enforcement guard.
//!
//! # Responsibility
//! - Gate arbitrary operations behind a required (resource, access) grant.
//! - Record the outcome of every gated operation in the audit trail.
//!
//! # Invariants
//! - The wrapped operation never runs when the check fails; the denial is
//!   recorded before the error surfaces.
//! - Exactly one audit record is appended per enforcement: a denial, the
//!   operation's success, or the operation's failure.

use crate::model::access::{AccessLevel, Grant, Resource};
use crate::model::identity::Identity;
use crate::repo::audit_repo::AuditRepository;
use crate::repo::grant_repo::GrantRepository;
use crate::repo::identity_repo::IdentityRepository;
use crate::service::audit_trail::AuditTrail;
use crate::service::permission_matrix::PermissionMatrix;
use crate::service::{AccessError, AccessResult};

const INSUFFICIENT_PERMISSION_DETAIL: &str = "Insufficient permission to perform the operation";

/// Result of a successfully gated operation.
///
/// Operations describe what they did in `detail`; the guard copies that
/// text into the success audit record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome<T> {
    pub value: T,
    pub detail: String,
}

impl<T> ActionOutcome<T> {
    pub fn new(value: T, detail: impl Into<String>) -> Self {
        Self {
            value,
            detail: detail.into(),
        }
    }
}

/// Enforcement wrapper around the matrix and the audit trail.
///
/// Every resource action flows through [`PermissionGuard::enforce`]; it is
/// the single choke point where authorization precedes side effects.
pub struct PermissionGuard<'a, G: GrantRepository, I: IdentityRepository, A: AuditRepository> {
    matrix: &'a PermissionMatrix<G, I>,
    trail: &'a AuditTrail<A>,
}

impl<'a, G: GrantRepository, I: IdentityRepository, A: AuditRepository>
    PermissionGuard<'a, G, I, A>
{
    pub fn new(matrix: &'a PermissionMatrix<G, I>, trail: &'a AuditTrail<A>) -> Self {
        Self { matrix, trail }
    }

    /// Runs `operation` if the identity holds (resource, access).
    ///
    /// On denial the operation is never invoked: a failure record with kind
    /// `<access>_<resource>` is appended and `PermissionDenied` surfaces.
    /// On success the operation's own detail text is recorded. If the
    /// operation fails, its error text is recorded and the error re-raised
    /// unchanged.
    pub fn enforce<T, F>(
        &self,
        identity: &Identity,
        resource: Resource,
        access: AccessLevel,
        operation: F,
    ) -> AccessResult<ActionOutcome<T>>
    where
        F: FnOnce() -> AccessResult<ActionOutcome<T>>,
    {
        let kind = Grant::new(resource, access).action_kind();
        let username = identity.username.as_str();

        if !self.matrix.has(username, resource, access)? {
            self.trail
                .record(Some(username), &kind, false, INSUFFICIENT_PERMISSION_DETAIL)?;
            return Err(AccessError::PermissionDenied { resource, access });
        }

        match operation() {
            Ok(outcome) => {
                self.trail
                    .record(Some(username), &kind, true, &outcome.detail)?;
                Ok(outcome)
            }
            Err(err) => {
                self.trail
                    .record(Some(username), &kind, false, &err.to_string())?;
                Err(err)
            }
        }
    }
}
