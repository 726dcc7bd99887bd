//! Permission matrix service.
//!
//! # Responsibility
//! - Own every mutation of an identity's grant set.
//! - Provide membership checks and introspection snapshots.
//!
//! # Invariants
//! - Grants have set semantics: both `grant` and `revoke` are idempotent.
//! - Read-check-then-write sequences on one identity's grant set run under
//!   that identity's lock, so concurrent calls cannot lose updates.
//! - At most one identity lock is held at a time; locks are never nested,
//!   so lock acquisition cannot deadlock.

use crate::model::access::{AccessLevel, Grant, GrantSet, Resource};
use crate::model::identity::Identity;
use crate::repo::grant_repo::GrantRepository;
use crate::repo::identity_repo::IdentityRepository;
use crate::service::{AccessError, AccessResult};
use log::info;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Atomic before/after snapshot pair for one grant-set mutation.
///
/// Both snapshots are taken under the identity's lock, so the pair reflects
/// exactly one mutation with no interleaved writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantDiff {
    pub before: GrantSet,
    pub after: GrantSet,
}

impl GrantDiff {
    /// Grants present after the change but not before.
    pub fn added(&self) -> Vec<Grant> {
        self.after.difference(&self.before)
    }

    /// Grants present before the change but not after.
    pub fn removed(&self) -> Vec<Grant> {
        self.before.difference(&self.after)
    }

    pub fn is_empty(&self) -> bool {
        self.before == self.after
    }
}

/// Per-identity lock registry.
///
/// The registry mutex is released before an identity lock is acquired, so
/// holding one never blocks lookups for other identities.
#[derive(Default)]
struct IdentityLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl IdentityLocks {
    fn lock_for(&self, username: &str) -> Arc<Mutex<()>> {
        let mut registry = self
            .locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        registry
            .entry(username.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Grant-set owner over grant and identity persistence.
pub struct PermissionMatrix<G: GrantRepository, I: IdentityRepository> {
    grants: G,
    identities: I,
    locks: IdentityLocks,
}

impl<G: GrantRepository, I: IdentityRepository> PermissionMatrix<G, I> {
    /// Creates a matrix using the provided repository implementations.
    pub fn new(grants: G, identities: I) -> Self {
        Self {
            grants,
            identities,
            locks: IdentityLocks::default(),
        }
    }

    /// Resolves one identity or fails with `UnknownIdentity`.
    pub fn identity(&self, username: &str) -> AccessResult<Identity> {
        self.identities
            .get(username)?
            .ok_or_else(|| AccessError::UnknownIdentity(username.to_string()))
    }

    /// Idempotently adds one grant and returns the resulting set.
    pub fn grant(
        &self,
        username: &str,
        resource: Resource,
        access: AccessLevel,
    ) -> AccessResult<GrantSet> {
        Ok(self.grant_diff(username, resource, access)?.after)
    }

    /// Adds one grant, returning atomic before/after snapshots.
    pub fn grant_diff(
        &self,
        username: &str,
        resource: Resource,
        access: AccessLevel,
    ) -> AccessResult<GrantDiff> {
        self.identity(username)?;
        let grant = Grant::new(resource, access);

        let lock = self.locks.lock_for(username);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let before = self.grants.grants_for(username)?;
        self.grants.add(username, grant)?;
        let after = self.grants.grants_for(username)?;

        if after.len() > before.len() {
            info!(
                "event=grant_add module=permissions status=ok username={username} resource={resource} access={access}"
            );
        }

        Ok(GrantDiff { before, after })
    }

    /// Idempotently removes one grant and returns the resulting set.
    pub fn revoke(
        &self,
        username: &str,
        resource: Resource,
        access: AccessLevel,
    ) -> AccessResult<GrantSet> {
        Ok(self.revoke_diff(username, resource, access)?.after)
    }

    /// Removes one grant, returning atomic before/after snapshots.
    pub fn revoke_diff(
        &self,
        username: &str,
        resource: Resource,
        access: AccessLevel,
    ) -> AccessResult<GrantDiff> {
        self.identity(username)?;
        let grant = Grant::new(resource, access);

        let lock = self.locks.lock_for(username);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let before = self.grants.grants_for(username)?;
        self.grants.remove(username, grant)?;
        let after = self.grants.grants_for(username)?;

        if after.len() < before.len() {
            info!(
                "event=grant_remove module=permissions status=ok username={username} resource={resource} access={access}"
            );
        }

        Ok(GrantDiff { before, after })
    }

    /// Returns whether the identity holds (resource, access).
    ///
    /// Unknown identities simply hold nothing; absence means no access.
    pub fn has(
        &self,
        username: &str,
        resource: Resource,
        access: AccessLevel,
    ) -> AccessResult<bool> {
        Ok(self.grants.has(username, Grant::new(resource, access))?)
    }

    /// Access levels held for one resource, in stable order.
    pub fn all_of(&self, username: &str, resource: Resource) -> AccessResult<Vec<AccessLevel>> {
        Ok(self.grants.grants_for(username)?.levels_for(resource))
    }

    /// Immutable snapshot of the identity's full grant set.
    pub fn snapshot(&self, username: &str) -> AccessResult<GrantSet> {
        Ok(self.grants.grants_for(username)?)
    }

    /// Grants registration defaults: view on every resource for everyone,
    /// plus add/change/delete on every resource for admins.
    ///
    /// This is registration policy, applied once per identity; the matrix
    /// enforces no such rule elsewhere.
    pub fn grant_defaults(&self, identity: &Identity) -> AccessResult<GrantSet> {
        let username = identity.username.as_str();
        self.identity(username)?;

        let lock = self.locks.lock_for(username);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        for resource in Resource::all() {
            for access in AccessLevel::all() {
                if access != AccessLevel::View && !identity.is_admin() {
                    continue;
                }
                self.grants.add(username, Grant::new(resource, access))?;
                info!(
                    "event=grant_default module=permissions status=ok username={username} resource={resource} access={access}"
                );
            }
        }

        Ok(self.grants.grants_for(username)?)
    }
}
