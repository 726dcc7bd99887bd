//! Audited session lifecycle: register, login, logout.
//!
//! # Responsibility
//! - Wrap credential-store transitions with audit recording.
//! - Apply registration policy (default grants) exactly once per identity.
//!
//! # Invariants
//! - Success and failure are both recorded whenever the acted-on identity
//!   is resolvable; an unresolvable username leaves no record (there is
//!   nothing to attribute it to).
//! - A wrong password never activates a session.
//! - Underlying errors re-surface unchanged after being recorded.

use crate::model::identity::{Identity, Role};
use crate::repo::audit_repo::AuditRepository;
use crate::repo::grant_repo::GrantRepository;
use crate::repo::identity_repo::IdentityRepository;
use crate::service::audit_trail::AuditTrail;
use crate::service::credential_service::CredentialService;
use crate::service::permission_matrix::PermissionMatrix;
use crate::service::{AccessError, AccessResult};

const ACTION_REGISTER: &str = "register";
const ACTION_LOGIN: &str = "login";
const ACTION_LOGOUT: &str = "logout";

/// Session auditor over the credential store and permission matrix.
pub struct SessionService<'a, R, G, I, A>
where
    R: IdentityRepository,
    G: GrantRepository,
    I: IdentityRepository,
    A: AuditRepository,
{
    credentials: &'a CredentialService<R>,
    matrix: &'a PermissionMatrix<G, I>,
    trail: &'a AuditTrail<A>,
}

impl<'a, R, G, I, A> SessionService<'a, R, G, I, A>
where
    R: IdentityRepository,
    G: GrantRepository,
    I: IdentityRepository,
    A: AuditRepository,
{
    pub fn new(
        credentials: &'a CredentialService<R>,
        matrix: &'a PermissionMatrix<G, I>,
        trail: &'a AuditTrail<A>,
    ) -> Self {
        Self {
            credentials,
            matrix,
            trail,
        }
    }

    /// Registers a new identity, grants defaults and activates the session.
    pub fn register(
        &self,
        username: &str,
        password: &str,
        is_admin: bool,
    ) -> AccessResult<Identity> {
        let requested_role = if is_admin { Role::Admin } else { Role::User };

        let identity = match self.credentials.create(username, password, requested_role) {
            Ok(identity) => identity,
            Err(err) => return self.record_failure(username, ACTION_REGISTER, err),
        };

        if let Err(err) = self.matrix.grant_defaults(&identity) {
            return self.record_failure(username, ACTION_REGISTER, err);
        }

        match self.credentials.activate(username, password) {
            Ok(true) => {}
            Ok(false) => {
                // Freshly stored digest not verifying means a corrupt write.
                let err = AccessError::InvalidCredentials;
                return self.record_failure(username, ACTION_REGISTER, err);
            }
            Err(err) => return self.record_failure(username, ACTION_REGISTER, err),
        }

        self.trail
            .record(Some(username), ACTION_REGISTER, true, "Registered - true")?;
        self.credentials.require(username)
    }

    /// Verifies credentials and activates the session.
    ///
    /// Unknown usernames surface as `InvalidCredentials` without an audit
    /// record; a resolvable identity gets exactly one record carrying the
    /// boolean activation outcome.
    pub fn login(&self, username: &str, password: &str) -> AccessResult<Identity> {
        if self.credentials.get(username)?.is_none() {
            return Err(AccessError::InvalidCredentials);
        }

        let activated = self.credentials.activate(username, password)?;
        self.trail.record(
            Some(username),
            ACTION_LOGIN,
            activated,
            &format!("Logged in - {activated}"),
        )?;

        if !activated {
            return Err(AccessError::InvalidCredentials);
        }

        self.credentials.require(username)
    }

    /// Deactivates the identity's session.
    pub fn logout(&self, username: &str) -> AccessResult<()> {
        let identity = self.credentials.require(username)?;

        if !identity.is_active {
            let err = AccessError::AlreadyLoggedOut(username.to_string());
            self.trail
                .record(Some(username), ACTION_LOGOUT, false, &err.to_string())?;
            return Err(err);
        }

        self.credentials.deactivate(username)?;
        self.trail
            .record(Some(username), ACTION_LOGOUT, true, "Logged out - true")?;
        Ok(())
    }

    /// Records a failure for `username` if it resolves to an identity, then
    /// re-raises the original error unchanged.
    fn record_failure<T>(
        &self,
        username: &str,
        action: &str,
        err: AccessError,
    ) -> AccessResult<T> {
        if self.credentials.get(username)?.is_some() {
            self.trail
                .record(Some(username), action, false, &err.to_string())?;
        }
        Err(err)
    }
}
