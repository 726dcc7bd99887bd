//! Credential store service.
//!
//! # Responsibility
//! - Hash and verify passwords with an adaptive salted algorithm.
//! - Create identities and enforce the password policy.
//! - Own the activate/deactivate session flag transitions.
//!
//! # Invariants
//! - Two hashes of the same password differ (per-call random salt).
//! - `verify` returns false on mismatch or malformed digest; it never fails.
//! - The first identity ever created becomes an active admin; the
//!   count-then-promote check runs under `bootstrap_lock` so concurrent
//!   registrations cannot both claim the bootstrap slot.

use crate::model::identity::{Identity, Role};
use crate::repo::identity_repo::IdentityRepository;
use crate::repo::RepoError;
use crate::service::{AccessError, AccessResult};
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::{Mutex, PoisonError};

static DIGIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d").expect("valid digit regex"));
static SPECIAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9]").expect("valid special-char regex"));

/// Password acceptance policy.
///
/// Externally configurable; the defaults mirror the registration rules the
/// transport historically enforced (8 chars, one digit, one special).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub min_digit_count: usize,
    pub min_special_char_count: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            min_digit_count: 1,
            min_special_char_count: 1,
        }
    }
}

impl PasswordPolicy {
    /// Validates one candidate password against this policy.
    pub fn validate(&self, password: &str) -> AccessResult<()> {
        if password.chars().count() < self.min_length {
            return Err(AccessError::WeakPassword(format!(
                "the password must be at least {} characters long",
                self.min_length
            )));
        }

        if DIGIT_RE.find_iter(password).count() < self.min_digit_count {
            return Err(AccessError::WeakPassword(format!(
                "the password must contain at least {} digit(s)",
                self.min_digit_count
            )));
        }

        if SPECIAL_RE.find_iter(password).count() < self.min_special_char_count {
            return Err(AccessError::WeakPassword(format!(
                "the password must contain at least {} special character(s)",
                self.min_special_char_count
            )));
        }

        Ok(())
    }
}

/// Credential store over identity persistence.
pub struct CredentialService<R: IdentityRepository> {
    repo: R,
    policy: PasswordPolicy,
    // Serializes the count-then-promote bootstrap check across callers.
    bootstrap_lock: Mutex<()>,
}

impl<R: IdentityRepository> CredentialService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R, policy: PasswordPolicy) -> Self {
        Self {
            repo,
            policy,
            bootstrap_lock: Mutex::new(()),
        }
    }

    pub fn policy(&self) -> PasswordPolicy {
        self.policy
    }

    /// Produces a salted adaptive digest for one password.
    pub fn hash(&self, password: &str) -> AccessResult<String> {
        let digest = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
        Ok(digest)
    }

    /// Verifies one password against a stored digest.
    ///
    /// Returns false on mismatch and on malformed digests; verification is
    /// a yes/no question, not a fallible operation, for callers.
    pub fn verify(&self, password: &str, digest: &str) -> bool {
        match bcrypt::verify(password, digest) {
            Ok(matched) => matched,
            Err(err) => {
                warn!("event=password_verify module=credentials status=error error={err}");
                false
            }
        }
    }

    /// Creates one identity after policy and duplicate checks.
    ///
    /// The very first identity stored becomes an active admin regardless of
    /// the requested role; this fires exactly once per store.
    pub fn create(&self, username: &str, password: &str, role: Role) -> AccessResult<Identity> {
        self.policy.validate(password)?;

        let _guard = self
            .bootstrap_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if self.repo.get(username)?.is_some() {
            return Err(AccessError::DuplicateIdentity(username.to_string()));
        }

        let bootstrap_admin = self.repo.count()? == 0;
        let effective_role = if bootstrap_admin { Role::Admin } else { role };
        let digest = self.hash(password)?;

        self.repo.insert(&Identity {
            username: username.to_string(),
            password_hash: Some(digest),
            role: effective_role,
            is_active: bootstrap_admin,
            created_at: 0,
        })?;

        info!(
            "event=identity_create module=credentials status=ok username={username} role={} bootstrap_admin={bootstrap_admin}",
            effective_role.as_str()
        );

        // Read back so created_at reflects what storage assigned.
        self.require(username)
    }

    /// Resolves one identity by username.
    pub fn get(&self, username: &str) -> AccessResult<Option<Identity>> {
        Ok(self.repo.get(username)?)
    }

    /// Resolves one identity or fails with `UnknownIdentity`.
    pub fn require(&self, username: &str) -> AccessResult<Identity> {
        self.repo
            .get(username)?
            .ok_or_else(|| AccessError::UnknownIdentity(username.to_string()))
    }

    /// Attempts to activate a session for the identity.
    ///
    /// Returns false without touching the active flag when a digest is
    /// stored and the password does not verify. Activates and returns true
    /// when the password verifies, or when no digest was ever stored
    /// (first-time activation).
    pub fn activate(&self, username: &str, password: &str) -> AccessResult<bool> {
        let identity = self.require(username)?;

        if let Some(digest) = identity.password_hash.as_deref() {
            if !self.verify(password, digest) {
                return Ok(false);
            }
        }

        self.repo.set_active(username, true)?;
        Ok(true)
    }

    /// Idempotently marks the identity's session inactive.
    pub fn deactivate(&self, username: &str) -> AccessResult<()> {
        match self.repo.set_active(username, false) {
            Ok(()) => Ok(()),
            Err(RepoError::IdentityNotFound(name)) => Err(AccessError::UnknownIdentity(name)),
            Err(other) => Err(other.into()),
        }
    }

    /// Replaces the stored credential after verifying the current one.
    pub fn change_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> AccessResult<()> {
        let identity = self.require(username)?;

        if let Some(digest) = identity.password_hash.as_deref() {
            if !self.verify(current_password, digest) {
                return Err(AccessError::InvalidCredentials);
            }
        }

        self.policy.validate(new_password)?;
        let digest = self.hash(new_password)?;
        self.repo.update_password(username, &digest)?;

        info!("event=password_change module=credentials status=ok username={username}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::PasswordPolicy;
    use crate::service::AccessError;

    #[test]
    fn default_policy_requires_length_digit_and_special() {
        let policy = PasswordPolicy::default();

        assert!(matches!(
            policy.validate("a1!"),
            Err(AccessError::WeakPassword(_))
        ));
        assert!(matches!(
            policy.validate("abcdefgh!"),
            Err(AccessError::WeakPassword(_))
        ));
        assert!(matches!(
            policy.validate("abcdefg1"),
            Err(AccessError::WeakPassword(_))
        ));
        assert!(policy.validate("abcdef1!").is_ok());
    }

    #[test]
    fn relaxed_policy_is_configurable() {
        let policy = PasswordPolicy {
            min_length: 4,
            min_digit_count: 0,
            min_special_char_count: 0,
        };
        assert!(policy.validate("abcd").is_ok());
    }
}
