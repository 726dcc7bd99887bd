//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Own the access-control error taxonomy surfaced to transport layers.
//!
//! # Invariants
//! - Authorization and credential failures are recorded in the audit trail
//!   before they surface; they are never swallowed or retried here.
//! - Input-vocabulary errors (unknown resource/access strings) surface
//!   immediately without audit overhead.

use crate::model::access::{AccessLevel, AccessParseError, Resource};
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod access_control;
pub mod audit_trail;
pub mod credential_service;
pub mod grant_audit_service;
pub mod permission_guard;
pub mod permission_matrix;
pub mod resource_service;
pub mod session_service;

pub type AccessResult<T> = Result<T, AccessError>;

/// Service-level error taxonomy for the access-control core.
#[derive(Debug)]
pub enum AccessError {
    /// Registration target username already exists.
    DuplicateIdentity(String),
    /// Password rejected by the configured policy.
    WeakPassword(String),
    /// Referenced username does not resolve to an identity.
    UnknownIdentity(String),
    /// Login credentials do not match (uniform, deliberately vague).
    InvalidCredentials,
    /// Transport supplied an access-level string outside the vocabulary.
    UnknownAccessLevel(String),
    /// Transport supplied a resource string outside the vocabulary.
    UnknownResource(String),
    /// Identity lacks the required grant for the attempted operation.
    PermissionDenied {
        resource: Resource,
        access: AccessLevel,
    },
    /// Logout attempted without an active session.
    AlreadyLoggedOut(String),
    /// Password digest computation failed.
    Hash(bcrypt::BcryptError),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for AccessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateIdentity(username) => {
                write!(f, "identity already exists: {username}")
            }
            Self::WeakPassword(reason) => write!(f, "{reason}"),
            Self::UnknownIdentity(username) => {
                write!(f, "no identity exists with username: {username}")
            }
            Self::InvalidCredentials => {
                write!(f, "login failed: check your username and password")
            }
            Self::UnknownAccessLevel(value) => write!(f, "unknown access level: `{value}`"),
            Self::UnknownResource(value) => write!(f, "unknown resource: `{value}`"),
            Self::PermissionDenied { resource, access } => write!(
                f,
                "insufficient permission: requires {access} on {resource}"
            ),
            Self::AlreadyLoggedOut(username) => {
                write!(f, "identity is not logged in: {username}")
            }
            Self::Hash(err) => write!(f, "password hashing failed: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AccessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Hash(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AccessError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<bcrypt::BcryptError> for AccessError {
    fn from(value: bcrypt::BcryptError) -> Self {
        Self::Hash(value)
    }
}

impl From<AccessParseError> for AccessError {
    fn from(value: AccessParseError) -> Self {
        match value {
            AccessParseError::UnknownResource(text) => Self::UnknownResource(text),
            AccessParseError::UnknownAccessLevel(text) => Self::UnknownAccessLevel(text),
        }
    }
}
