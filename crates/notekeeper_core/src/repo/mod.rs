//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`IdentityNotFound`) in addition
//!   to DB transport errors.
//! - The audit repository exposes no update or delete operation.

use crate::db::DbError;
use crate::model::resource_entry::ResourceId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod audit_repo;
pub mod grant_repo;
pub mod identity_repo;
pub mod resource_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    IdentityNotFound(String),
    ResourceNotFound(ResourceId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::IdentityNotFound(username) => write!(f, "identity not found: {username}"),
            Self::ResourceNotFound(id) => write!(f, "resource not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::IdentityNotFound(_) | Self::ResourceNotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
