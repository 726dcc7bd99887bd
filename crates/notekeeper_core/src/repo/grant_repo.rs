//! Grant repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist the (username, resource, access) grant set.
//! - Keep grant membership semantics (set, not bag) at the storage layer.
//!
//! # Invariants
//! - `add` is idempotent: re-adding a held grant changes nothing.
//! - `remove` is idempotent: removing an absent grant changes nothing.
//! - Grant rows exist only for existing identities (FK enforced).

use crate::model::access::{parse_access_level, parse_resource, Grant, GrantSet};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection};

/// Repository interface for grant-set persistence.
pub trait GrantRepository {
    /// Idempotently adds one grant.
    fn add(&self, username: &str, grant: Grant) -> RepoResult<()>;
    /// Idempotently removes one grant.
    fn remove(&self, username: &str, grant: Grant) -> RepoResult<()>;
    /// Returns whether the identity holds the grant.
    fn has(&self, username: &str, grant: Grant) -> RepoResult<bool>;
    /// Returns an immutable snapshot of the identity's full grant set.
    fn grants_for(&self, username: &str) -> RepoResult<GrantSet>;
}

/// SQLite-backed grant repository.
pub struct SqliteGrantRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGrantRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl GrantRepository for SqliteGrantRepository<'_> {
    fn add(&self, username: &str, grant: Grant) -> RepoResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO grants (username, resource, access)
             VALUES (?1, ?2, ?3);",
            params![username, grant.resource.as_str(), grant.access.as_str()],
        )?;
        Ok(())
    }

    fn remove(&self, username: &str, grant: Grant) -> RepoResult<()> {
        self.conn.execute(
            "DELETE FROM grants
             WHERE username = ?1 AND resource = ?2 AND access = ?3;",
            params![username, grant.resource.as_str(), grant.access.as_str()],
        )?;
        Ok(())
    }

    fn has(&self, username: &str, grant: Grant) -> RepoResult<bool> {
        let exists = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM grants
                WHERE username = ?1 AND resource = ?2 AND access = ?3
            );",
            params![username, grant.resource.as_str(), grant.access.as_str()],
            |row| row.get::<_, i64>(0),
        )?;
        Ok(exists == 1)
    }

    fn grants_for(&self, username: &str) -> RepoResult<GrantSet> {
        let mut stmt = self.conn.prepare(
            "SELECT resource, access FROM grants
             WHERE username = ?1
             ORDER BY resource, access;",
        )?;

        let mut rows = stmt.query([username])?;
        let mut grants = Vec::new();
        while let Some(row) = rows.next()? {
            let resource_text: String = row.get(0)?;
            let access_text: String = row.get(1)?;

            let resource = parse_resource(&resource_text).map_err(|_| {
                RepoError::InvalidData(format!(
                    "invalid resource `{resource_text}` in grants.resource"
                ))
            })?;
            let access = parse_access_level(&access_text).map_err(|_| {
                RepoError::InvalidData(format!("invalid access `{access_text}` in grants.access"))
            })?;

            grants.push(Grant::new(resource, access));
        }

        Ok(grants.into_iter().collect())
    }
}
