//! Identity repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable persistence APIs over canonical `identities` storage.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `username` is the primary key; inserts of an existing username fail.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::model::identity::{parse_role, Identity};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

const IDENTITY_SELECT_SQL: &str = "SELECT
    username,
    password_hash,
    role,
    is_active,
    created_at
FROM identities";

/// Repository interface for identity records.
pub trait IdentityRepository {
    /// Persists a new identity row.
    fn insert(&self, identity: &Identity) -> RepoResult<()>;
    /// Gets one identity by username.
    fn get(&self, username: &str) -> RepoResult<Option<Identity>>;
    /// Counts all identities ever created in this store.
    fn count(&self) -> RepoResult<u64>;
    /// Sets the active session flag.
    fn set_active(&self, username: &str, active: bool) -> RepoResult<()>;
    /// Replaces the stored password digest.
    fn update_password(&self, username: &str, digest: &str) -> RepoResult<()>;
}

/// SQLite-backed identity repository.
pub struct SqliteIdentityRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteIdentityRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl IdentityRepository for SqliteIdentityRepository<'_> {
    fn insert(&self, identity: &Identity) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO identities (username, password_hash, role, is_active)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                identity.username.as_str(),
                identity.password_hash.as_deref(),
                identity.role.as_str(),
                bool_to_int(identity.is_active),
            ],
        )?;
        Ok(())
    }

    fn get(&self, username: &str) -> RepoResult<Option<Identity>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{IDENTITY_SELECT_SQL} WHERE username = ?1;"))?;
        let row = stmt
            .query_row([username], |row| {
                Ok((
                    row.get::<_, String>("username")?,
                    row.get::<_, Option<String>>("password_hash")?,
                    row.get::<_, String>("role")?,
                    row.get::<_, i64>("is_active")?,
                    row.get::<_, i64>("created_at")?,
                ))
            })
            .optional()?;

        match row {
            Some(raw) => Ok(Some(parse_identity_row(raw)?)),
            None => Ok(None),
        }
    }

    fn count(&self) -> RepoResult<u64> {
        let count =
            self.conn
                .query_row("SELECT COUNT(*) FROM identities;", [], |row| {
                    row.get::<_, u64>(0)
                })?;
        Ok(count)
    }

    fn set_active(&self, username: &str, active: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE identities SET is_active = ?1 WHERE username = ?2;",
            params![bool_to_int(active), username],
        )?;

        if changed == 0 {
            return Err(RepoError::IdentityNotFound(username.to_string()));
        }

        Ok(())
    }

    fn update_password(&self, username: &str, digest: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE identities SET password_hash = ?1 WHERE username = ?2;",
            params![digest, username],
        )?;

        if changed == 0 {
            return Err(RepoError::IdentityNotFound(username.to_string()));
        }

        Ok(())
    }
}

type RawIdentityRow = (String, Option<String>, String, i64, i64);

fn parse_identity_row(raw: RawIdentityRow) -> RepoResult<Identity> {
    let (username, password_hash, role_text, is_active, created_at) = raw;

    let role = parse_role(&role_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid role `{role_text}` in identities.role"))
    })?;

    let is_active = match is_active {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_active value `{other}` in identities.is_active"
            )));
        }
    };

    Ok(Identity {
        username,
        password_hash,
        role,
        is_active,
        created_at,
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
