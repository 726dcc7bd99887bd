//! Audit trail repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Append action records and read them back in append order.
//!
//! # Invariants
//! - Append-only: this trait exposes no update or delete operation, and no
//!   other component touches `audit_log` rows.
//! - Append order is preserved by the monotonic row id.

use crate::model::audit::{AuditRecord, NewAuditRecord};
use crate::repo::RepoResult;
use rusqlite::{params, Connection, Row};

const AUDIT_SELECT_SQL: &str = "SELECT
    id,
    username,
    timestamp,
    action,
    success,
    detail
FROM audit_log";

/// Repository interface for the append-only audit trail.
pub trait AuditRepository {
    /// Appends one record and returns its assigned sequence id.
    fn append(&self, record: &NewAuditRecord<'_>) -> RepoResult<i64>;
    /// Lists all records in append order.
    fn list_all(&self) -> RepoResult<Vec<AuditRecord>>;
    /// Lists records attributed to one identity, in append order.
    fn list_for(&self, username: &str) -> RepoResult<Vec<AuditRecord>>;
    /// Total number of records ever appended.
    fn count(&self) -> RepoResult<u64>;
}

/// SQLite-backed audit repository.
pub struct SqliteAuditRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAuditRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AuditRepository for SqliteAuditRepository<'_> {
    fn append(&self, record: &NewAuditRecord<'_>) -> RepoResult<i64> {
        self.conn.execute(
            "INSERT INTO audit_log (username, action, success, detail)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                record.username,
                record.action,
                if record.success { 1_i64 } else { 0_i64 },
                record.detail,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn list_all(&self) -> RepoResult<Vec<AuditRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{AUDIT_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;

        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_audit_row(row)?);
        }
        Ok(records)
    }

    fn list_for(&self, username: &str) -> RepoResult<Vec<AuditRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{AUDIT_SELECT_SQL} WHERE username = ?1 ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([username])?;

        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_audit_row(row)?);
        }
        Ok(records)
    }

    fn count(&self) -> RepoResult<u64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM audit_log;", [], |row| {
                row.get::<_, u64>(0)
            })?;
        Ok(count)
    }
}

fn parse_audit_row(row: &Row<'_>) -> RepoResult<AuditRecord> {
    Ok(AuditRecord {
        id: row.get("id")?,
        username: row.get("username")?,
        timestamp: row.get("timestamp")?,
        action: row.get("action")?,
        success: row.get::<_, i64>("success")? != 0,
        detail: row.get("detail")?,
    })
}
