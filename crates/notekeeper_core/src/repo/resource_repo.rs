//! Resource entry repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the shared `resources` table for notes/tasks.
//!
//! # Invariants
//! - Every query is constrained to the caller's resource kind; a note id
//!   never resolves through the task APIs and vice versa.

use crate::model::access::Resource;
use crate::model::resource_entry::{ResourceEntry, ResourceId};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const RESOURCE_SELECT_SQL: &str = "SELECT uuid, kind, title, content FROM resources";

/// Repository interface for note/task rows.
pub trait ResourceRepository {
    /// Persists one entry and returns its stable id.
    fn create(&self, entry: &ResourceEntry) -> RepoResult<ResourceId>;
    /// Gets one entry by kind and id.
    fn get(&self, kind: Resource, id: ResourceId) -> RepoResult<Option<ResourceEntry>>;
    /// Lists all entries of one kind in stable id order.
    fn list(&self, kind: Resource) -> RepoResult<Vec<ResourceEntry>>;
    /// Replaces title/content; returns whether a row was changed.
    fn update(&self, kind: Resource, id: ResourceId, title: &str, content: &str)
        -> RepoResult<bool>;
    /// Deletes one entry; returns whether a row was removed.
    fn delete(&self, kind: Resource, id: ResourceId) -> RepoResult<bool>;
}

/// SQLite-backed resource repository.
pub struct SqliteResourceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteResourceRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ResourceRepository for SqliteResourceRepository<'_> {
    fn create(&self, entry: &ResourceEntry) -> RepoResult<ResourceId> {
        self.conn.execute(
            "INSERT INTO resources (uuid, kind, title, content)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                entry.uuid.to_string(),
                entry.kind.as_str(),
                entry.title.as_str(),
                entry.content.as_str(),
            ],
        )?;
        Ok(entry.uuid)
    }

    fn get(&self, kind: Resource, id: ResourceId) -> RepoResult<Option<ResourceEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RESOURCE_SELECT_SQL} WHERE kind = ?1 AND uuid = ?2;"
        ))?;

        let mut rows = stmt.query(params![kind.as_str(), id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_resource_row(row, kind)?));
        }
        Ok(None)
    }

    fn list(&self, kind: Resource) -> RepoResult<Vec<ResourceEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RESOURCE_SELECT_SQL} WHERE kind = ?1 ORDER BY uuid ASC;"
        ))?;

        let mut rows = stmt.query([kind.as_str()])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_resource_row(row, kind)?);
        }
        Ok(entries)
    }

    fn update(
        &self,
        kind: Resource,
        id: ResourceId,
        title: &str,
        content: &str,
    ) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE resources SET title = ?1, content = ?2
             WHERE kind = ?3 AND uuid = ?4;",
            params![title, content, kind.as_str(), id.to_string()],
        )?;
        Ok(changed > 0)
    }

    fn delete(&self, kind: Resource, id: ResourceId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM resources WHERE kind = ?1 AND uuid = ?2;",
            params![kind.as_str(), id.to_string()],
        )?;
        Ok(changed > 0)
    }
}

fn parse_resource_row(row: &Row<'_>, kind: Resource) -> RepoResult<ResourceEntry> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in resources.uuid"))
    })?;

    Ok(ResourceEntry {
        uuid,
        kind,
        title: row.get("title")?,
        content: row.get("content")?,
    })
}
