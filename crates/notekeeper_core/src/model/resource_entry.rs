//! Resource entry model for notes and tasks.
//!
//! # Responsibility
//! - Define the storage shape shared by note and task rows.
//!
//! The core gates access to these rows; their content semantics belong to
//! whichever caller owns the resource operations.

use crate::model::access::Resource;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a note/task row.
pub type ResourceId = Uuid;

/// One note or task row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEntry {
    /// Stable global id.
    pub uuid: ResourceId,
    /// Which resource type this row belongs to.
    pub kind: Resource,
    pub title: String,
    pub content: String,
}

impl ResourceEntry {
    /// Creates a new entry with a generated stable id.
    pub fn new(kind: Resource, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            kind,
            title: title.into(),
            content: content.into(),
        }
    }
}
