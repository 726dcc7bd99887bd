//! Access-control vocabulary: resources, access levels and grant sets.
//!
//! # Responsibility
//! - Define the typed (resource, access) grant vocabulary.
//! - Provide parse helpers for transport layers that speak strings.
//! - Provide the immutable grant-set snapshot used for change diffing.
//!
//! # Invariants
//! - A grant is a set member: holding it twice is indistinguishable from
//!   holding it once.
//! - `GrantSet` values are immutable snapshots; diffing two snapshots never
//!   observes in-progress mutation.
//!
//! Access levels use the operational view/add/change/delete names. The older
//! abstract read/write/update/delete taxonomy maps onto them one-to-one
//! (read -> view, write -> add, update -> change, delete -> delete) and
//! `parse_access_level` accepts both spellings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Resource types subject to access control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Note,
    Task,
}

impl Resource {
    /// Stable string id used in storage and audit action kinds.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Task => "task",
        }
    }

    /// All resource types, in stable order.
    pub fn all() -> [Resource; 2] {
        [Self::Note, Self::Task]
    }
}

impl Display for Resource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access levels grantable per resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    View,
    Add,
    Change,
    Delete,
}

impl AccessLevel {
    /// Stable string id used in storage and audit action kinds.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Add => "add",
            Self::Change => "change",
            Self::Delete => "delete",
        }
    }

    /// All access levels, in stable order.
    pub fn all() -> [AccessLevel; 4] {
        [Self::View, Self::Add, Self::Change, Self::Delete]
    }
}

impl Display for AccessLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse errors for access vocabulary strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessParseError {
    UnknownResource(String),
    UnknownAccessLevel(String),
}

impl Display for AccessParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownResource(value) => write!(f, "unknown resource: `{value}`"),
            Self::UnknownAccessLevel(value) => write!(f, "unknown access level: `{value}`"),
        }
    }
}

impl Error for AccessParseError {}

/// Parses one resource from transport string input.
pub fn parse_resource(value: &str) -> Result<Resource, AccessParseError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "note" => Ok(Resource::Note),
        "task" => Ok(Resource::Task),
        other => Err(AccessParseError::UnknownResource(other.to_string())),
    }
}

/// Parses one access level from transport string input.
///
/// Accepts the canonical operational names and the abstract aliases:
/// `read` -> view, `write` -> add, `update` -> change.
pub fn parse_access_level(value: &str) -> Result<AccessLevel, AccessParseError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "view" | "read" => Ok(AccessLevel::View),
        "add" | "write" => Ok(AccessLevel::Add),
        "change" | "update" => Ok(AccessLevel::Change),
        "delete" => Ok(AccessLevel::Delete),
        other => Err(AccessParseError::UnknownAccessLevel(other.to_string())),
    }
}

/// One (resource, access) authorization fact.
///
/// The holding identity is implied by the set the grant lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Grant {
    pub resource: Resource,
    pub access: AccessLevel,
}

impl Grant {
    pub fn new(resource: Resource, access: AccessLevel) -> Self {
        Self { resource, access }
    }

    /// Audit action kind for operations gated by this grant, e.g. `add_note`.
    pub fn action_kind(&self) -> String {
        format!("{}_{}", self.access.as_str(), self.resource.as_str())
    }
}

impl Display for Grant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} on {}", self.access, self.resource)
    }
}

/// Immutable snapshot of one identity's full grant set.
///
/// Snapshots are taken before and after permission changes and diffed with
/// [`GrantSet::difference`]; the snapshot never aliases live storage state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantSet {
    grants: BTreeSet<Grant>,
}

impl GrantSet {
    pub fn contains(&self, grant: Grant) -> bool {
        self.grants.contains(&grant)
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    /// Iterates grants in stable (resource, access) order.
    pub fn iter(&self) -> impl Iterator<Item = Grant> + '_ {
        self.grants.iter().copied()
    }

    /// Grants present in `self` but not in `other`.
    pub fn difference(&self, other: &GrantSet) -> Vec<Grant> {
        self.grants.difference(&other.grants).copied().collect()
    }

    /// Access levels held for one resource, in stable order.
    pub fn levels_for(&self, resource: Resource) -> Vec<AccessLevel> {
        self.grants
            .iter()
            .filter(|grant| grant.resource == resource)
            .map(|grant| grant.access)
            .collect()
    }
}

impl FromIterator<Grant> for GrantSet {
    fn from_iter<T: IntoIterator<Item = Grant>>(iter: T) -> Self {
        Self {
            grants: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        parse_access_level, parse_resource, AccessLevel, AccessParseError, Grant, GrantSet,
        Resource,
    };

    #[test]
    fn parses_canonical_access_levels() {
        assert_eq!(parse_access_level("view").unwrap(), AccessLevel::View);
        assert_eq!(parse_access_level("add").unwrap(), AccessLevel::Add);
        assert_eq!(parse_access_level("change").unwrap(), AccessLevel::Change);
        assert_eq!(parse_access_level("delete").unwrap(), AccessLevel::Delete);
    }

    #[test]
    fn normalizes_abstract_access_aliases() {
        assert_eq!(parse_access_level("READ").unwrap(), AccessLevel::View);
        assert_eq!(parse_access_level("write").unwrap(), AccessLevel::Add);
        assert_eq!(parse_access_level(" update ").unwrap(), AccessLevel::Change);
    }

    #[test]
    fn rejects_unknown_vocabulary() {
        assert_eq!(
            parse_access_level("execute"),
            Err(AccessParseError::UnknownAccessLevel("execute".to_string()))
        );
        assert_eq!(
            parse_resource("calendar"),
            Err(AccessParseError::UnknownResource("calendar".to_string()))
        );
    }

    #[test]
    fn grant_set_difference_is_order_independent() {
        let before: GrantSet = [Grant::new(Resource::Note, AccessLevel::View)]
            .into_iter()
            .collect();
        let after: GrantSet = [
            Grant::new(Resource::Note, AccessLevel::View),
            Grant::new(Resource::Note, AccessLevel::Add),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            after.difference(&before),
            vec![Grant::new(Resource::Note, AccessLevel::Add)]
        );
        assert!(before.difference(&after).is_empty());
        assert!(after.contains(Grant::new(Resource::Note, AccessLevel::Add)));
        assert_eq!(after.iter().count(), 2);
    }

    #[test]
    fn grant_set_lists_levels_per_resource_in_stable_order() {
        let set: GrantSet = [
            Grant::new(Resource::Task, AccessLevel::Delete),
            Grant::new(Resource::Note, AccessLevel::Add),
            Grant::new(Resource::Note, AccessLevel::View),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            set.levels_for(Resource::Note),
            vec![AccessLevel::View, AccessLevel::Add]
        );
        assert_eq!(set.levels_for(Resource::Task), vec![AccessLevel::Delete]);
    }

    #[test]
    fn action_kind_combines_access_and_resource() {
        assert_eq!(
            Grant::new(Resource::Task, AccessLevel::Change).action_kind(),
            "change_task"
        );
    }
}
