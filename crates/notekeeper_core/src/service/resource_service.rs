//! Guarded note/task entry points.
//!
//! # Responsibility
//! - Expose list/detail/create/edit/delete for both resource kinds, each
//!   gated by the matching access level.
//!
//! # Invariants
//! - No resource operation touches storage without passing the guard first.
//! - Edit/delete of a missing id succeed as no-ops with an explanatory
//!   detail; detail lookup of a missing id is an error.

use crate::model::access::{AccessLevel, Resource};
use crate::model::identity::Identity;
use crate::model::resource_entry::{ResourceEntry, ResourceId};
use crate::repo::audit_repo::AuditRepository;
use crate::repo::grant_repo::GrantRepository;
use crate::repo::identity_repo::IdentityRepository;
use crate::repo::resource_repo::ResourceRepository;
use crate::repo::RepoError;
use crate::service::permission_guard::{ActionOutcome, PermissionGuard};
use crate::service::AccessResult;

fn label(kind: Resource) -> &'static str {
    match kind {
        Resource::Note => "Note",
        Resource::Task => "Task",
    }
}

/// Permission-gated CRUD facade for notes and tasks.
pub struct ResourceService<'a, S, G, I, A>
where
    S: ResourceRepository,
    G: GrantRepository,
    I: IdentityRepository,
    A: AuditRepository,
{
    repo: S,
    guard: PermissionGuard<'a, G, I, A>,
}

impl<'a, S, G, I, A> ResourceService<'a, S, G, I, A>
where
    S: ResourceRepository,
    G: GrantRepository,
    I: IdentityRepository,
    A: AuditRepository,
{
    pub fn new(repo: S, guard: PermissionGuard<'a, G, I, A>) -> Self {
        Self { repo, guard }
    }

    /// Lists all entries of one kind. Requires view access.
    pub fn list(
        &self,
        actor: &Identity,
        kind: Resource,
    ) -> AccessResult<ActionOutcome<Vec<ResourceEntry>>> {
        self.guard.enforce(actor, kind, AccessLevel::View, || {
            let items = self.repo.list(kind)?;
            Ok(ActionOutcome::new(
                items,
                format!("{} list retrieved", label(kind)),
            ))
        })
    }

    /// Gets one entry by id. Requires view access.
    pub fn detail(
        &self,
        actor: &Identity,
        kind: Resource,
        id: ResourceId,
    ) -> AccessResult<ActionOutcome<ResourceEntry>> {
        self.guard.enforce(actor, kind, AccessLevel::View, || {
            let entry = self
                .repo
                .get(kind, id)?
                .ok_or(RepoError::ResourceNotFound(id))?;
            Ok(ActionOutcome::new(
                entry,
                format!("{} detail retrieved for ID {id}", label(kind)),
            ))
        })
    }

    /// Creates one entry. Requires add access.
    pub fn create(
        &self,
        actor: &Identity,
        kind: Resource,
        title: &str,
        content: &str,
    ) -> AccessResult<ActionOutcome<ResourceId>> {
        self.guard.enforce(actor, kind, AccessLevel::Add, || {
            let entry = ResourceEntry::new(kind, title, content);
            let id = self.repo.create(&entry)?;
            Ok(ActionOutcome::new(
                id,
                format!("{} created with title \"{title}\"", label(kind)),
            ))
        })
    }

    /// Replaces title/content of one entry. Requires change access.
    pub fn edit(
        &self,
        actor: &Identity,
        kind: Resource,
        id: ResourceId,
        title: &str,
        content: &str,
    ) -> AccessResult<ActionOutcome<bool>> {
        self.guard.enforce(actor, kind, AccessLevel::Change, || {
            let changed = self.repo.update(kind, id, title, content)?;
            let detail = if changed {
                format!("{} with ID {id} edited", label(kind))
            } else {
                format!("{} with ID {id} not found; nothing edited", label(kind))
            };
            Ok(ActionOutcome::new(changed, detail))
        })
    }

    /// Deletes one entry. Requires delete access.
    pub fn delete(
        &self,
        actor: &Identity,
        kind: Resource,
        id: ResourceId,
    ) -> AccessResult<ActionOutcome<bool>> {
        self.guard.enforce(actor, kind, AccessLevel::Delete, || {
            let removed = self.repo.delete(kind, id)?;
            let detail = if removed {
                format!("{} with ID {id} deleted", label(kind))
            } else {
                format!("{} with ID {id} not found; nothing deleted", label(kind))
            };
            Ok(ActionOutcome::new(removed, detail))
        })
    }
}
