//! Access-control facade over one SQLite connection.
//!
//! # Responsibility
//! - Wire credential store, permission matrix, audit trail, guard and the
//!   audited wrappers into one object for transport layers.
//!
//! # Invariants
//! - One facade per store connection; all per-identity locking funnels
//!   through the single matrix instance owned here.

use crate::model::access::{parse_access_level, parse_resource, AccessLevel, Resource};
use crate::model::audit::AuditRecord;
use crate::model::identity::Identity;
use crate::model::resource_entry::{ResourceEntry, ResourceId};
use crate::repo::audit_repo::SqliteAuditRepository;
use crate::repo::grant_repo::SqliteGrantRepository;
use crate::repo::identity_repo::SqliteIdentityRepository;
use crate::repo::resource_repo::SqliteResourceRepository;
use crate::service::audit_trail::AuditTrail;
use crate::service::credential_service::{CredentialService, PasswordPolicy};
use crate::service::grant_audit_service::GrantAuditService;
use crate::service::permission_guard::{ActionOutcome, PermissionGuard};
use crate::service::permission_matrix::PermissionMatrix;
use crate::service::resource_service::ResourceService;
use crate::service::session_service::SessionService;
use crate::service::AccessResult;
use rusqlite::Connection;

type Matrix<'c> = PermissionMatrix<SqliteGrantRepository<'c>, SqliteIdentityRepository<'c>>;
type Trail<'c> = AuditTrail<SqliteAuditRepository<'c>>;
type Credentials<'c> = CredentialService<SqliteIdentityRepository<'c>>;
type Guard<'a, 'c> =
    PermissionGuard<'a, SqliteGrantRepository<'c>, SqliteIdentityRepository<'c>, SqliteAuditRepository<'c>>;
type Resources<'a, 'c> = ResourceService<
    'a,
    SqliteResourceRepository<'c>,
    SqliteGrantRepository<'c>,
    SqliteIdentityRepository<'c>,
    SqliteAuditRepository<'c>,
>;

/// The core's external surface, assembled over a migrated connection.
pub struct AccessControl<'conn> {
    conn: &'conn Connection,
    credentials: Credentials<'conn>,
    matrix: Matrix<'conn>,
    trail: Trail<'conn>,
}

impl<'conn> AccessControl<'conn> {
    /// Assembles the core over a migrated connection with a custom policy.
    pub fn new(conn: &'conn Connection, policy: PasswordPolicy) -> Self {
        Self {
            conn,
            credentials: CredentialService::new(SqliteIdentityRepository::new(conn), policy),
            matrix: PermissionMatrix::new(
                SqliteGrantRepository::new(conn),
                SqliteIdentityRepository::new(conn),
            ),
            trail: AuditTrail::new(SqliteAuditRepository::new(conn)),
        }
    }

    /// Assembles the core with the default password policy.
    pub fn with_defaults(conn: &'conn Connection) -> Self {
        Self::new(conn, PasswordPolicy::default())
    }

    fn sessions(
        &self,
    ) -> SessionService<
        '_,
        SqliteIdentityRepository<'conn>,
        SqliteGrantRepository<'conn>,
        SqliteIdentityRepository<'conn>,
        SqliteAuditRepository<'conn>,
    > {
        SessionService::new(&self.credentials, &self.matrix, &self.trail)
    }

    fn guard(&self) -> Guard<'_, 'conn> {
        PermissionGuard::new(&self.matrix, &self.trail)
    }

    fn resources(&self) -> Resources<'_, 'conn> {
        ResourceService::new(SqliteResourceRepository::new(self.conn), self.guard())
    }

    /// Registers a new identity with default grants and an active session.
    pub fn register(
        &self,
        username: &str,
        password: &str,
        is_admin: bool,
    ) -> AccessResult<Identity> {
        self.sessions().register(username, password, is_admin)
    }

    /// Verifies credentials and activates the identity's session.
    pub fn login(&self, username: &str, password: &str) -> AccessResult<Identity> {
        self.sessions().login(username, password)
    }

    /// Deactivates the identity's session.
    pub fn logout(&self, username: &str) -> AccessResult<()> {
        self.sessions().logout(username)
    }

    /// Grants (resource, access) to the target, audited by diff.
    pub fn grant(
        &self,
        resource: Resource,
        username: &str,
        access: AccessLevel,
        guarantor: &str,
    ) -> AccessResult<()> {
        GrantAuditService::new(&self.matrix, &self.trail)
            .grant(resource, username, access, guarantor)
            .map(|_| ())
    }

    /// Revokes (resource, access) from the target, audited by diff.
    pub fn revoke(
        &self,
        resource: Resource,
        username: &str,
        access: AccessLevel,
        guarantor: &str,
    ) -> AccessResult<()> {
        GrantAuditService::new(&self.matrix, &self.trail)
            .revoke(resource, username, access, guarantor)
            .map(|_| ())
    }

    /// String-vocabulary variant of [`AccessControl::grant`] for transports.
    ///
    /// Accepts both the operational names and the abstract aliases
    /// (read/write/update); unknown strings fail before any audit overhead.
    pub fn grant_named(
        &self,
        resource: &str,
        username: &str,
        access: &str,
        guarantor: &str,
    ) -> AccessResult<()> {
        let resource = parse_resource(resource)?;
        let access = parse_access_level(access)?;
        self.grant(resource, username, access, guarantor)
    }

    /// String-vocabulary variant of [`AccessControl::revoke`] for transports.
    pub fn revoke_named(
        &self,
        resource: &str,
        username: &str,
        access: &str,
        guarantor: &str,
    ) -> AccessResult<()> {
        let resource = parse_resource(resource)?;
        let access = parse_access_level(access)?;
        self.revoke(resource, username, access, guarantor)
    }

    /// Runs an arbitrary operation behind the permission guard.
    pub fn checked_run<T, F>(
        &self,
        identity: &Identity,
        resource: Resource,
        access: AccessLevel,
        operation: F,
    ) -> AccessResult<ActionOutcome<T>>
    where
        F: FnOnce() -> AccessResult<ActionOutcome<T>>,
    {
        self.guard().enforce(identity, resource, access, operation)
    }

    /// Access levels the identity holds on one resource, in stable order.
    pub fn permissions_of(
        &self,
        username: &str,
        resource: Resource,
    ) -> AccessResult<Vec<AccessLevel>> {
        self.matrix.all_of(username, resource)
    }

    /// Replaces the identity's credential after verifying the current one.
    pub fn change_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> AccessResult<()> {
        self.credentials
            .change_password(username, current_password, new_password)
    }

    /// Guarded list of one resource kind.
    pub fn resource_list(
        &self,
        actor: &Identity,
        kind: Resource,
    ) -> AccessResult<ActionOutcome<Vec<ResourceEntry>>> {
        self.resources().list(actor, kind)
    }

    /// Guarded detail lookup of one entry.
    pub fn resource_detail(
        &self,
        actor: &Identity,
        kind: Resource,
        id: ResourceId,
    ) -> AccessResult<ActionOutcome<ResourceEntry>> {
        self.resources().detail(actor, kind, id)
    }

    /// Guarded creation of one entry.
    pub fn resource_create(
        &self,
        actor: &Identity,
        kind: Resource,
        title: &str,
        content: &str,
    ) -> AccessResult<ActionOutcome<ResourceId>> {
        self.resources().create(actor, kind, title, content)
    }

    /// Guarded edit of one entry.
    pub fn resource_edit(
        &self,
        actor: &Identity,
        kind: Resource,
        id: ResourceId,
        title: &str,
        content: &str,
    ) -> AccessResult<ActionOutcome<bool>> {
        self.resources().edit(actor, kind, id, title, content)
    }

    /// Guarded deletion of one entry.
    pub fn resource_delete(
        &self,
        actor: &Identity,
        kind: Resource,
        id: ResourceId,
    ) -> AccessResult<ActionOutcome<bool>> {
        self.resources().delete(actor, kind, id)
    }

    /// Full audit trail in append order.
    pub fn audit_records(&self) -> AccessResult<Vec<AuditRecord>> {
        Ok(self.trail.records()?)
    }

    /// Audit records attributed to one identity, in append order.
    pub fn audit_records_for(&self, username: &str) -> AccessResult<Vec<AuditRecord>> {
        Ok(self.trail.records_for(username)?)
    }
}
