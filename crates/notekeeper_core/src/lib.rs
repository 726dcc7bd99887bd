//! Access control and audit core for notekeeper.
//! This crate is the single source of truth for authorization invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::access::{
    parse_access_level, parse_resource, AccessLevel, AccessParseError, Grant, GrantSet, Resource,
};
pub use model::audit::{AuditRecord, NewAuditRecord};
pub use model::identity::{Identity, Role};
pub use model::resource_entry::{ResourceEntry, ResourceId};
pub use repo::audit_repo::{AuditRepository, SqliteAuditRepository};
pub use repo::grant_repo::{GrantRepository, SqliteGrantRepository};
pub use repo::identity_repo::{IdentityRepository, SqliteIdentityRepository};
pub use repo::resource_repo::{ResourceRepository, SqliteResourceRepository};
pub use repo::{RepoError, RepoResult};
pub use service::access_control::AccessControl;
pub use service::audit_trail::AuditTrail;
pub use service::credential_service::{CredentialService, PasswordPolicy};
pub use service::grant_audit_service::GrantAuditService;
pub use service::permission_guard::{ActionOutcome, PermissionGuard};
pub use service::permission_matrix::{GrantDiff, PermissionMatrix};
pub use service::resource_service::ResourceService;
pub use service::session_service::SessionService;
pub use service::{AccessError, AccessResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
