//! Identity domain model.
//!
//! # Responsibility
//! - Define the authenticated identity record and its role vocabulary.
//!
//! # Invariants
//! - `username` is the stable key and never changes after creation.
//! - `password_hash` is `None` only for identities that have never stored a
//!   credential (first-time activation path).
//! - The very first identity persisted in a store holds `Role::Admin` and is
//!   active from creation; this is applied once by the credential service.

use serde::{Deserialize, Serialize};

/// Role held by an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full administrative rights, including default write grants.
    Admin,
    /// Regular identity with view-only default grants.
    User,
}

impl Role {
    /// Stable string id used in storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Parses one role from its stored string value.
pub fn parse_role(value: &str) -> Option<Role> {
    match value {
        "admin" => Some(Role::Admin),
        "user" => Some(Role::User),
        _ => None,
    }
}

/// Canonical record for an authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Unique immutable username.
    pub username: String,
    /// Salted one-way digest; `None` until a credential is first stored.
    pub password_hash: Option<String>,
    /// Current role.
    pub role: Role,
    /// Session flag toggled by login/logout.
    pub is_active: bool,
    /// Creation time in Unix epoch milliseconds.
    pub created_at: i64,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_role, Role};

    #[test]
    fn role_round_trips_through_storage_string() {
        assert_eq!(parse_role(Role::Admin.as_str()), Some(Role::Admin));
        assert_eq!(parse_role(Role::User.as_str()), Some(Role::User));
        assert_eq!(parse_role("superuser"), None);
    }
}
