use notekeeper_core::db::open_db_in_memory;
use notekeeper_core::{
    AccessError, AccessLevel, AuditTrail, CredentialService, PasswordPolicy, PermissionMatrix,
    Resource, Role, SessionService, SqliteAuditRepository, SqliteGrantRepository,
    SqliteIdentityRepository,
};
use rusqlite::Connection;

const PASSWORD: &str = "sup3r-secret!";

struct Fixture<'conn> {
    credentials: CredentialService<SqliteIdentityRepository<'conn>>,
    matrix: PermissionMatrix<SqliteGrantRepository<'conn>, SqliteIdentityRepository<'conn>>,
    trail: AuditTrail<SqliteAuditRepository<'conn>>,
}

impl<'conn> Fixture<'conn> {
    fn new(conn: &'conn Connection) -> Self {
        Self {
            credentials: CredentialService::new(
                SqliteIdentityRepository::new(conn),
                PasswordPolicy::default(),
            ),
            matrix: PermissionMatrix::new(
                SqliteGrantRepository::new(conn),
                SqliteIdentityRepository::new(conn),
            ),
            trail: AuditTrail::new(SqliteAuditRepository::new(conn)),
        }
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
}

#[test]
fn register_grants_defaults_activates_and_records_once() {
    let conn = open_db_in_memory().unwrap();
    let fixture = Fixture::new(&conn);

    let root = fixture.sessions().register("root", PASSWORD, true).unwrap();
    assert_eq!(root.role, Role::Admin);
    assert!(root.is_active);

    let alice = fixture
        .sessions()
        .register("alice", PASSWORD, false)
        .unwrap();
    assert_eq!(alice.role, Role::User);
    assert!(alice.is_active);

    // Default grants: view only for users, everything for admins.
    assert_eq!(
        fixture.matrix.all_of("alice", Resource::Note).unwrap(),
        vec![AccessLevel::View]
    );
    assert_eq!(
        fixture.matrix.all_of("root", Resource::Task).unwrap(),
        vec![
            AccessLevel::View,
            AccessLevel::Add,
            AccessLevel::Change,
            AccessLevel::Delete
        ]
    );

    let records = fixture.trail.records_for("alice").unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].action, "register");
    assert!(records[0].success);
}

#[test]
fn duplicate_registration_is_recorded_against_the_existing_identity() {
    let conn = open_db_in_memory().unwrap();
    let fixture = Fixture::new(&conn);

    fixture.sessions().register("root", PASSWORD, true).unwrap();
    let before = fixture.trail.count().unwrap();

    let err = fixture
        .sessions()
        .register("root", PASSWORD, false)
        .unwrap_err();
    assert!(matches!(err, AccessError::DuplicateIdentity(_)));

    let records = fixture.trail.records_for("root").unwrap();
    assert_eq!(fixture.trail.count().unwrap(), before + 1);
    let last = records.last().unwrap();
    assert_eq!(last.action, "register");
    assert!(!last.success);
}

#[test]
fn weak_password_registration_leaves_no_record() {
    let conn = open_db_in_memory().unwrap();
    let fixture = Fixture::new(&conn);

    let err = fixture.sessions().register("root", "weak", true).unwrap_err();
    assert!(matches!(err, AccessError::WeakPassword(_)));
    // Nothing to attribute the failure to: the identity was never created.
    assert_eq!(fixture.trail.count().unwrap(), 0);
}

#[test]
fn login_with_correct_password_activates_and_records_success() {
    let conn = open_db_in_memory().unwrap();
    let fixture = Fixture::new(&conn);

    fixture.sessions().register("root", PASSWORD, true).unwrap();
    fixture.sessions().logout("root").unwrap();
    let before = fixture.trail.count().unwrap();

    let root = fixture.sessions().login("root", PASSWORD).unwrap();
    assert!(root.is_active);

    assert_eq!(fixture.trail.count().unwrap(), before + 1);
    let records = fixture.trail.records_for("root").unwrap();
    let last = records.last().unwrap();
    assert_eq!(last.action, "login");
    assert!(last.success);
    assert_eq!(last.detail, "Logged in - true");
}

#[test]
fn login_with_wrong_password_records_failure_and_does_not_activate() {
    let conn = open_db_in_memory().unwrap();
    let fixture = Fixture::new(&conn);

    fixture.sessions().register("root", PASSWORD, true).unwrap();
    fixture.sessions().logout("root").unwrap();
    let before = fixture.trail.count().unwrap();

    let err = fixture
        .sessions()
        .login("root", "wrong-pass1!")
        .unwrap_err();
    assert!(matches!(err, AccessError::InvalidCredentials));

    // The active flag matches the recorded boolean outcome.
    assert!(!fixture.credentials.require("root").unwrap().is_active);
    assert_eq!(fixture.trail.count().unwrap(), before + 1);
    let records = fixture.trail.records_for("root").unwrap();
    let last = records.last().unwrap();
    assert_eq!(last.action, "login");
    assert!(!last.success);
    assert_eq!(last.detail, "Logged in - false");
}

#[test]
fn login_with_unknown_username_surfaces_invalid_credentials_without_a_record() {
    let conn = open_db_in_memory().unwrap();
    let fixture = Fixture::new(&conn);

    let err = fixture.sessions().login("ghost", PASSWORD).unwrap_err();
    assert!(matches!(err, AccessError::InvalidCredentials));
    assert_eq!(fixture.trail.count().unwrap(), 0);
}

#[test]
fn logout_records_success_and_repeat_logout_fails_audited() {
    let conn = open_db_in_memory().unwrap();
    let fixture = Fixture::new(&conn);

    fixture.sessions().register("root", PASSWORD, true).unwrap();
    fixture.sessions().logout("root").unwrap();

    let records = fixture.trail.records_for("root").unwrap();
    let last = records.last().unwrap();
    assert_eq!(last.action, "logout");
    assert!(last.success);
    assert_eq!(last.detail, "Logged out - true");

    let err = fixture.sessions().logout("root").unwrap_err();
    assert!(matches!(err, AccessError::AlreadyLoggedOut(_)));
    let records = fixture.trail.records_for("root").unwrap();
    let last = records.last().unwrap();
    assert_eq!(last.action, "logout");
    assert!(!last.success);
}
