use notekeeper_core::db::open_db_in_memory;
use notekeeper_core::{
    AccessError, AccessLevel, ActionOutcome, AuditTrail, Identity, IdentityRepository,
    PermissionGuard, PermissionMatrix, RepoError, Resource, Role, SqliteAuditRepository,
    SqliteGrantRepository, SqliteIdentityRepository,
};
use rusqlite::Connection;

fn seed_identity(conn: &Connection, username: &str) -> Identity {
    let repo = SqliteIdentityRepository::new(conn);
    repo.insert(&Identity {
        username: username.to_string(),
        password_hash: None,
        role: Role::User,
        is_active: true,
        created_at: 0,
    })
    .unwrap();
    repo.get(username).unwrap().unwrap()
}

struct Fixture<'conn> {
    matrix: PermissionMatrix<SqliteGrantRepository<'conn>, SqliteIdentityRepository<'conn>>,
    trail: AuditTrail<SqliteAuditRepository<'conn>>,
}

impl<'conn> Fixture<'conn> {
    fn new(conn: &'conn Connection) -> Self {
        Self {
            matrix: PermissionMatrix::new(
                SqliteGrantRepository::new(conn),
                SqliteIdentityRepository::new(conn),
            ),
            trail: AuditTrail::new(SqliteAuditRepository::new(conn)),
        }
    }

    fn guard(
        &self,
    ) -> PermissionGuard<
        '_,
        SqliteGrantRepository<'conn>,
        SqliteIdentityRepository<'conn>,
        SqliteAuditRepository<'conn>,
    > {
        PermissionGuard::new(&self.matrix, &self.trail)
    }
}

#[test]
fn denied_operation_is_never_invoked_and_denial_is_recorded() {
    let conn = open_db_in_memory().unwrap();
    let alice = seed_identity(&conn, "alice");
    let fixture = Fixture::new(&conn);

    let mut calls = 0_u32;
    let err = fixture
        .guard()
        .enforce(&alice, Resource::Note, AccessLevel::Add, || {
            calls += 1;
            Ok(ActionOutcome::new((), "should not happen"))
        })
        .unwrap_err();

    assert_eq!(calls, 0);
    assert!(matches!(
        err,
        AccessError::PermissionDenied {
            resource: Resource::Note,
            access: AccessLevel::Add,
        }
    ));

    let records = fixture.trail.records().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].action, "add_note");
    assert!(!records[0].success);
    assert_eq!(
        records[0].detail,
        "Insufficient permission to perform the operation"
    );
    assert_eq!(records[0].username.as_deref(), Some("alice"));
}

#[test]
fn allowed_operation_runs_once_and_its_detail_is_recorded() {
    let conn = open_db_in_memory().unwrap();
    let alice = seed_identity(&conn, "alice");
    let fixture = Fixture::new(&conn);
    fixture
        .matrix
        .grant("alice", Resource::Task, AccessLevel::View)
        .unwrap();

    let mut calls = 0_u32;
    let outcome = fixture
        .guard()
        .enforce(&alice, Resource::Task, AccessLevel::View, || {
            calls += 1;
            Ok(ActionOutcome::new(42, "Task list retrieved"))
        })
        .unwrap();

    assert_eq!(calls, 1);
    assert_eq!(outcome.value, 42);

    let records = fixture.trail.records().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].action, "view_task");
    assert!(records[0].success);
    assert_eq!(records[0].detail, "Task list retrieved");
}

#[test]
fn failing_operation_is_recorded_and_error_surfaces_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let alice = seed_identity(&conn, "alice");
    let fixture = Fixture::new(&conn);
    fixture
        .matrix
        .grant("alice", Resource::Note, AccessLevel::Change)
        .unwrap();

    let err = fixture
        .guard()
        .enforce::<(), _>(&alice, Resource::Note, AccessLevel::Change, || {
            Err(AccessError::Repo(RepoError::InvalidData(
                "storage exploded".to_string(),
            )))
        })
        .unwrap_err();

    assert!(matches!(err, AccessError::Repo(RepoError::InvalidData(_))));

    let records = fixture.trail.records().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].action, "change_note");
    assert!(!records[0].success);
    assert!(records[0].detail.contains("storage exploded"));
}
