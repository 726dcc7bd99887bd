use notekeeper_core::db::open_db_in_memory;
use notekeeper_core::{AccessControl, AccessError, RepoError, Resource, ResourceId};
use uuid::Uuid;

const PASSWORD: &str = "sup3r-secret!";

#[test]
fn admin_walks_through_note_crud_with_audited_outcomes() {
    let conn = open_db_in_memory().unwrap();
    let core = AccessControl::with_defaults(&conn);
    let root = core.register("root", PASSWORD, true).unwrap();

    let created = core
        .resource_create(&root, Resource::Note, "groceries", "milk, eggs")
        .unwrap();
    assert_eq!(created.detail, "Note created with title \"groceries\"");
    let note_id = created.value;

    let listed = core.resource_list(&root, Resource::Note).unwrap();
    assert_eq!(listed.value.len(), 1);
    assert_eq!(listed.detail, "Note list retrieved");

    let detail = core.resource_detail(&root, Resource::Note, note_id).unwrap();
    assert_eq!(detail.value.title, "groceries");
    assert_eq!(detail.value.content, "milk, eggs");

    let edited = core
        .resource_edit(&root, Resource::Note, note_id, "groceries", "milk only")
        .unwrap();
    assert!(edited.value);
    assert_eq!(
        core.resource_detail(&root, Resource::Note, note_id)
            .unwrap()
            .value
            .content,
        "milk only"
    );

    let deleted = core.resource_delete(&root, Resource::Note, note_id).unwrap();
    assert!(deleted.value);
    assert!(core
        .resource_list(&root, Resource::Note)
        .unwrap()
        .value
        .is_empty());

    // One success record per entry-point call, all attributed to root.
    let actions: Vec<String> = core
        .audit_records_for("root")
        .unwrap()
        .into_iter()
        .filter(|record| record.action.ends_with("_note"))
        .map(|record| record.action)
        .collect();
    assert_eq!(
        actions,
        vec![
            "add_note",
            "view_note",
            "view_note",
            "change_note",
            "view_note",
            "delete_note"
        ]
    );
}

#[test]
fn notes_and_tasks_are_isolated_by_kind() {
    let conn = open_db_in_memory().unwrap();
    let core = AccessControl::with_defaults(&conn);
    let root = core.register("root", PASSWORD, true).unwrap();

    let note_id = core
        .resource_create(&root, Resource::Note, "a note", "")
        .unwrap()
        .value;
    core.resource_create(&root, Resource::Task, "a task", "")
        .unwrap();

    assert_eq!(core.resource_list(&root, Resource::Task).unwrap().value.len(), 1);
    // A note id does not resolve through the task entry point.
    let err = core
        .resource_detail(&root, Resource::Task, note_id)
        .unwrap_err();
    assert!(matches!(
        err,
        AccessError::Repo(RepoError::ResourceNotFound(_))
    ));
}

#[test]
fn detail_of_missing_entry_is_an_audited_failure() {
    let conn = open_db_in_memory().unwrap();
    let core = AccessControl::with_defaults(&conn);
    let root = core.register("root", PASSWORD, true).unwrap();

    let missing: ResourceId = Uuid::new_v4();
    let err = core
        .resource_detail(&root, Resource::Task, missing)
        .unwrap_err();
    assert!(matches!(
        err,
        AccessError::Repo(RepoError::ResourceNotFound(id)) if id == missing
    ));

    let last = core.audit_records_for("root").unwrap().pop().unwrap();
    assert_eq!(last.action, "view_task");
    assert!(!last.success);
    assert!(last.detail.contains("resource not found"));
}

#[test]
fn edit_and_delete_of_missing_entries_are_successful_no_ops() {
    let conn = open_db_in_memory().unwrap();
    let core = AccessControl::with_defaults(&conn);
    let root = core.register("root", PASSWORD, true).unwrap();

    let missing: ResourceId = Uuid::new_v4();
    let edited = core
        .resource_edit(&root, Resource::Note, missing, "x", "y")
        .unwrap();
    assert!(!edited.value);
    assert!(edited.detail.contains("nothing edited"));

    let deleted = core.resource_delete(&root, Resource::Note, missing).unwrap();
    assert!(!deleted.value);
    assert!(deleted.detail.contains("nothing deleted"));
}
