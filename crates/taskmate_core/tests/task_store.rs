use rusqlite::Connection;
use serde_json::json;
use std::collections::HashSet;
use taskmate_core::db::{open_db, open_db_in_memory};
use taskmate_core::{
    KeyValueRepository, NewTask, SqliteKeyValueRepository, Task, TaskErrorKind, TaskStatus,
    TaskStore, TaskStoreError, TaskValidationError, TASKS_KEY,
};

fn store(conn: &Connection) -> TaskStore<SqliteKeyValueRepository<'_>> {
    TaskStore::new(SqliteKeyValueRepository::try_new(conn).unwrap())
}

fn raw_tasks(conn: &Connection) -> Option<String> {
    SqliteKeyValueRepository::try_new(conn)
        .unwrap()
        .get_item(TASKS_KEY)
        .unwrap()
}

#[test]
fn empty_store_lists_no_tasks() {
    let conn = open_db_in_memory().unwrap();
    assert!(store(&conn).list_tasks().unwrap().is_empty());
}

#[test]
fn create_on_empty_store_then_list_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let store = store(&conn);

    let created = store.create_task(NewTask::new("A", "B")).unwrap();
    assert_eq!(created.len(), 1);

    let listed = store.list_tasks().unwrap();
    assert_eq!(listed, created);
    assert_eq!(listed[0].title, "A");
    assert_eq!(listed[0].description, "B");
    assert_eq!(listed[0].status, None);
    assert_eq!(listed[0].effective_status(), TaskStatus::Pending);
}

#[test]
fn create_grows_by_one_with_fresh_increasing_ids() {
    let conn = open_db_in_memory().unwrap();
    let store = store(&conn);

    let mut previous_len = 0;
    for n in 0..25 {
        let before: HashSet<String> = store
            .list_tasks()
            .unwrap()
            .into_iter()
            .map(|task| task.id)
            .collect();
        let after = store
            .create_task(NewTask::new(format!("task {n}"), "body"))
            .unwrap();
        assert_eq!(after.len(), previous_len + 1);
        let new_id = &after.last().unwrap().id;
        assert!(!before.contains(new_id));
        previous_len = after.len();
    }

    let ids: Vec<u64> = store
        .list_tasks()
        .unwrap()
        .iter()
        .map(|task| task.id.parse().unwrap())
        .collect();
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn create_preserves_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let store = store(&conn);

    store.create_task(NewTask::new("first", "1")).unwrap();
    store.create_task(NewTask::new("second", "2")).unwrap();
    store.create_task(NewTask::new("third", "3")).unwrap();

    let titles: Vec<_> = store
        .list_tasks()
        .unwrap()
        .into_iter()
        .map(|task| task.title)
        .collect();
    assert_eq!(titles, vec!["first", "second", "third"]);
}

#[test]
fn update_replaces_exactly_one_entry() {
    let conn = open_db_in_memory().unwrap();
    let store = store(&conn);
    store.create_task(NewTask::new("keep", "k")).unwrap();
    let tasks = store.create_task(NewTask::new("old", "o")).unwrap();

    let mut edited = tasks[1].clone();
    edited.title = "new".to_string();
    edited.description = String::new();
    edited.status = Some(TaskStatus::Completed);

    let updated = store.update_task(edited.clone()).unwrap();
    assert_eq!(updated.len(), 2);
    assert_eq!(updated[0], tasks[0]);
    assert_eq!(updated[1], edited);
    assert_eq!(store.get_task(&edited.id).unwrap(), Some(edited));
}

#[test]
fn update_with_unknown_id_leaves_collection_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let store = store(&conn);
    let tasks = store.create_task(NewTask::new("only", "one")).unwrap();

    let stranger = Task::new("does-not-exist", "ghost", "");
    let result = store.update_task(stranger).unwrap();
    assert_eq!(result, tasks);
    assert_eq!(store.list_tasks().unwrap(), tasks);
}

#[test]
fn delete_missing_id_is_a_no_op_and_delete_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let store = store(&conn);
    store.create_task(NewTask::new("a", "1")).unwrap();
    let tasks = store.create_task(NewTask::new("b", "2")).unwrap();

    assert_eq!(store.delete_task("missing").unwrap(), tasks);

    let target = tasks[0].id.clone();
    let first = store.delete_task(&target).unwrap();
    let second = store.delete_task(&target).unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first, second);
    assert_eq!(store.get_task(&target).unwrap(), None);
}

#[test]
fn persisted_layout_is_a_json_array_without_unset_status() {
    let conn = open_db_in_memory().unwrap();
    let store = store(&conn);
    let tasks = store.create_task(NewTask::new("A", "B")).unwrap();

    let raw: serde_json::Value = serde_json::from_str(&raw_tasks(&conn).unwrap()).unwrap();
    assert_eq!(
        raw,
        json!([{ "id": tasks[0].id, "title": "A", "description": "B" }])
    );
}

#[test]
fn reads_legacy_records_and_passes_unknown_fields_through() {
    let conn = open_db_in_memory().unwrap();
    SqliteKeyValueRepository::try_new(&conn)
        .unwrap()
        .set_item(
            TASKS_KEY,
            r#"[{"id":"1","title":"X","description":"","status":"pending","color":"red"},
                {"id":"2","title":"Y","description":"","status":"completed"}]"#,
        )
        .unwrap();
    let store = store(&conn);

    let mut first = store.get_task("1").unwrap().unwrap();
    assert_eq!(first.extra["color"], json!("red"));

    first.title = "X2".to_string();
    store.update_task(first).unwrap();

    let raw: serde_json::Value = serde_json::from_str(&raw_tasks(&conn).unwrap()).unwrap();
    assert_eq!(raw[0]["color"], json!("red"));
    assert_eq!(raw[0]["title"], json!("X2"));
    assert_eq!(raw[1]["status"], json!("completed"));
}

#[test]
fn corrupt_collection_fails_the_whole_read() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteKeyValueRepository::try_new(&conn).unwrap();
    repo.set_item(TASKS_KEY, r#"[{"id":"1","title":"ok","description":""}, {"id":2}]"#)
        .unwrap();
    let store = store(&conn);

    let err = store.list_tasks().unwrap_err();
    assert!(matches!(err, TaskStoreError::CorruptCollection(_)));
    assert_eq!(err.kind(), TaskErrorKind::StorageRead);

    let err = store.create_task(NewTask::new("a", "b")).unwrap_err();
    assert_eq!(err.kind(), TaskErrorKind::StorageRead);
}

#[test]
fn unknown_status_value_is_corrupt() {
    let conn = open_db_in_memory().unwrap();
    SqliteKeyValueRepository::try_new(&conn)
        .unwrap()
        .set_item(
            TASKS_KEY,
            r#"[{"id":"1","title":"t","description":"","status":"archived"}]"#,
        )
        .unwrap();

    let err = store(&conn).list_tasks().unwrap_err();
    assert_eq!(err.kind(), TaskErrorKind::StorageRead);
}

#[test]
fn failed_write_leaves_previous_state_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let store = store(&conn);
    let tasks = store.create_task(NewTask::new("kept", "safe")).unwrap();
    let before = raw_tasks(&conn);

    conn.execute_batch("PRAGMA query_only = ON;").unwrap();

    let err = store.create_task(NewTask::new("lost", "x")).unwrap_err();
    assert_eq!(err.kind(), TaskErrorKind::StorageWrite);
    let err = store.delete_task(&tasks[0].id).unwrap_err();
    assert_eq!(err.kind(), TaskErrorKind::StorageWrite);

    conn.execute_batch("PRAGMA query_only = OFF;").unwrap();
    assert_eq!(raw_tasks(&conn), before);
    assert_eq!(store.list_tasks().unwrap(), tasks);
}

#[test]
fn validation_rejects_before_touching_storage() {
    let conn = open_db_in_memory().unwrap();
    let store = store(&conn);

    let err = store.create_task(NewTask::new(" ", "body")).unwrap_err();
    assert!(matches!(
        err,
        TaskStoreError::Validation(TaskValidationError::EmptyTitle)
    ));
    let err = store.create_task(NewTask::new("title", "")).unwrap_err();
    assert!(matches!(
        err,
        TaskStoreError::Validation(TaskValidationError::EmptyDescription)
    ));
    let err = store.update_task(Task::new("1", "", "")).unwrap_err();
    assert_eq!(err.kind(), TaskErrorKind::Validation);

    assert_eq!(raw_tasks(&conn), None);
}

#[test]
fn concurrent_writers_on_separate_connections_lose_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shared.db");
    open_db(&path).unwrap();

    let writers: Vec<_> = (0..4)
        .map(|writer| {
            let path = path.clone();
            std::thread::spawn(move || {
                let conn = open_db(&path).unwrap();
                let store = store(&conn);
                for n in 0..10 {
                    store
                        .create_task(NewTask::new(format!("w{writer}-{n}"), "body"))
                        .unwrap();
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    let conn = open_db(&path).unwrap();
    let tasks = store(&conn).list_tasks().unwrap();
    assert_eq!(tasks.len(), 40);
    let ids: HashSet<_> = tasks.iter().map(|task| task.id.as_str()).collect();
    assert_eq!(ids.len(), 40);
}

#[test]
fn create_after_largest_possible_numeric_id_still_grows_by_one() {
    let conn = open_db_in_memory().unwrap();
    SqliteKeyValueRepository::try_new(&conn)
        .unwrap()
        .set_item(
            TASKS_KEY,
            r#"[{"id":"18446744073709551615","title":"max","description":""}]"#,
        )
        .unwrap();
    let store = store(&conn);

    let first = store.create_task(NewTask::new("a", "1")).unwrap();
    let second = store.create_task(NewTask::new("b", "2")).unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 3);
    let ids: HashSet<_> = second.iter().map(|task| task.id.as_str()).collect();
    assert_eq!(ids.len(), 3);
}
