//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose task list/add/edit/delete and filtering to Dart via FRB.
//! - Translate core outcomes into plain response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Storage-backed functions are not `sync`: FRB runs them off the UI
//!   thread and completes a Dart `Future`.
//! - Every call opens its own connection; the store serializes writers.

use log::warn;
use std::path::PathBuf;
use std::sync::OnceLock;
use taskmate_core::db::open_db;
use taskmate_core::{
    apply_filters, core_version as core_version_inner, init_logging as init_logging_inner,
    ping as ping_inner, EditTaskForm, FormOutcome, NewTaskForm, Notice, SqliteKeyValueRepository,
    StatusFilter, Task, TaskStatus, TaskStore,
};

const DB_FILE_NAME: &str = "taskmate.sqlite3";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Exposes core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// Returns an empty string on success and the error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Sets the SQLite file used for task storage.
///
/// Must be called before the first storage call to take effect; later calls
/// with the same path are accepted, other paths are rejected. Returns an
/// empty string on success and the error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_storage(db_path: String) -> String {
    let trimmed = db_path.trim();
    if trimmed.is_empty() {
        return "db_path cannot be empty".to_string();
    }
    let requested = PathBuf::from(trimmed);
    let active = DB_PATH.get_or_init(|| requested.clone());
    if *active == requested {
        String::new()
    } else {
        format!(
            "storage already configured at `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        )
    }
}

/// Task row as seen by Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: String,
    pub title: String,
    pub description: String,
    /// `pending|completed`; unset status is reported as `pending`.
    pub status: String,
}

/// Response envelope for storage-backed task calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Full collection after the operation; empty on failure.
    pub items: Vec<TaskItem>,
    /// Dialog title to show, empty when nothing should be shown.
    pub notice_title: String,
    /// Dialog message to show, empty when nothing should be shown.
    pub message: String,
}

impl TaskListResponse {
    fn loaded(tasks: &[Task]) -> Self {
        Self {
            ok: true,
            items: to_items(tasks),
            notice_title: String::new(),
            message: String::new(),
        }
    }

    fn from_notice(ok: bool, tasks: &[Task], notice: Notice) -> Self {
        Self {
            ok,
            items: to_items(tasks),
            notice_title: notice.title.to_string(),
            message: notice.message.to_string(),
        }
    }
}

/// Loads the full task collection for the listing screen.
pub fn list_tasks() -> TaskListResponse {
    let outcome = with_task_store(|store| match store.list_tasks() {
        Ok(tasks) => TaskListResponse::loaded(&tasks),
        Err(err) => {
            warn!(
                "event=ffi_list_tasks module=ffi status=error error_kind={:?}",
                err.kind()
            );
            TaskListResponse::from_notice(false, &[], Notice::LOAD_FAILED)
        }
    });
    outcome.unwrap_or_else(|| TaskListResponse::from_notice(false, &[], Notice::LOAD_FAILED))
}

/// Creates a task from the add screen.
pub fn create_task(title: String, description: String) -> TaskListResponse {
    let form = NewTaskForm::new(title, description);
    with_task_store(|store| form_response(form.submit(store)))
        .unwrap_or_else(|| TaskListResponse::from_notice(false, &[], Notice::CREATE_FAILED))
}

/// Saves the edit screen for the task with `id`.
///
/// Fields of the stored task not edited here (including unknown ones) are
/// preserved.
pub fn update_task(
    id: String,
    title: String,
    description: String,
    completed: bool,
) -> TaskListResponse {
    let outcome = with_task_store(|store| {
        let existing = match store.get_task(&id) {
            Ok(Some(task)) => task,
            // Unknown ids still go through the store, which leaves the
            // collection unchanged.
            Ok(None) => Task::new(id.clone(), String::new(), String::new()),
            Err(err) => {
                warn!(
                    "event=ffi_update_task module=ffi status=error error_kind={:?}",
                    err.kind()
                );
                return TaskListResponse::from_notice(false, &[], Notice::UPDATE_FAILED);
            }
        };
        let mut form = EditTaskForm::from_task(existing);
        form.title = title;
        form.description = description;
        form.set_completed(completed);
        form_response(form.submit(store))
    });
    outcome.unwrap_or_else(|| TaskListResponse::from_notice(false, &[], Notice::UPDATE_FAILED))
}

/// Deletes a task after the user confirmed the dialog on the Dart side.
pub fn delete_task(id: String) -> TaskListResponse {
    let outcome = with_task_store(|store| match store.delete_task(&id) {
        Ok(tasks) => TaskListResponse::from_notice(true, &tasks, Notice::DELETED),
        Err(err) => {
            warn!(
                "event=ffi_delete_task module=ffi status=error error_kind={:?}",
                err.kind()
            );
            TaskListResponse::from_notice(false, &[], Notice::DELETE_FAILED)
        }
    });
    outcome.unwrap_or_else(|| TaskListResponse::from_notice(false, &[], Notice::DELETE_FAILED))
}

/// Filters rows already held by the listing screen.
///
/// `status_filter` accepts `all|completed|pending`; anything else is `all`.
#[flutter_rust_bridge::frb(sync)]
pub fn filter_tasks(items: Vec<TaskItem>, keyword: String, status_filter: String) -> Vec<TaskItem> {
    let tasks = items.into_iter().map(to_task).collect::<Vec<_>>();
    let filtered = apply_filters(&tasks, &keyword, StatusFilter::from_label(&status_filter));
    to_items(&filtered)
}

fn form_response(outcome: FormOutcome) -> TaskListResponse {
    let notice = outcome.notice();
    match outcome {
        FormOutcome::Saved { tasks, .. } => TaskListResponse::from_notice(true, &tasks, notice),
        FormOutcome::Rejected { .. } => TaskListResponse::from_notice(false, &[], notice),
        FormOutcome::Failed { .. } => TaskListResponse::from_notice(false, &[], notice),
    }
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| std::env::temp_dir().join(DB_FILE_NAME))
        .clone()
}

/// Runs `f` against a store on a fresh connection; `None` when storage
/// cannot be opened.
fn with_task_store<T>(
    f: impl FnOnce(&TaskStore<SqliteKeyValueRepository<'_>>) -> T,
) -> Option<T> {
    let db_path = resolve_db_path();
    let conn = match open_db(&db_path) {
        Ok(conn) => conn,
        Err(err) => {
            warn!("event=ffi_storage_open module=ffi status=error error={err}");
            return None;
        }
    };
    let repo = match SqliteKeyValueRepository::try_new(&conn) {
        Ok(repo) => repo,
        Err(err) => {
            warn!("event=ffi_storage_open module=ffi status=error error={err}");
            return None;
        }
    };
    Some(f(&TaskStore::new(repo)))
}

fn to_items(tasks: &[Task]) -> Vec<TaskItem> {
    tasks
        .iter()
        .map(|task| TaskItem {
            id: task.id.clone(),
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.effective_status().as_str().to_string(),
        })
        .collect()
}

fn to_task(item: TaskItem) -> Task {
    let mut task = Task::new(item.id, item.title, item.description);
    task.status = match item.status.as_str() {
        "completed" => Some(TaskStatus::Completed),
        "pending" => Some(TaskStatus::Pending),
        _ => None,
    };
    task
}
