//! Core domain logic for the Taskmate mobile app.
//! This crate is the single source of truth for task invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{NewTask, Task, TaskId, TaskStatus, TaskValidationError};
pub use repo::kv_repo::{KeyValueRepository, RepoError, RepoResult, SqliteKeyValueRepository};
pub use service::notice::{Notice, NoticeKind};
pub use service::task_form::{EditTaskForm, FormOutcome, NewTaskForm};
pub use service::task_list::{apply_filters, FilterComposition, StatusFilter, TaskListViewModel};
pub use service::task_store::{
    TaskErrorKind, TaskStore, TaskStoreError, TaskStoreResult, TASKS_KEY,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
