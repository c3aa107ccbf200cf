//! Task store: whole-collection persistence of tasks under one storage key.
//!
//! # Responsibility
//! - Read the `tasks` collection as one JSON array.
//! - Apply create/update/delete as read-modify-write of the whole array.
//!
//! # Invariants
//! - Each mutation runs inside one `KeyValueRepository::exclusive` scope, so
//!   concurrent writers serialize and nothing is lost.
//! - A failed mutation leaves the stored collection untouched.
//! - Corrupt content fails the whole read; nothing is partially recovered.
//! - Logs carry metadata only (counts, durations), never task text.

use crate::model::task::{NewTask, Task, TaskValidationError};
use crate::repo::kv_repo::{KeyValueRepository, RepoError};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Storage key holding the serialized task collection.
pub const TASKS_KEY: &str = "tasks";

pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// Coarse error class used by screens to pick a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskErrorKind {
    StorageRead,
    StorageWrite,
    Validation,
}

/// Task store failure.
#[derive(Debug)]
pub enum TaskStoreError {
    /// Input rejected before any storage call.
    Validation(TaskValidationError),
    /// Storage could not be read.
    StorageRead(RepoError),
    /// Stored content is not a valid task collection.
    CorruptCollection(serde_json::Error),
    /// Storage could not be written, or the write transaction failed.
    StorageWrite(RepoError),
    /// Collection could not be serialized for writing.
    Encode(serde_json::Error),
}

impl TaskStoreError {
    pub fn kind(&self) -> TaskErrorKind {
        match self {
            Self::Validation(_) => TaskErrorKind::Validation,
            Self::StorageRead(_) | Self::CorruptCollection(_) => TaskErrorKind::StorageRead,
            Self::StorageWrite(_) | Self::Encode(_) => TaskErrorKind::StorageWrite,
        }
    }
}

impl Display for TaskStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::StorageRead(err) => write!(f, "failed to read tasks: {err}"),
            Self::CorruptCollection(err) => write!(f, "stored tasks are corrupt: {err}"),
            Self::StorageWrite(err) => write!(f, "failed to write tasks: {err}"),
            Self::Encode(err) => write!(f, "failed to encode tasks: {err}"),
        }
    }
}

impl Error for TaskStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::StorageRead(err) | Self::StorageWrite(err) => Some(err),
            Self::CorruptCollection(err) | Self::Encode(err) => Some(err),
        }
    }
}

impl From<TaskValidationError> for TaskStoreError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Transaction control only happens on mutation paths.
impl From<RepoError> for TaskStoreError {
    fn from(value: RepoError) -> Self {
        Self::StorageWrite(value)
    }
}

/// Whole-collection task persistence over a key-value repository.
pub struct TaskStore<R: KeyValueRepository> {
    repo: R,
}

impl<R: KeyValueRepository> TaskStore<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns the stored collection in insertion order.
    ///
    /// A key that was never written reads as an empty collection.
    pub fn list_tasks(&self) -> TaskStoreResult<Vec<Task>> {
        let started_at = Instant::now();
        let result = read_collection(&self.repo);
        log_outcome("task_list", started_at, &result);
        result
    }

    /// Looks up one task by id.
    pub fn get_task(&self, id: &str) -> TaskStoreResult<Option<Task>> {
        Ok(self.list_tasks()?.into_iter().find(|task| task.id == id))
    }

    /// Appends a new task with a fresh id and unset status.
    ///
    /// Returns the full collection as persisted.
    pub fn create_task(&self, input: NewTask) -> TaskStoreResult<Vec<Task>> {
        input.validate()?;
        self.mutate("task_create", |tasks| {
            let id = next_task_id(tasks, now_epoch_ms());
            tasks.push(input.into_task(id));
        })
    }

    /// Replaces the task with the same id.
    ///
    /// An unknown id leaves the collection unchanged; it is still rewritten.
    pub fn update_task(&self, task: Task) -> TaskStoreResult<Vec<Task>> {
        task.validate()?;
        self.mutate("task_update", |tasks| {
            for slot in tasks.iter_mut().filter(|slot| slot.id == task.id) {
                *slot = task.clone();
            }
        })
    }

    /// Removes the task with the given id; a missing id is a no-op.
    pub fn delete_task(&self, id: &str) -> TaskStoreResult<Vec<Task>> {
        self.mutate("task_delete", |tasks| tasks.retain(|task| task.id != id))
    }

    fn mutate(
        &self,
        event: &'static str,
        apply: impl FnOnce(&mut Vec<Task>),
    ) -> TaskStoreResult<Vec<Task>> {
        let started_at = Instant::now();
        let result = self.repo.exclusive(|repo| -> TaskStoreResult<Vec<Task>> {
            let mut tasks = read_collection(repo)?;
            apply(&mut tasks);
            let encoded = serde_json::to_string(&tasks).map_err(TaskStoreError::Encode)?;
            repo.set_item(TASKS_KEY, &encoded)
                .map_err(TaskStoreError::StorageWrite)?;
            Ok(tasks)
        });
        log_outcome(event, started_at, &result);
        result
    }
}

fn read_collection<R: KeyValueRepository>(repo: &R) -> TaskStoreResult<Vec<Task>> {
    let raw = repo
        .get_item(TASKS_KEY)
        .map_err(TaskStoreError::StorageRead)?;
    match raw {
        Some(raw) if !raw.is_empty() => {
            serde_json::from_str(&raw).map_err(TaskStoreError::CorruptCollection)
        }
        _ => Ok(Vec::new()),
    }
}

/// Picks an epoch-millisecond id strictly greater than every numeric id in
/// the collection.
///
/// A number larger than every parsed id cannot equal any stored id, so no
/// collision scan is needed. When the numeric space is exhausted the id
/// falls back to a `<now_ms>-<n>` suffix.
fn next_task_id(tasks: &[Task], now_ms: u64) -> String {
    let largest = tasks
        .iter()
        .filter_map(|task| task.id.parse::<u64>().ok())
        .max();
    match largest.map(|largest| largest.checked_add(1)) {
        None => now_ms.to_string(),
        Some(Some(floor)) => now_ms.max(floor).to_string(),
        Some(None) => suffixed_task_id(tasks, now_ms),
    }
}

/// Finds a free `<now_ms>-<n>` id; terminates within `tasks.len() + 1` tries.
fn suffixed_task_id(tasks: &[Task], now_ms: u64) -> String {
    let mut suffix: usize = 1;
    loop {
        let candidate = format!("{now_ms}-{suffix}");
        if tasks.iter().all(|task| task.id != candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
        })
}

fn log_outcome(event: &str, started_at: Instant, result: &TaskStoreResult<Vec<Task>>) {
    match result {
        Ok(tasks) => info!(
            "event={event} module=task_store status=ok duration_ms={} count={}",
            started_at.elapsed().as_millis(),
            tasks.len()
        ),
        Err(TaskStoreError::Validation(err)) => info!(
            "event={event} module=task_store status=rejected duration_ms={} reason={:?}",
            started_at.elapsed().as_millis(),
            err
        ),
        Err(err) => error!(
            "event={event} module=task_store status=error duration_ms={} error_kind={:?} error={}",
            started_at.elapsed().as_millis(),
            err.kind(),
            err
        ),
    }
}
