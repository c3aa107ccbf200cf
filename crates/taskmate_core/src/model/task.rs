//! Task record and creation input.
//!
//! # Invariants
//! - `id` is assigned once at creation and never rewritten.
//! - `title` is never blank for records written through core.
//! - A missing `status` means pending and is not serialized.
//! - Unknown JSON fields are kept in `extra` and written back unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier of a task inside the stored collection.
///
/// Kept as a string because ids written by earlier app versions are opaque.
pub type TaskId = String;

/// Completion state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Completed,
}

impl TaskStatus {
    /// Wire label used in storage and across FFI.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

/// Field-level validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyId,
    EmptyTitle,
    EmptyDescription,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "task id must not be empty"),
            Self::EmptyTitle => write!(f, "task title must not be blank"),
            Self::EmptyDescription => write!(f, "task description must not be blank"),
        }
    }
}

impl Error for TaskValidationError {}

/// One to-do item as stored in the `tasks` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    /// Fields this version does not know about, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    /// Builds a task with unset status and no pass-through fields.
    pub fn new(
        id: impl Into<TaskId>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            status: None,
            extra: Map::new(),
        }
    }

    /// Status as shown to the user; unset reads as pending.
    pub fn effective_status(&self) -> TaskStatus {
        self.status.unwrap_or(TaskStatus::Pending)
    }

    pub fn is_completed(&self) -> bool {
        self.effective_status() == TaskStatus::Completed
    }

    /// Checks the invariants required before an update is persisted.
    ///
    /// Description may be blank on edit.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.is_empty() {
            return Err(TaskValidationError::EmptyId);
        }
        if is_blank(&self.title) {
            return Err(TaskValidationError::EmptyTitle);
        }
        Ok(())
    }
}

/// Creation input for a task; id and status are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
}

impl NewTask {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    /// Both title and description are required at creation.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if is_blank(&self.title) {
            return Err(TaskValidationError::EmptyTitle);
        }
        if is_blank(&self.description) {
            return Err(TaskValidationError::EmptyDescription);
        }
        Ok(())
    }

    /// Materializes the input into a task with the given id.
    pub fn into_task(self, id: impl Into<TaskId>) -> Task {
        Task::new(id, self.title, self.description)
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
