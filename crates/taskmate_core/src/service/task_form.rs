//! Add/edit task screen contract.
//!
//! # Responsibility
//! - Validate required fields before any store call.
//! - Invoke the store and map every outcome to a fixed notice.
//!
//! # Invariants
//! - Add requires non-blank title and description.
//! - Edit requires a non-blank title; description may be blank.
//! - Edit never changes the task id or pass-through fields.

use crate::model::task::{NewTask, Task, TaskStatus, TaskValidationError};
use crate::repo::kv_repo::KeyValueRepository;
use crate::service::notice::Notice;
use crate::service::task_store::{TaskStore, TaskStoreError};

/// Result of submitting a task form.
#[derive(Debug)]
pub enum FormOutcome {
    /// Store accepted the change; the screen should close.
    Saved { tasks: Vec<Task>, notice: Notice },
    /// Input rejected locally; the store was not called.
    Rejected {
        error: TaskValidationError,
        notice: Notice,
    },
    /// Store call failed; the screen stays open.
    Failed {
        error: TaskStoreError,
        notice: Notice,
    },
}

impl FormOutcome {
    pub fn notice(&self) -> Notice {
        match self {
            Self::Saved { notice, .. } | Self::Rejected { notice, .. } | Self::Failed { notice, .. } => {
                *notice
            }
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }
}

/// Add-task screen input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTaskForm {
    pub title: String,
    pub description: String,
}

impl NewTaskForm {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn submit<R: KeyValueRepository>(&self, store: &TaskStore<R>) -> FormOutcome {
        let input = NewTask::new(self.title.clone(), self.description.clone());
        if let Err(error) = input.validate() {
            return FormOutcome::Rejected {
                error,
                notice: Notice::CREATE_REQUIRES_FIELDS,
            };
        }

        match store.create_task(input) {
            Ok(tasks) => FormOutcome::Saved {
                tasks,
                notice: Notice::CREATED,
            },
            Err(error) => FormOutcome::Failed {
                error,
                notice: Notice::CREATE_FAILED,
            },
        }
    }
}

/// Edit-task screen input, seeded from the task being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditTaskForm {
    original: Task,
    pub title: String,
    pub description: String,
    pub status: Option<TaskStatus>,
}

impl EditTaskForm {
    pub fn from_task(task: Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            original: task,
        }
    }

    pub fn task_id(&self) -> &str {
        &self.original.id
    }

    /// Toggles completion; clearing keeps the record explicitly pending.
    pub fn set_completed(&mut self, completed: bool) {
        self.status = Some(if completed {
            TaskStatus::Completed
        } else {
            TaskStatus::Pending
        });
    }

    /// The task as it would be written, original id and extra fields kept.
    pub fn edited_task(&self) -> Task {
        Task {
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
            ..self.original.clone()
        }
    }

    pub fn submit<R: KeyValueRepository>(&self, store: &TaskStore<R>) -> FormOutcome {
        let task = self.edited_task();
        if let Err(error) = task.validate() {
            return FormOutcome::Rejected {
                error,
                notice: Notice::UPDATE_REQUIRES_TITLE,
            };
        }

        match store.update_task(task) {
            Ok(tasks) => FormOutcome::Saved {
                tasks,
                notice: Notice::UPDATED,
            },
            Err(error) => FormOutcome::Failed {
                error,
                notice: Notice::UPDATE_FAILED,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EditTaskForm;
    use crate::model::task::{Task, TaskStatus};
    use serde_json::json;

    #[test]
    fn edited_task_keeps_identity_and_extra_fields() {
        let mut original = Task::new("17", "old", "body");
        original
            .extra
            .insert("priority".to_string(), json!("high"));

        let mut form = EditTaskForm::from_task(original);
        form.title = "new".to_string();
        form.description = String::new();
        form.set_completed(true);

        let edited = form.edited_task();
        assert_eq!(edited.id, "17");
        assert_eq!(edited.title, "new");
        assert_eq!(edited.description, "");
        assert_eq!(edited.status, Some(TaskStatus::Completed));
        assert_eq!(edited.extra["priority"], json!("high"));
    }
}
