//! User-facing dialog content produced by task screens.
//!
//! Screens never show raw error text; every outcome maps to one fixed notice.

/// How the UI should present a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Acknowledge-only success dialog.
    Success,
    /// Acknowledge-only error dialog.
    Error,
    /// Destructive confirmation with cancel/confirm actions.
    Confirm,
}

/// Dialog title and message for one screen outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: &'static str,
    pub message: &'static str,
}

impl Notice {
    const fn error(message: &'static str) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: "Error",
            message,
        }
    }

    const fn success(message: &'static str) -> Self {
        Self {
            kind: NoticeKind::Success,
            title: "Success",
            message,
        }
    }

    pub const LOAD_FAILED: Self =
        Self::error("Failed to load tasks. Please check your connection.");

    pub const CREATE_REQUIRES_FIELDS: Self =
        Self::error("Both title and description are required.");
    pub const CREATED: Self = Self::success("Task added successfully!");
    pub const CREATE_FAILED: Self = Self::error("Failed to add the task. Please try again.");

    pub const UPDATE_REQUIRES_TITLE: Self = Self::error("Title is required.");
    pub const UPDATED: Self = Self::success("Task updated successfully!");
    pub const UPDATE_FAILED: Self = Self::error("Failed to update the task. Please try again.");

    pub const CONFIRM_DELETE: Self = Self {
        kind: NoticeKind::Confirm,
        title: "Confirm Delete",
        message: "Are you sure you want to delete this task?",
    };
    pub const DELETED: Self = Self::success("Task deleted successfully!");
    pub const DELETE_FAILED: Self = Self::error("Failed to delete the task. Please try again.");

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}
