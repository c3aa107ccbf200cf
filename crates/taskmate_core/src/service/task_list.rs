//! Task list view-model: keyword search, status filter and delete flow.
//!
//! # Responsibility
//! - Hold the listing screen state (full collection, criteria, visible rows).
//! - Derive visible rows through the pure [`apply_filters`] function.
//! - Drive the two-step delete confirmation.
//!
//! # Invariants
//! - `visible` is always derived from `all_tasks`, never edited directly.
//! - The full collection is refetched on every activation, not on a timer.
//! - After a delete, `all_tasks` is updated locally without a refetch.

use crate::model::task::{Task, TaskId, TaskStatus};
use crate::repo::kv_repo::KeyValueRepository;
use crate::service::notice::Notice;
use crate::service::task_store::TaskStore;
use log::warn;
use regex::{Regex, RegexBuilder};

/// Status criterion selectable on the listing screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Pending,
}

impl StatusFilter {
    /// Parses the wire label; unknown labels fall back to `All`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "completed" => Self::Completed,
            "pending" => Self::Pending,
            _ => Self::All,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Completed => "completed",
            Self::Pending => "pending",
        }
    }

    fn accepts(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Completed => task.effective_status() == TaskStatus::Completed,
            Self::Pending => task.effective_status() == TaskStatus::Pending,
        }
    }

    fn accepts_stored(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Completed => task.status == Some(TaskStatus::Completed),
            Self::Pending => task.status == Some(TaskStatus::Pending),
        }
    }
}

/// How keyword and status criteria combine into the visible rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterComposition {
    /// Visible rows satisfy both criteria, including after refresh/delete.
    #[default]
    Intersect,
    /// Only the most recently changed criterion applies; refresh and delete
    /// show the full collection. The status criterion compares the stored
    /// status as-is, so tasks with no status match neither `Pending` nor
    /// `Completed`.
    LatestCriterion,
}

/// Returns tasks whose title or description contains `keyword`
/// (case-insensitive) and whose status passes `status_filter`.
///
/// An empty keyword matches every task. Input order is preserved.
pub fn apply_filters(all_tasks: &[Task], keyword: &str, status_filter: StatusFilter) -> Vec<Task> {
    let matcher = KeywordMatcher::new(keyword);
    all_tasks
        .iter()
        .filter(|task| status_filter.accepts(task) && matcher.matches(task))
        .cloned()
        .collect()
}

enum KeywordMatcher {
    Any,
    Pattern(Regex),
    Folded(String),
}

impl KeywordMatcher {
    fn new(keyword: &str) -> Self {
        if keyword.is_empty() {
            return Self::Any;
        }
        match RegexBuilder::new(&regex::escape(keyword))
            .case_insensitive(true)
            .build()
        {
            Ok(pattern) => Self::Pattern(pattern),
            // Only reachable for keywords past the regex size limit.
            Err(_) => Self::Folded(keyword.to_lowercase()),
        }
    }

    fn matches(&self, task: &Task) -> bool {
        match self {
            Self::Any => true,
            Self::Pattern(pattern) => {
                pattern.is_match(&task.title) || pattern.is_match(&task.description)
            }
            Self::Folded(needle) => {
                task.title.to_lowercase().contains(needle.as_str())
                    || task.description.to_lowercase().contains(needle.as_str())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Criterion {
    Keyword,
    Status,
}

/// Listing screen state.
#[derive(Debug, Clone, Default)]
pub struct TaskListViewModel {
    all_tasks: Vec<Task>,
    visible: Vec<Task>,
    keyword: String,
    status_filter: StatusFilter,
    composition: FilterComposition,
    last_criterion: Option<Criterion>,
    pending_delete: Option<TaskId>,
}

impl TaskListViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_composition(composition: FilterComposition) -> Self {
        Self {
            composition,
            ..Self::default()
        }
    }

    pub fn all_tasks(&self) -> &[Task] {
        &self.all_tasks
    }

    /// Rows the listing currently shows.
    pub fn visible_tasks(&self) -> &[Task] {
        &self.visible
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn status_filter(&self) -> StatusFilter {
        self.status_filter
    }

    pub fn composition(&self) -> FilterComposition {
        self.composition
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    /// Refetches the collection; call whenever the listing becomes active.
    ///
    /// On failure the previous rows stay on screen and an error notice is
    /// returned.
    pub fn activate<R: KeyValueRepository>(&mut self, store: &TaskStore<R>) -> Option<Notice> {
        match store.list_tasks() {
            Ok(tasks) => {
                self.all_tasks = tasks;
                self.recompute_after_reload();
                None
            }
            Err(err) => {
                warn!(
                    "event=task_list_refresh module=task_list status=error error_kind={:?}",
                    err.kind()
                );
                Some(Notice::LOAD_FAILED)
            }
        }
    }

    pub fn set_keyword(&mut self, keyword: impl Into<String>) {
        self.keyword = keyword.into();
        self.last_criterion = Some(Criterion::Keyword);
        self.recompute();
    }

    pub fn set_status_filter(&mut self, status_filter: StatusFilter) {
        self.status_filter = status_filter;
        self.last_criterion = Some(Criterion::Status);
        self.recompute();
    }

    /// First step of the delete flow; returns the confirmation notice.
    pub fn request_delete(&mut self, id: impl Into<TaskId>) -> Notice {
        self.pending_delete = Some(id.into());
        Notice::CONFIRM_DELETE
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Second step of the delete flow.
    ///
    /// Returns `None` when no delete was requested.
    pub fn confirm_delete<R: KeyValueRepository>(
        &mut self,
        store: &TaskStore<R>,
    ) -> Option<Notice> {
        let id = self.pending_delete.take()?;
        match store.delete_task(&id) {
            Ok(_) => {
                self.all_tasks.retain(|task| task.id != id);
                self.recompute_after_reload();
                Some(Notice::DELETED)
            }
            Err(err) => {
                warn!(
                    "event=task_list_delete module=task_list status=error error_kind={:?}",
                    err.kind()
                );
                Some(Notice::DELETE_FAILED)
            }
        }
    }

    fn recompute_after_reload(&mut self) {
        match self.composition {
            FilterComposition::Intersect => self.recompute(),
            FilterComposition::LatestCriterion => self.visible = self.all_tasks.clone(),
        }
    }

    fn recompute(&mut self) {
        self.visible = match self.composition {
            FilterComposition::Intersect => {
                apply_filters(&self.all_tasks, &self.keyword, self.status_filter)
            }
            FilterComposition::LatestCriterion => match self.last_criterion {
                Some(Criterion::Keyword) => {
                    apply_filters(&self.all_tasks, &self.keyword, StatusFilter::All)
                }
                Some(Criterion::Status) => {
                    let status_filter = self.status_filter;
                    self.all_tasks
                        .iter()
                        .filter(|task| status_filter.accepts_stored(task))
                        .cloned()
                        .collect()
                }
                None => self.all_tasks.clone(),
            },
        };
    }
}
