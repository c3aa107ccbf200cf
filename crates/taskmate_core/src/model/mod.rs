//! Task domain model.
//!
//! # Responsibility
//! - Define the task record persisted in the `tasks` collection.
//! - Own field-level validation shared by store and form layers.
//!
//! # Invariants
//! - Every task is identified by a stable, collection-unique `TaskId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod task;
