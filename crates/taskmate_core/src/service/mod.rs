//! Task use-case services.
//!
//! # Responsibility
//! - Orchestrate key-value repository calls into task use-cases.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod notice;
pub mod task_form;
pub mod task_list;
pub mod task_store;
