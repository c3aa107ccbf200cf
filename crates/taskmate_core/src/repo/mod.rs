//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the key-value storage contract the task store is written against.
//! - Isolate SQLite query details from store/use-case orchestration.
//!
//! # Invariants
//! - Values are opaque strings; the repository never interprets them.
//! - Writes replace the whole value for a key in one statement.

pub mod kv_repo;
