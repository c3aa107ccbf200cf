//! Flutter-facing bindings for Taskmate core.

pub mod api;
