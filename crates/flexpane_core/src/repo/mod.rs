//! Persistence layer.
//!
//! # Responsibility
//! - Own the only durable state of the dashboard: the todo list file.
//!
//! # Invariants
//! - Memory and disk never silently diverge after a reported success.

pub mod todo_store;
