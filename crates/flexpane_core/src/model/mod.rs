//! Dashboard domain model.
//!
//! # Responsibility
//! - Define the records panes render (todos, calendar events, emails).
//! - Define the per-request view model produced by the pane registry.
//!
//! # Invariants
//! - Todos are owned by the todo store; events and emails are read-only and
//!   never persisted by this crate.
//! - Pane payloads are a closed sum type, never an untyped blob.

pub mod feed;
pub mod pane;
pub mod todo;
