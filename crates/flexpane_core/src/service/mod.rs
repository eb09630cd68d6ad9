//! Core use-case services.
//!
//! # Responsibility
//! - Wire configuration, storage, providers and panes into a dashboard.
//! - Keep the HTTP layer decoupled from construction details.
//!
//! # See also
//! - docs/architecture/dashboard.md

pub mod dashboard;
