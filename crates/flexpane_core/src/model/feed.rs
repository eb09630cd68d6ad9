//! Read-only calendar and mail records sourced from data providers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Calendar entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Inbox message summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub id: String,
    pub subject: String,
    pub from: String,
    pub preview: String,
    pub time: DateTime<Utc>,
    pub read: bool,
}
