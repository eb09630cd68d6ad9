//! JSON-file-backed provider.
//!
//! Reads `{"events": [...], "emails": [...]}` from disk on every call so the
//! file can be edited while the server runs.

use super::{DataProvider, ProviderError, ProviderResult};
use crate::model::feed::{Email, Event};
use async_trait::async_trait;
use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
struct FeedFile {
    #[serde(default)]
    events: Vec<Event>,
    #[serde(default)]
    emails: Vec<Email>,
}

/// Provider reading a local JSON feed file.
#[derive(Debug, Clone)]
pub struct JsonFileProvider {
    path: PathBuf,
}

impl JsonFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> ProviderResult<FeedFile> {
        let path = self.path.clone();
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(FeedFile::default()),
            Err(err) => {
                return Err(ProviderError::Source(format!(
                    "failed to read `{}`: {err}",
                    path.display()
                )))
            }
        };
        serde_json::from_slice(&bytes).map_err(|err| {
            ProviderError::Source(format!("failed to parse `{}`: {err}", path.display()))
        })
    }
}

#[async_trait]
impl DataProvider for JsonFileProvider {
    fn kind(&self) -> &'static str {
        "file"
    }

    async fn calendar_events(&self) -> ProviderResult<Vec<Event>> {
        Ok(self.load().await?.events)
    }

    async fn emails(&self) -> ProviderResult<Vec<Email>> {
        Ok(self.load().await?.emails)
    }
}

#[cfg(test)]
mod tests {
    use super::JsonFileProvider;
    use crate::provider::{DataProvider, ProviderError};
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_file_is_empty() {
        let dir = TempDir::new().expect("temp dir");
        let provider = JsonFileProvider::new(dir.path().join("feed.json"));
        assert!(provider.calendar_events().await.expect("events").is_empty());
    }

    #[tokio::test]
    async fn reads_events_and_emails() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("feed.json");
        std::fs::write(
            &path,
            r#"{
                "events": [{"id": "e1", "title": "Dentist",
                            "start": "2026-03-01T09:00:00Z", "end": "2026-03-01T10:00:00Z"}],
                "emails": [{"id": "m1", "subject": "Hi", "from": "a@b.c", "preview": "hello",
                            "time": "2026-02-28T08:00:00Z", "read": true}]
            }"#,
        )
        .expect("seed feed");

        let provider = JsonFileProvider::new(&path);
        let events = provider.calendar_events().await.expect("events");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Dentist");
        assert_eq!(events[0].location, None);
        let emails = provider.emails().await.expect("emails");
        assert!(emails[0].read);
    }

    #[tokio::test]
    async fn malformed_file_is_a_source_error() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("feed.json");
        std::fs::write(&path, "[oops").expect("seed feed");
        let err = JsonFileProvider::new(&path)
            .emails()
            .await
            .expect_err("malformed feed must fail");
        assert!(matches!(err, ProviderError::Source(_)));
    }
}
