//! Deterministic synthetic data for development and tests.
//!
//! # Invariants
//! - Times are offsets from an anchor captured at construction, so repeated
//!   calls on one instance return identical records.
//! - Events lie in the future relative to the anchor; emails in the past.

use super::{DataProvider, ProviderResult};
use crate::model::feed::{Email, Event};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

/// Fixed three-event / three-email fixture.
#[derive(Debug, Clone)]
pub struct DemoProvider {
    anchor: DateTime<Utc>,
}

impl Default for DemoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoProvider {
    pub fn new() -> Self {
        Self::anchored_at(Utc::now())
    }

    pub fn anchored_at(anchor: DateTime<Utc>) -> Self {
        Self { anchor }
    }

    pub fn anchor(&self) -> DateTime<Utc> {
        self.anchor
    }

    fn event(
        &self,
        id: &str,
        title: &str,
        start: Duration,
        length: Duration,
        location: &str,
    ) -> Event {
        let start = self.anchor + start;
        Event {
            id: id.to_string(),
            title: title.to_string(),
            start,
            end: start + length,
            location: Some(location.to_string()),
        }
    }

    fn email(
        &self,
        id: &str,
        subject: &str,
        from: &str,
        preview: &str,
        age: Duration,
        read: bool,
    ) -> Email {
        Email {
            id: id.to_string(),
            subject: subject.to_string(),
            from: from.to_string(),
            preview: preview.to_string(),
            time: self.anchor - age,
            read,
        }
    }
}

#[async_trait]
impl DataProvider for DemoProvider {
    fn kind(&self) -> &'static str {
        "mock"
    }

    async fn calendar_events(&self) -> ProviderResult<Vec<Event>> {
        Ok(vec![
            self.event(
                "1",
                "Team Standup",
                Duration::hours(1),
                Duration::minutes(30),
                "Conference Room A",
            ),
            self.event(
                "2",
                "Product Review",
                Duration::hours(2),
                Duration::hours(1),
                "Zoom",
            ),
            self.event(
                "3",
                "Client Call",
                Duration::hours(4),
                Duration::minutes(45),
                "Phone",
            ),
        ])
    }

    async fn emails(&self) -> ProviderResult<Vec<Email>> {
        Ok(vec![
            self.email(
                "1",
                "Budget Meeting",
                "sarah@company.com",
                "Q4 planning...",
                Duration::hours(2),
                false,
            ),
            self.email(
                "2",
                "Project Update",
                "mike@company.com",
                "Latest build ready...",
                Duration::hours(4),
                true,
            ),
            self.email(
                "3",
                "Newsletter",
                "news@tech.com",
                "AI developments...",
                Duration::minutes(30),
                false,
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::DemoProvider;
    use crate::provider::DataProvider;

    #[tokio::test]
    async fn events_are_future_and_ordered_by_fixture() {
        let provider = DemoProvider::new();
        let events = provider.calendar_events().await.expect("events");
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|event| event.start > provider.anchor()));
        assert!(events.iter().all(|event| event.end > event.start));
        assert_eq!(events[0].title, "Team Standup");
    }

    #[tokio::test]
    async fn emails_are_in_the_past() {
        let provider = DemoProvider::new();
        let emails = provider.emails().await.expect("emails");
        assert_eq!(emails.len(), 3);
        assert!(emails.iter().all(|email| email.time < provider.anchor()));
        assert_eq!(emails.iter().filter(|email| !email.read).count(), 2);
    }
}
