//! Upcoming-events pane backed by a data provider.

use super::{Pane, PaneDataError, RequestContext};
use crate::model::pane::{CalendarData, PaneData};
use crate::provider::DataProvider;
use async_trait::async_trait;
use std::sync::Arc;

pub const CALENDAR_PANE_ID: &str = "calendar";
const CALENDAR_TITLE: &str = "Calendar";
const CALENDAR_TEMPLATE: &str = "panes/calendar.html";

pub struct CalendarPane {
    id: String,
    title: String,
    provider: Arc<dyn DataProvider>,
}

impl CalendarPane {
    pub fn new(provider: Arc<dyn DataProvider>) -> Self {
        Self {
            id: CALENDAR_PANE_ID.to_string(),
            title: CALENDAR_TITLE.to_string(),
            provider,
        }
    }

    /// Overrides the pane id so one type can appear twice.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

#[async_trait]
impl Pane for CalendarPane {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn template(&self) -> &str {
        CALENDAR_TEMPLATE
    }

    async fn get_data(&self, _ctx: &RequestContext) -> Result<PaneData, PaneDataError> {
        match self.provider.calendar_events().await {
            Ok(events) => Ok(PaneData::Calendar(CalendarData::new(events))),
            Err(err) => Err(PaneDataError::new(
                PaneData::Calendar(CalendarData::default()),
                err,
            )),
        }
    }
}
