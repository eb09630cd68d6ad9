//! Inbox preview pane backed by a data provider.

use super::{Pane, PaneDataError, RequestContext};
use crate::model::pane::{EmailData, PaneData};
use crate::provider::DataProvider;
use async_trait::async_trait;
use std::sync::Arc;

pub const EMAIL_PANE_ID: &str = "email";
const EMAIL_TITLE: &str = "Email Preview";
const EMAIL_TEMPLATE: &str = "panes/email.html";

pub struct EmailPane {
    id: String,
    title: String,
    provider: Arc<dyn DataProvider>,
}

impl EmailPane {
    pub fn new(provider: Arc<dyn DataProvider>) -> Self {
        Self {
            id: EMAIL_PANE_ID.to_string(),
            title: EMAIL_TITLE.to_string(),
            provider,
        }
    }

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
impl Pane for EmailPane {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn template(&self) -> &str {
        EMAIL_TEMPLATE
    }

    async fn get_data(&self, _ctx: &RequestContext) -> Result<PaneData, PaneDataError> {
        self.provider
            .emails()
            .await
            .map(|emails| PaneData::Email(EmailData::new(emails)))
            .map_err(|err| PaneDataError::new(PaneData::Email(EmailData::default()), err))
    }
}
