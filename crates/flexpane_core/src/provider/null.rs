//! Placeholder provider for deployments without a real integration.

use super::{DataProvider, ProviderResult};
use crate::model::feed::{Email, Event};
use async_trait::async_trait;

/// Returns empty lists and never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProvider;

impl NullProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DataProvider for NullProvider {
    fn kind(&self) -> &'static str {
        "null"
    }

    async fn calendar_events(&self) -> ProviderResult<Vec<Event>> {
        Ok(Vec::new())
    }

    async fn emails(&self) -> ProviderResult<Vec<Email>> {
        Ok(Vec::new())
    }
}
