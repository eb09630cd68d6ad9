//! Pane registry and per-request page assembly.
//!
//! # Responsibility
//! - Hold registered panes by id, the enabled order and per-pane layout.
//! - Resolve the enabled panes into renderable descriptors for one request.
//!
//! # Invariants
//! - Ids are unique; a later registration replaces an earlier one.
//! - Enabled ids without a registered pane are skipped, never fatal.
//! - One failing or slow pane yields `data: None` for that pane only.
//! - Descriptor order always matches the enabled order.

use super::{Pane, RequestContext};
use crate::model::pane::{PaneData, PaneDescriptor, PaneLayout};
use futures::future::join_all;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Default, Clone)]
pub struct PaneRegistry {
    panes: BTreeMap<String, Arc<dyn Pane>>,
    enabled: Vec<String>,
    layout: BTreeMap<String, PaneLayout>,
    fetch_timeout: Option<Duration>,
}

impl PaneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `pane` under its own id, replacing any previous holder.
    pub fn register(&mut self, pane: Arc<dyn Pane>) {
        let id = pane.id().trim().to_string();
        if self.panes.insert(id.clone(), pane).is_some() {
            warn!("event=pane_register module=pane status=replaced id={id}");
        }
    }

    /// Sets the ordered list of panes shown on the page.
    pub fn set_enabled<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.enabled = ids
            .into_iter()
            .map(|id| id.as_ref().trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();
    }

    pub fn set_layout(&mut self, layout: BTreeMap<String, PaneLayout>) {
        self.layout = layout;
    }

    /// Bounds each pane fetch; `None` waits indefinitely.
    pub fn set_fetch_timeout(&mut self, timeout: Option<Duration>) {
        self.fetch_timeout = timeout;
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout
    }

    pub fn get_pane(&self, id: &str) -> Option<Arc<dyn Pane>> {
        self.panes.get(id.trim()).cloned()
    }

    pub fn enabled(&self) -> &[String] {
        &self.enabled
    }

    /// Registered ids, sorted.
    pub fn pane_ids(&self) -> Vec<String> {
        self.panes.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.panes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panes.is_empty()
    }

    /// Fetches every enabled, registered pane concurrently and assembles
    /// descriptors in enabled order.
    pub async fn resolve_enabled(&self, ctx: &RequestContext) -> Vec<PaneDescriptor> {
        let panes = self
            .enabled
            .iter()
            .filter_map(|id| match self.panes.get(id) {
                Some(pane) => Some(pane.clone()),
                None => {
                    debug!("event=pane_resolve module=pane status=skipped id={id} reason=unregistered");
                    None
                }
            })
            .collect::<Vec<_>>();

        let fetched = join_all(panes.iter().map(|pane| self.fetch(pane.as_ref(), ctx))).await;

        panes
            .iter()
            .zip(fetched)
            .map(|(pane, data)| PaneDescriptor {
                id: pane.id().to_string(),
                title: pane.title().to_string(),
                grid_area: self
                    .layout
                    .get(pane.id())
                    .map(|layout| layout.grid_area.clone())
                    .unwrap_or_default(),
                data,
                template: pane.template().to_string(),
            })
            .collect()
    }

    async fn fetch(&self, pane: &dyn Pane, ctx: &RequestContext) -> Option<PaneData> {
        let result = match self.fetch_timeout {
            Some(limit) => match tokio::time::timeout(limit, pane.get_data(ctx)).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(
                        "event=pane_fetch module=pane status=timeout id={} request_id={} timeout_ms={}",
                        pane.id(),
                        ctx.request_id,
                        limit.as_millis()
                    );
                    return None;
                }
            },
            None => pane.get_data(ctx).await,
        };
        match result {
            Ok(data) => Some(data),
            Err(err) => {
                warn!(
                    "event=pane_fetch module=pane status=error id={} request_id={} error={}",
                    pane.id(),
                    ctx.request_id,
                    err
                );
                None
            }
        }
    }
}
