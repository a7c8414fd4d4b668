//! Voicemail query service
//!
//! Turns a [`ListQuery`] into a page envelope using whatever
//! [`VoicemailStore`] the process was started with.

use std::sync::Arc;
use std::time::Instant;

use civic_intel_core::{compute_insights, Insights, ListQuery, SearchFilter, VoicemailPage, Window};
use civic_intel_persistence::VoicemailStore;

use crate::metrics;
use crate::ServerError;

#[derive(Clone)]
pub struct QueryService {
    store: Arc<dyn VoicemailStore>,
}

impl QueryService {
    pub fn new(store: Arc<dyn VoicemailStore>) -> Self {
        Self { store }
    }

    /// Filter, sort and paginate the collection.
    ///
    /// `total` is counted over the whole filtered set before the page window
    /// is applied.
    pub async fn list_voicemails(&self, query: &ListQuery) -> Result<VoicemailPage, ServerError> {
        let started = Instant::now();

        let total = self.store.count(&query.filter).await?;
        let window = query.page.window();

        // Nothing to read past the end of the filtered set
        let voicemails = if window.skip >= total {
            Vec::new()
        } else {
            self.store.find(&query.filter, window).await?
        };

        metrics::record_query_latency(started.elapsed().as_secs_f64());
        tracing::debug!(
            search = ?query.filter.needle(),
            page = ?query.page,
            total,
            returned = voicemails.len(),
            "Listed voicemails"
        );

        Ok(VoicemailPage::assemble(query.page, voicemails, total))
    }

    /// Sentiment insights over every record matching the filter
    pub async fn insights(&self, filter: &SearchFilter) -> Result<Insights, ServerError> {
        let records = self.store.find(filter, Window::unbounded()).await?;
        Ok(compute_insights(&records))
    }

    /// Check the store is reachable
    pub async fn ping(&self) -> Result<(), ServerError> {
        self.store.ping().await?;
        Ok(())
    }
}
