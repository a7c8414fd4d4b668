//! Voicemail reads against MongoDB

use async_trait::async_trait;
use bson::Document;
use civic_intel_core::{SearchFilter, VoicemailRecord, Window};
use futures::TryStreamExt;
use mongodb::options::FindOptions;

use crate::document::{filter_document, record_from_document, sort_document};
use crate::{MongoClient, PersistenceError, VoicemailStore};

/// MongoDB implementation of the voicemail store
#[derive(Clone)]
pub struct MongoVoicemailStore {
    client: MongoClient,
}

impl MongoVoicemailStore {
    pub fn new(client: MongoClient) -> Self {
        Self { client }
    }
}

/// Sorted, windowed find options.
///
/// The driver sends skip and limit as BSON int64, so both are clamped to
/// `i64::MAX`; a limit of 0 means "no limit" to the driver, so it is only set
/// when bounded.
fn find_options(window: Window) -> FindOptions {
    let skip = i64::try_from(window.skip).map_or(i64::MAX as u64, |skip| skip as u64);
    let limit = window
        .limit
        .map(|limit| i64::try_from(limit).unwrap_or(i64::MAX));

    FindOptions::builder()
        .sort(sort_document())
        .skip(skip)
        .limit(limit)
        .build()
}

#[async_trait]
impl VoicemailStore for MongoVoicemailStore {
    async fn count(&self, filter: &SearchFilter) -> Result<u64, PersistenceError> {
        let total = self
            .client
            .collection()
            .count_documents(filter_document(filter), None)
            .await?;

        tracing::debug!(search = ?filter.needle(), total, "Counted voicemails");
        Ok(total)
    }

    async fn find(
        &self,
        filter: &SearchFilter,
        window: Window,
    ) -> Result<Vec<VoicemailRecord>, PersistenceError> {
        let options = find_options(window);

        let cursor = self
            .client
            .collection()
            .find(filter_document(filter), options)
            .await?;
        let documents: Vec<Document> = cursor.try_collect().await?;

        tracing::debug!(
            search = ?filter.needle(),
            skip = window.skip,
            limit = ?window.limit,
            returned = documents.len(),
            "Fetched voicemails"
        );

        Ok(documents.iter().map(record_from_document).collect())
    }

    async fn ping(&self) -> Result<(), PersistenceError> {
        self.client.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_find_options_for_page() {
        let options = find_options(Window { skip: 10, limit: Some(5) });
        assert_eq!(options.skip, Some(10));
        assert_eq!(options.limit, Some(5));
        assert_eq!(options.sort, Some(doc! { "timestamp": -1 }));
    }

    #[test]
    fn test_find_options_clamp_to_int64() {
        let options = find_options(Window { skip: u64::MAX, limit: Some(u64::MAX) });
        assert_eq!(options.skip, Some(i64::MAX as u64));
        assert_eq!(options.limit, Some(i64::MAX));
    }

    #[test]
    fn test_find_options_unbounded() {
        let options = find_options(Window::unbounded());
        assert_eq!(options.skip, Some(0));
        assert_eq!(options.limit, None);
    }
}
