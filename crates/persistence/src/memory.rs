//! In-memory voicemail store
//!
//! Mirrors the MongoDB store's filter and ordering so services can be
//! exercised without a database.

use std::cmp::Reverse;

use async_trait::async_trait;
use civic_intel_core::{SearchFilter, VoicemailRecord, Window};
use parking_lot::RwLock;

use crate::{PersistenceError, VoicemailStore};

#[derive(Default)]
pub struct InMemoryVoicemailStore {
    records: RwLock<Vec<VoicemailRecord>>,
}

impl InMemoryVoicemailStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = VoicemailRecord>) -> Self {
        Self {
            records: RwLock::new(records.into_iter().collect()),
        }
    }

    /// Seed a record, standing in for the ingestion workflow
    pub fn insert(&self, record: VoicemailRecord) {
        self.records.write().push(record);
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl VoicemailStore for InMemoryVoicemailStore {
    async fn count(&self, filter: &SearchFilter) -> Result<u64, PersistenceError> {
        let records = self.records.read();
        Ok(records.iter().filter(|r| filter.matches(r)).count() as u64)
    }

    async fn find(
        &self,
        filter: &SearchFilter,
        window: Window,
    ) -> Result<Vec<VoicemailRecord>, PersistenceError> {
        let mut matched: Vec<VoicemailRecord> = self
            .records
            .read()
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();

        // None sorts below Some, so undated records end up last
        matched.sort_by_key(|r| Reverse(r.timestamp));

        Ok(window.apply(matched))
    }

    async fn ping(&self) -> Result<(), PersistenceError> {
        Ok(())
    }
}
