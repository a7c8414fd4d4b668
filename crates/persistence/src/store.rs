//! Storage abstraction for the voicemail collection

use async_trait::async_trait;
use civic_intel_core::{SearchFilter, VoicemailRecord, Window};

use crate::PersistenceError;

/// Read-only view of the voicemail collection.
///
/// Implementations must evaluate [`SearchFilter`] exactly as
/// [`SearchFilter::matches`] does and return records newest first, with
/// undated records after dated ones.
#[async_trait]
pub trait VoicemailStore: Send + Sync {
    /// Number of records matching the filter, ignoring any window
    async fn count(&self, filter: &SearchFilter) -> Result<u64, PersistenceError>;

    /// Matching records sorted by timestamp descending, then windowed
    async fn find(
        &self,
        filter: &SearchFilter,
        window: Window,
    ) -> Result<Vec<VoicemailRecord>, PersistenceError>;

    /// Check that the backend is reachable
    async fn ping(&self) -> Result<(), PersistenceError>;
}
