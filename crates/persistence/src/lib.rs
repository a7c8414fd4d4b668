//! Document store access for civic intel
//!
//! Provides read access to the voicemail collection through [`VoicemailStore`]:
//! - MongoDB, the production backend
//! - An in-memory store with the same semantics, for tests and demos
//!
//! Nothing here writes to MongoDB; records arrive through the external
//! ingestion workflow.

pub mod client;
pub mod document;
pub mod error;
pub mod memory;
pub mod store;
pub mod voicemails;

pub use client::{MongoClient, MongoConfig};
pub use error::PersistenceError;
pub use memory::InMemoryVoicemailStore;
pub use store::VoicemailStore;
pub use voicemails::MongoVoicemailStore;

/// Connect to MongoDB and build the voicemail store
pub async fn init(config: MongoConfig) -> Result<MongoVoicemailStore, PersistenceError> {
    let client = MongoClient::connect(config).await?;
    Ok(MongoVoicemailStore::new(client))
}
