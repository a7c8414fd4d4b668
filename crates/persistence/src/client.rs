//! MongoDB client and connection management

use std::time::Duration;

use bson::{doc, Document};
use mongodb::{options::ClientOptions, Client, Collection};

use crate::error::PersistenceError;

/// MongoDB configuration
#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
    pub collection: String,
    pub app_name: String,
    pub connect_timeout_ms: u64,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: "civicIntel".to_string(),
            collection: "voicemails".to_string(),
            app_name: "civic-intel".to_string(),
            connect_timeout_ms: 5000,
        }
    }
}

/// MongoDB client wrapper.
///
/// Built once at startup and shared; the driver pools connections internally
/// and connects lazily, so constructing it does not require a live server.
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    config: MongoConfig,
}

impl MongoClient {
    /// Parse the connection string and build the client
    pub async fn connect(config: MongoConfig) -> Result<Self, PersistenceError> {
        tracing::info!(database = %config.database, collection = %config.collection, "Connecting to MongoDB");

        let mut options = ClientOptions::parse(&config.uri)
            .await
            .map_err(|e| PersistenceError::Connection(e.to_string()))?;

        let timeout = Duration::from_millis(config.connect_timeout_ms);
        options.app_name = Some(config.app_name.clone());
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);

        let client = Client::with_options(options)
            .map_err(|e| PersistenceError::Connection(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Round-trip a `ping` command to the server
    pub async fn ping(&self) -> Result<(), PersistenceError> {
        self.client
            .database(&self.config.database)
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| PersistenceError::Connection(e.to_string()))?;
        Ok(())
    }

    /// Raw document handle on the voicemail collection
    pub fn collection(&self) -> Collection<Document> {
        self.client
            .database(&self.config.database)
            .collection(&self.config.collection)
    }
}
