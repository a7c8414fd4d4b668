//! Application State
//!
//! Shared state across all handlers.

use std::sync::Arc;

use civic_intel_config::Settings;
use civic_intel_persistence::VoicemailStore;

use crate::query::QueryService;
use crate::workflow::{WorkflowClient, WorkflowError};

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration
    pub config: Arc<Settings>,
    /// Voicemail queries over the process-wide store
    pub voicemails: QueryService,
    /// Ingestion workflow, when a webhook is configured
    pub workflow: Option<WorkflowClient>,
}

impl AppState {
    /// Create application state around an already connected store
    pub fn new(config: Settings, store: Arc<dyn VoicemailStore>) -> Result<Self, WorkflowError> {
        let workflow = WorkflowClient::from_config(&config.workflow)?;
        if workflow.is_none() {
            tracing::warn!("workflow.webhook_url not set; POST /api/workflow/run is disabled");
        }

        Ok(Self {
            config: Arc::new(config),
            voicemails: QueryService::new(store),
            workflow,
        })
    }
}
