//! Civic Intel Server
//!
//! HTTP API over the voicemail collection: paginated search, sentiment
//! insights and the ingestion workflow trigger.

pub mod http;
pub mod metrics;
pub mod query;
pub mod state;
pub mod workflow;

pub use http::create_router;
pub use crate::metrics::init_metrics;
pub use query::QueryService;
pub use state::AppState;
pub use workflow::{WorkflowClient, WorkflowError, WorkflowOutcome};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use civic_intel_persistence::PersistenceError;
use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] PersistenceError),

    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    #[error("Workflow webhook is not configured")]
    WorkflowNotConfigured,
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Workflow(_) => StatusCode::BAD_GATEWAY,
            ServerError::WorkflowNotConfigured => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Message shown to clients; internal details stay in the logs
    pub fn public_message(&self) -> &'static str {
        match self {
            ServerError::Database(_) => "Database error",
            ServerError::Workflow(_) => "Something went wrong. Please try again.",
            ServerError::WorkflowNotConfigured => "Workflow is not configured",
        }
    }

    fn metric_label(&self) -> &'static str {
        match self {
            ServerError::Database(_) => "database",
            ServerError::Workflow(_) => "workflow",
            ServerError::WorkflowNotConfigured => "workflow_config",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Request failed");
        crate::metrics::record_error(self.metric_label());

        (
            self.status_code(),
            Json(serde_json::json!({ "error": self.public_message() })),
        )
            .into_response()
    }
}
