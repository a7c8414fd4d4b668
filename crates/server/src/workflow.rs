//! External ingestion workflow trigger
//!
//! The workflow is an opaque automation endpoint: a POST starts it, it writes
//! new voicemails into storage on its own, and it may answer with a `link` to
//! a result artifact.

use std::time::Duration;

use civic_intel_config::WorkflowConfig;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Workflow request failed: {0}")]
    Request(String),

    #[error("Workflow returned HTTP {0}")]
    Status(u16),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

/// What a successful trigger reported back
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowOutcome {
    pub link: Option<String>,
}

#[derive(Clone)]
pub struct WorkflowClient {
    http: reqwest::Client,
    webhook_url: String,
    refresh_delay: Duration,
}

impl WorkflowClient {
    pub fn new(
        webhook_url: impl Into<String>,
        timeout: Duration,
        refresh_delay: Duration,
    ) -> Result<Self, WorkflowError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WorkflowError::Client(e.to_string()))?;

        Ok(Self {
            http,
            webhook_url: webhook_url.into(),
            refresh_delay,
        })
    }

    /// Build a client when a webhook is configured
    pub fn from_config(config: &WorkflowConfig) -> Result<Option<Self>, WorkflowError> {
        config
            .webhook_url
            .as_deref()
            .map(|url| {
                Self::new(
                    url,
                    Duration::from_secs(config.timeout_seconds),
                    Duration::from_millis(config.refresh_delay_ms),
                )
            })
            .transpose()
    }

    /// How long to wait before re-reading storage after a trigger
    pub fn refresh_delay(&self) -> Duration {
        self.refresh_delay
    }

    /// Start the workflow.
    ///
    /// Any 2xx answer is a success; a body that is not JSON or has no string
    /// `link` just yields no link.
    pub async fn trigger(&self) -> Result<WorkflowOutcome, WorkflowError> {
        tracing::info!(url = %self.webhook_url, "Triggering ingestion workflow");

        let response = self
            .http
            .post(&self.webhook_url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| WorkflowError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WorkflowError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| WorkflowError::Request(e.to_string()))?;

        let link = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("link").and_then(|l| l.as_str()).map(str::to_string));

        tracing::info!(link = ?link, "Workflow accepted");
        Ok(WorkflowOutcome { link })
    }
}
