//! HTTP Endpoints
//!
//! REST API for the voicemail dashboard.

use axum::{
    extract::{RawQuery, State},
    http::{HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use civic_intel_core::{Insights, ListQuery, SearchFilter, VoicemailPage, VoicemailRecord};
use serde::Serialize;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::metrics::{self, metrics_handler};
use crate::state::AppState;
use crate::ServerError;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        // Voicemail endpoints
        .route("/api/voicemails", get(list_voicemails))
        .route("/api/insights", get(insights))

        // Ingestion workflow
        .route("/api/workflow/run", post(run_workflow))

        // Smoke test
        .route("/api/test", get(test_endpoint))

        // Health check
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))

        // Metrics
        .route("/metrics", get(metrics_handler))

        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    if state.config.server.cors_enabled {
        router = router.layer(cors_layer(&state.config.server.cors_origins));
    }

    router.with_state(state)
}

/// Any origin when none are listed, otherwise only the listed ones
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(allowed))
}

/// Raw listing parameters.
///
/// Each key is decoded on its own and only its first occurrence counts, so a
/// malformed or repeated value never discards the others.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ListParams {
    pub search: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListParams {
    pub fn from_query_string(raw: Option<&str>) -> Self {
        let mut params = Self::default();
        for (key, value) in form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            let slot = match key.as_ref() {
                "search" => &mut params.search,
                "page" => &mut params.page,
                "limit" => &mut params.limit,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }

    fn into_query(self) -> ListQuery {
        ListQuery::from_params(
            self.search.as_deref(),
            self.page.as_deref(),
            self.limit.as_deref(),
        )
    }
}

/// List voicemails with search and pagination
async fn list_voicemails(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Json<VoicemailPage>, ServerError> {
    metrics::record_request("voicemails");

    let query = ListParams::from_query_string(raw.as_deref()).into_query();
    let page = state.voicemails.list_voicemails(&query).await?;

    Ok(Json(page))
}

/// Sentiment insights over the unpaged result set
async fn insights(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Insights>, ServerError> {
    metrics::record_request("insights");

    // Only `search` applies; paging parameters are ignored here
    let params = ListParams::from_query_string(raw.as_deref());
    let filter = SearchFilter::new(params.search.as_deref().unwrap_or_default());
    let insights = state.voicemails.insights(&filter).await?;

    Ok(Json(insights))
}

/// Workflow run response
#[derive(Debug, Serialize)]
struct WorkflowRunResponse {
    message: &'static str,
    link: Option<String>,
    voicemails: Vec<VoicemailRecord>,
    total: u64,
}

/// Trigger the ingestion workflow, then re-read the newest voicemails
async fn run_workflow(
    State(state): State<AppState>,
) -> Result<Json<WorkflowRunResponse>, ServerError> {
    metrics::record_request("workflow");

    let workflow = state
        .workflow
        .as_ref()
        .ok_or(ServerError::WorkflowNotConfigured)?;

    let outcome = match workflow.trigger().await {
        Ok(outcome) => {
            metrics::record_workflow_run("success");
            outcome
        }
        Err(e) => {
            metrics::record_workflow_run("failure");
            return Err(e.into());
        }
    };

    // Give the workflow time to insert before reading back
    tokio::time::sleep(workflow.refresh_delay()).await;

    let page = state.voicemails.list_voicemails(&ListQuery::default()).await?;

    Ok(Json(WorkflowRunResponse {
        message: "Workflow completed successfully!",
        link: outcome.link,
        voicemails: page.voicemails,
        total: page.total,
    }))
}

async fn test_endpoint() -> impl IntoResponse {
    Json(serde_json::json!({ "message": "Server works!" }))
}

/// Health check
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness check
async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.voicemails.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "ready" })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "status": "unavailable" })),
            )
        }
    }
}
