//! Integration tests for the HTTP API
//!
//! These drive the full router against an in-memory store.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::post,
    Json, Router,
};
use chrono::{Duration, TimeZone, Utc};
use serde_json::Value;
use tower::ServiceExt;

use civic_intel_config::Settings;
use civic_intel_core::{SearchFilter, VoicemailRecord, Window};
use civic_intel_persistence::{InMemoryVoicemailStore, PersistenceError, VoicemailStore};
use civic_intel_server::{create_router, AppState};

/// Store whose backend is always down
struct UnavailableStore;

#[async_trait]
impl VoicemailStore for UnavailableStore {
    async fn count(&self, _filter: &SearchFilter) -> Result<u64, PersistenceError> {
        Err(PersistenceError::Connection("connection refused".to_string()))
    }

    async fn find(
        &self,
        _filter: &SearchFilter,
        _window: Window,
    ) -> Result<Vec<VoicemailRecord>, PersistenceError> {
        Err(PersistenceError::Connection("connection refused".to_string()))
    }

    async fn ping(&self) -> Result<(), PersistenceError> {
        Err(PersistenceError::Connection("connection refused".to_string()))
    }
}

/// 12 billing voicemails one minute apart plus a few others
fn seeded_store() -> Arc<InMemoryVoicemailStore> {
    let base = Utc.with_ymd_and_hms(2024, 4, 1, 8, 0, 0).unwrap();
    let store = InMemoryVoicemailStore::new();

    for i in 0..12 {
        store.insert(
            VoicemailRecord::new(format!("billing-{i:02}"))
                .with_timestamp(base + Duration::minutes(i))
                .with_category("Billing")
                .with_region(if i % 3 == 0 { "North" } else { "South" })
                .with_sentiment(match i % 3 {
                    0 => "Positive",
                    1 => "negative",
                    _ => "Neutral",
                }),
        );
    }

    store.insert(
        VoicemailRecord::new("roads-1")
            .with_timestamp(base + Duration::hours(5))
            .with_category("Roads")
            .with_region("East")
            .with_sentiment("negative")
            .with_text("Pothole outside the library"),
    );
    store.insert(VoicemailRecord::new("bare"));

    Arc::new(store)
}

fn router_with(store: Arc<dyn VoicemailStore>, settings: Settings) -> Router {
    let state = AppState::new(settings, store).unwrap();
    create_router(state)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    read_json(response).await
}

async fn post_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    read_json(response).await
}

async fn read_json(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn ids(body: &Value) -> Vec<String> {
    body["voicemails"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_default_listing() {
    let app = router_with(seeded_store(), Settings::default());
    let (status, body) = get_json(app, "/api/voicemails").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 14);
    assert_eq!(body["page"], 1);
    assert_eq!(body["totalPages"], 2);

    let ids = ids(&body);
    assert_eq!(ids.len(), 10);
    assert_eq!(ids[0], "roads-1");
    assert_eq!(ids[1], "billing-11");
}

#[tokio::test]
async fn test_search_second_page() {
    let app = router_with(seeded_store(), Settings::default());
    let (status, body) = get_json(app, "/api/voicemails?search=billing&page=2&limit=5").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 12);
    assert_eq!(body["page"], 2);
    assert_eq!(body["totalPages"], 3);
    assert_eq!(
        ids(&body),
        vec!["billing-06", "billing-05", "billing-04", "billing-03", "billing-02"]
    );
}

#[tokio::test]
async fn test_search_matches_any_field() {
    let store = seeded_store();

    for term in ["north", "LIBRARY", "Negat", "east"] {
        let app = router_with(store.clone(), Settings::default());
        let (_, body) = get_json(app, &format!("/api/voicemails?search={term}&limit=0")).await;

        let filter = SearchFilter::new(term);
        let records: Vec<VoicemailRecord> =
            serde_json::from_value(body["voicemails"].clone()).unwrap();
        assert!(!records.is_empty(), "no results for {term}");
        assert!(records.iter().all(|r| filter.matches(r)));
        assert_eq!(body["total"], records.len() as u64);
    }
}

#[tokio::test]
async fn test_results_are_newest_first() {
    let app = router_with(seeded_store(), Settings::default());
    let (_, body) = get_json(app, "/api/voicemails?limit=0").await;

    let records: Vec<VoicemailRecord> = serde_json::from_value(body["voicemails"].clone()).unwrap();
    let dated: Vec<_> = records.iter().filter_map(|r| r.timestamp).collect();
    assert!(dated.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(records.last().unwrap().id, "bare");
}

#[tokio::test]
async fn test_malformed_page_is_page_one() {
    let store = seeded_store();
    let (_, first) = get_json(
        router_with(store.clone(), Settings::default()),
        "/api/voicemails?page=1&limit=5",
    )
    .await;
    let (status, coerced) = get_json(
        router_with(store, Settings::default()),
        "/api/voicemails?page=abc&limit=5",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(coerced["page"], 1);
    assert_eq!(ids(&first), ids(&coerced));
}

#[tokio::test]
async fn test_bad_limit_uses_default() {
    let app = router_with(seeded_store(), Settings::default());
    let (status, body) = get_json(app, "/api/voicemails?limit=-4").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body).len(), 10);
    assert_eq!(body["totalPages"], 2);
}

#[tokio::test]
async fn test_zero_limit_returns_everything() {
    let app = router_with(seeded_store(), Settings::default());
    let (_, body) = get_json(app, "/api/voicemails?search=billing&limit=0").await;

    assert_eq!(body["total"], 12);
    assert_eq!(ids(&body).len(), 12);
    assert_eq!(body["totalPages"], 1);
}

#[tokio::test]
async fn test_page_past_the_end_is_empty() {
    let app = router_with(seeded_store(), Settings::default());
    let (status, body) = get_json(app, "/api/voicemails?page=9&limit=5").await;

    assert_eq!(status, StatusCode::OK);
    assert!(ids(&body).is_empty());
    assert_eq!(body["total"], 14);
    assert_eq!(body["totalPages"], 3);
}

#[tokio::test]
async fn test_repeated_page_keeps_search_and_limit() {
    let app = router_with(seeded_store(), Settings::default());
    let (status, body) = get_json(app, "/api/voicemails?search=roads&page=1&page=2&limit=5").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["page"], 1);
    assert_eq!(body["totalPages"], 1);
    assert_eq!(ids(&body), vec!["roads-1"]);
}

#[tokio::test]
async fn test_malformed_page_keeps_search_and_limit() {
    let app = router_with(seeded_store(), Settings::default());
    let (status, body) = get_json(app, "/api/voicemails?search=billing&page=%ZZ&limit=4").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 12);
    assert_eq!(body["page"], 1);
    assert_eq!(body["totalPages"], 3);
    assert_eq!(ids(&body).len(), 4);
}

#[tokio::test]
async fn test_insights_ignore_other_parameters() {
    let app = router_with(seeded_store(), Settings::default());
    let (status, body) = get_json(app, "/api/insights?search=roads&search=billing&page=x").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn test_huge_page_is_empty() {
    let store = seeded_store();

    for page in ["1000000000000000000", "99999999999999999999"] {
        let app = router_with(store.clone(), Settings::default());
        let (status, body) = get_json(app, &format!("/api/voicemails?page={page}&limit=10")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(ids(&body).is_empty());
        assert_eq!(body["total"], 14);
        assert_eq!(body["totalPages"], 2);
    }
}

#[tokio::test]
async fn test_storage_failure_is_500() {
    let app = router_with(Arc::new(UnavailableStore), Settings::default());
    let (status, body) = get_json(app, "/api/voicemails?search=billing").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, serde_json::json!({ "error": "Database error" }));
}

#[tokio::test]
async fn test_insights_endpoint() {
    let app = router_with(seeded_store(), Settings::default());
    let (status, body) = get_json(app, "/api/insights").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 14);
    assert_eq!(body["overall"]["positive"], 4);
    assert_eq!(body["overall"]["negative"], 5);
    assert_eq!(body["overall"]["neutral"], 5);
    assert_eq!(
        body["perCategory"]["Billing"],
        serde_json::json!({ "positive": 4, "negative": 4, "neutral": 4 })
    );
    assert_eq!(body["perCategory"]["Roads"]["negative"], 1);
    assert_eq!(body["perCategory"].as_object().unwrap().len(), 2);
}

#[tokio::test]
async fn test_insights_storage_failure() {
    let app = router_with(Arc::new(UnavailableStore), Settings::default());
    let (status, body) = get_json(app, "/api/insights").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Database error");
}

#[tokio::test]
async fn test_smoke_and_health() {
    let store = seeded_store();
    let (status, body) = get_json(router_with(store.clone(), Settings::default()), "/api/test").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Server works!");

    let (status, body) = get_json(router_with(store.clone(), Settings::default()), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, _) = get_json(router_with(store, Settings::default()), "/ready").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_ready_reports_unreachable_store() {
    let app = router_with(Arc::new(UnavailableStore), Settings::default());
    let (status, body) = get_json(app, "/ready").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unavailable");
}

#[tokio::test]
async fn test_workflow_not_configured() {
    let app = router_with(seeded_store(), Settings::default());
    let (status, body) = post_json(app, "/api/workflow/run").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "Workflow is not configured");
}

/// Serve `webhook` on an ephemeral port and return its URL
async fn spawn_webhook(webhook: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, webhook).await.unwrap();
    });
    format!("http://{addr}/webhook")
}

fn workflow_settings(url: String) -> Settings {
    let mut settings = Settings::default();
    settings.workflow.webhook_url = Some(url);
    settings.workflow.refresh_delay_ms = 10;
    settings.workflow.timeout_seconds = 5;
    settings
}

#[tokio::test]
async fn test_workflow_surfaces_ingested_records() {
    let store = seeded_store();

    // Stand-in for the automation: inserts a fresh voicemail, answers with a link
    let ingest = store.clone();
    let webhook = Router::new().route(
        "/webhook",
        post(move || {
            let ingest = ingest.clone();
            async move {
                ingest.insert(
                    VoicemailRecord::new("fresh")
                        .with_timestamp(Utc::now())
                        .with_category("Parks")
                        .with_sentiment("positive"),
                );
                Json(serde_json::json!({ "link": "https://sheets.example.com/report/1" }))
            }
        }),
    );
    let url = spawn_webhook(webhook).await;

    let app = router_with(store, workflow_settings(url));
    let (status, body) = post_json(app, "/api/workflow/run").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Workflow completed successfully!");
    assert_eq!(body["link"], "https://sheets.example.com/report/1");
    assert_eq!(body["total"], 15);
    assert_eq!(ids(&body)[0], "fresh");
}

#[tokio::test]
async fn test_workflow_without_link() {
    let webhook = Router::new().route("/webhook", post(|| async { "accepted" }));
    let url = spawn_webhook(webhook).await;

    let app = router_with(seeded_store(), workflow_settings(url));
    let (status, body) = post_json(app, "/api/workflow/run").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["link"].is_null());
}

#[tokio::test]
async fn test_workflow_upstream_failure_is_502() {
    let webhook = Router::new().route(
        "/webhook",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let url = spawn_webhook(webhook).await;

    let app = router_with(seeded_store(), workflow_settings(url));
    let (status, body) = post_json(app, "/api/workflow/run").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Something went wrong. Please try again.");
}
