// SPDX-FileCopyrightText: 2026 Fallio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end gateway tests against a real bound server and a temp
//! database. No provider key is configured anywhere, so generation
//! attempts fail locally with missing-credential reasons and never
//! touch the network.

use std::sync::Arc;
use std::time::Instant;

use fallio_config::FallioConfig;
use fallio_gateway::{GatewayState, build_router};
use fallio_storage::Database;

async fn spawn_gateway(bearer_token: Option<&str>) -> (String, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("gw.db").to_str().unwrap())
        .await
        .unwrap();

    let mut config = FallioConfig::default();
    config.server.bearer_token = bearer_token.map(|s| s.to_string());

    let state = GatewayState {
        db,
        config: Arc::new(config),
        start_time: Instant::now(),
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), dir)
}

#[tokio::test]
async fn health_is_public() {
    let (base, _dir) = spawn_gateway(Some("cron-secret")).await;

    let resp = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn trigger_endpoints_require_the_bearer_token() {
    let (base, _dir) = spawn_gateway(Some("cron-secret")).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/v1/cron/fortunes"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = client
        .post(format!("{base}/v1/cron/fortunes"))
        .bearer_auth("wrong")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = client
        .post(format!("{base}/v1/cron/fortunes"))
        .bearer_auth("cron-secret")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["processed"], 0);
}

#[tokio::test]
async fn generate_with_no_credentials_aggregates_all_reasons() {
    let (base, _dir) = spawn_gateway(None).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/v1/fortunes/generate"))
        .json(&serde_json::json!({
            "fortune_type": "tarot",
            "zodiac_sign": "Aries",
            "user_note": "will I get the job?",
            "language": "en"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);

    let body: serde_json::Value = resp.json().await.unwrap();
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("gemini API key is not configured"), "got: {error}");
    assert!(error.contains("openai API key is not configured"), "got: {error}");
    assert!(error.contains("claude API key is not configured"), "got: {error}");
}

#[tokio::test]
async fn horoscope_trigger_reports_per_unit_failures_as_data() {
    let (base, _dir) = spawn_gateway(None).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/v1/cron/horoscopes?scope=daily"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    let processed = body["processed"].as_array().unwrap();
    assert_eq!(processed.len(), 1);
    assert_eq!(processed[0]["scope"], "daily");
    assert_eq!(processed[0]["status"], "error");
    assert!(
        processed[0]["error"]
            .as_str()
            .unwrap()
            .contains("API key is not configured")
    );
}

#[tokio::test]
async fn unknown_horoscope_scope_is_a_bad_request() {
    let (base, _dir) = spawn_gateway(None).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/v1/cron/horoscopes?scope=yearly"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn model_catalog_serves_fallback_lists_without_keys() {
    let (base, _dir) = spawn_gateway(None).await;

    let resp = reqwest::get(format!("{base}/v1/models")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["gemini"].as_array().unwrap().len() >= 3);
    assert!(body["openai"].as_array().unwrap().len() >= 3);
    assert!(body["claude"].as_array().unwrap().len() >= 3);
}
