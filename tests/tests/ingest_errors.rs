//! Tests for request rejection and lookup errors.
//!
//! Invalid submissions return 422 with VALID_001 and never create an
//! ingestion; unknown or malformed ids return 404 with NOT_FOUND.

use axum::http::StatusCode;
use axum_test::TestServer;
use engine_core::IngestionId;
use integration_tests::{fixtures, setup::TestContext};
use serde_json::Value;

/// Every invalid payload is rejected with VALID_001
#[tokio::test]
async fn test_invalid_payloads_return_422() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    for (label, payload) in fixtures::invalid_payloads() {
        let response = server.post("/ingest").json(&payload).await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["code"], "VALID_001", "Expected VALID_001 for {}", label);
    }

    assert_eq!(ctx.service.ingestion_count(), 0);
    assert_eq!(ctx.service.queue_depth(), 0);
}

/// Malformed JSON is a validation error, not a 400
#[tokio::test]
async fn test_malformed_json_returns_422() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/ingest")
        .content_type("application/json")
        .bytes("{\"ids\": [1, 2".into())
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["code"], "VALID_001");
}

/// Boundary identifiers are accepted
#[tokio::test]
async fn test_boundary_ids_accepted() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/ingest")
        .json(&fixtures::ingest_payload(&[1, 1_000_000_007], "MEDIUM"))
        .await;
    response.assert_status_ok();
}

/// Unknown ingestion id returns NOT_FOUND
#[tokio::test]
async fn test_unknown_ingestion_returns_404() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.get(&format!("/status/{}", IngestionId::new())).await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["code"], "NOT_FOUND");
}

/// A non-uuid id is simply not found
#[tokio::test]
async fn test_malformed_ingestion_id_returns_404() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.get("/status/nonexistent").await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["code"], "NOT_FOUND");
}
