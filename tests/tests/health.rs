//! Tests for the banner and health check endpoints.

use axum::http::StatusCode;
use axum_test::TestServer;
use integration_tests::setup::TestContext;

/// GET / returns the welcome banner
#[tokio::test]
async fn test_root_banner() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.get("/").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Welcome to the Data Ingestion API");
}

/// Test /health endpoint returns proper structure
#[tokio::test]
async fn test_health_endpoint_structure() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    for field in ["status", "workers_running", "queue_depth", "ingestions"] {
        assert!(
            body.get(field).is_some(),
            "Response should have '{}' field",
            field
        );
    }
}

/// Queued submissions show up in the health report
#[tokio::test]
async fn test_health_reports_queue_depth() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    ctx.service
        .submit(&[1, 2, 3], engine_core::Priority::Low)
        .expect("submit");

    let body: serde_json::Value = server.get("/health").await.json();
    assert_eq!(body["queue_depth"], 1);
    assert_eq!(body["ingestions"], 1);
}

/// Readiness does not depend on workers
#[tokio::test]
async fn test_ready_endpoint() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    server.get("/health/ready").await.assert_status(StatusCode::OK);
}

/// Liveness follows the worker pool
#[tokio::test]
async fn test_live_endpoint_after_workers_start() {
    let mut ctx = TestContext::new();
    ctx.start_workers();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    server.get("/health/live").await.assert_status(StatusCode::OK);

    let body: serde_json::Value = server.get("/health").await.json();
    assert_eq!(body["workers_running"], true);
    assert_eq!(body["status"], "healthy");
}
