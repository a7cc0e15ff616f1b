//! End-to-end tests for the ingestion pipeline.
//!
//! POST /ingest → queue → worker → RecordingDownstream, then GET /status.
//! The RecordingDownstream implements the same Downstream trait as the
//! simulator, so every production code path runs except the simulated
//! latency.

use axum_test::TestServer;
use engine_core::IngestionId;
use integration_tests::mocks::RecordingDownstream;
use integration_tests::{fixtures, setup::TestContext, setup::TEST_BATCH_INTERVAL};
use serde_json::Value;
use std::time::{Duration, Instant};

const TIMEOUT: Duration = Duration::from_secs(10);

async fn submit(server: &TestServer, ids: &[u64], priority: &str) -> IngestionId {
    let response = server
        .post("/ingest")
        .json(&fixtures::ingest_payload(ids, priority))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    body["ingestion_id"]
        .as_str()
        .expect("ingestion_id should be a string")
        .parse()
        .expect("ingestion_id should be a uuid")
}

/// Seven identifiers run as batches of 3, 3 and 1, in order
#[tokio::test]
async fn test_ingest_seven_ids_e2e() {
    let mut ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let ids = fixtures::sequential_ids(7);
    let id = submit(&server, &ids, "HIGH").await;

    let start = Instant::now();
    ctx.start_workers();
    ctx.wait_for_completion(id, TIMEOUT).await;

    // Two inter-batch waits for three batches
    assert!(start.elapsed() >= TEST_BATCH_INTERVAL * 2);
    assert_eq!(ctx.downstream.calls(), ids);

    let response = server.get(&format!("/status/{}", id)).await;
    response.assert_status_ok();
    let body: Value = response.json();

    assert_eq!(body["ingestion_id"], id.to_string());
    assert_eq!(body["status"], "completed");

    let batches = body["batches"].as_array().expect("batches array");
    let sizes: Vec<usize> = batches
        .iter()
        .map(|b| b["ids"].as_array().unwrap().len())
        .collect();
    assert_eq!(sizes, vec![3, 3, 1]);
    assert!(batches.iter().all(|b| b["status"] == "completed"));
    assert!(batches.iter().all(|b| b.get("failures").is_none()));
}

/// A failing identifier is recorded but its batch still completes
#[tokio::test]
async fn test_downstream_failure_recorded_e2e() {
    let mut ctx = TestContext::new();
    ctx.downstream.fail_on([5]);
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let id = submit(&server, &[1, 2, 3, 4, 5, 6], "MEDIUM").await;
    ctx.start_workers();
    ctx.wait_for_completion(id, TIMEOUT).await;

    let body: Value = server.get(&format!("/status/{}", id)).await.json();
    assert_eq!(body["status"], "completed");

    let second = &body["batches"][1];
    assert_eq!(second["status"], "completed");
    assert_eq!(second["failures"][0]["id"], 5);
    assert_eq!(second["failures"].as_array().unwrap().len(), 1);

    // Every identifier was attempted
    assert_eq!(ctx.downstream.call_count(), 6);
}

/// HIGH submitted after LOW is still dispatched first
#[tokio::test]
async fn test_priority_ordering_e2e() {
    let mut ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let low = submit(&server, &[1, 2, 3, 4], "LOW").await;
    let high = submit(&server, &[100, 101, 102, 103], "HIGH").await;

    ctx.start_workers();
    ctx.wait_for_completion(high, TIMEOUT).await;
    ctx.wait_for_completion(low, TIMEOUT).await;

    let calls = ctx.downstream.calls();
    assert_eq!(calls.len(), 8);
    assert_eq!(&calls[..3], &[100, 101, 102]);
}

/// Triggered while a batch runs, back to yet_to_start while waiting for the next
#[tokio::test]
async fn test_status_during_and_between_batches_e2e() {
    let config = worker::WorkerConfig {
        batch_interval: Duration::from_millis(500),
        concurrency: 1,
        metrics_interval: Duration::from_secs(60),
    };
    let downstream = RecordingDownstream::with_latency(Duration::from_millis(100));
    let mut ctx = TestContext::with_downstream(config, downstream);
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let id = submit(&server, &[1, 2, 3, 4], "HIGH").await;
    ctx.start_workers();

    // First call done, two more in the same batch still to go
    wait_for_calls(&ctx, 1).await;
    let body: Value = server.get(&format!("/status/{}", id)).await.json();
    assert_eq!(body["status"], "triggered");
    assert_eq!(body["batches"][0]["status"], "triggered");

    wait_for_calls(&ctx, 3).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let body: Value = server.get(&format!("/status/{}", id)).await.json();
    assert_eq!(body["status"], "yet_to_start");
    assert_eq!(body["batches"][0]["status"], "completed");
    assert_eq!(body["batches"][1]["status"], "yet_to_start");

    ctx.wait_for_completion(id, TIMEOUT).await;
}

async fn wait_for_calls(ctx: &TestContext, n: usize) {
    tokio::time::timeout(TIMEOUT, async {
        while ctx.downstream.call_count() < n {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("downstream calls should happen");
}

/// Reading a finished ingestion twice returns the same report
#[tokio::test]
async fn test_status_reads_are_idempotent_e2e() {
    let mut ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let id = submit(&server, &[9, 8, 7], "LOW").await;
    ctx.start_workers();
    ctx.wait_for_completion(id, TIMEOUT).await;

    let first: Value = server.get(&format!("/status/{}", id)).await.json();
    let second: Value = server.get(&format!("/status/{}", id)).await.json();
    assert_eq!(first, second);
    assert_eq!(first["priority"], "LOW");
}
