//! Telemetry batching integration tests against a mock collector.

use std::time::Duration;

use botgate::{Engine, EngineConfig, NormalizedRequest};
use tokio::sync::mpsc;

mod common;

fn config_for(addr: std::net::SocketAddr) -> EngineConfig {
    let mut config = EngineConfig::new("bg-sk-test");
    config.api_url = format!("http://{addr}");
    config
}

fn browser_request(ip: &str) -> NormalizedRequest {
    let pairs = [
        ("user-agent", "Mozilla/5.0 (compatible; normal browser)"),
        ("accept", "text/html"),
        ("accept-language", "en-US"),
        ("accept-encoding", "gzip"),
    ];
    NormalizedRequest {
        ip: ip.to_string(),
        user_agent: "Mozilla/5.0 (compatible; normal browser)".to_string(),
        headers: pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        header_names: pairs.iter().map(|(k, _)| k.to_string()).collect(),
        path: "/".to_string(),
        method: "GET".to_string(),
    }
}

/// The mock also serves the rule-sync GET; skip until an export shows up.
async fn next_export(
    rx: &mut mpsc::UnboundedReceiver<common::CapturedRequest>,
) -> common::CapturedRequest {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let captured = rx.recv().await.expect("mock backend closed");
            if captured.path() == "/v1/fingerprints" {
                return captured;
            }
        }
    })
    .await
    .expect("no telemetry export observed")
}

fn events_of(captured: &common::CapturedRequest) -> Vec<serde_json::Value> {
    let body: serde_json::Value = serde_json::from_str(&captured.body).unwrap();
    body.get("events").unwrap().as_array().unwrap().clone()
}

#[tokio::test]
async fn test_full_buffer_forces_flush() {
    let (addr, mut captured) = common::start_capture_backend(200, "{}".to_string()).await;
    let mut config = config_for(addr);
    config.buffer_size = 3;
    config.flush_interval_secs = 60;
    let engine = Engine::new(config).unwrap();

    // Allowed traffic is reported too; telemetry coverage is total.
    engine.evaluate(&browser_request("10.0.0.1"));
    engine.evaluate(&browser_request("10.0.0.2"));
    engine.evaluate(&browser_request("10.0.0.3"));

    let export = next_export(&mut captured).await;
    assert_eq!(export.method(), "POST");
    assert!(export.has_header("authorization: Bearer bg-sk-test"));
    assert!(export.has_header("content-type: application/json"));

    let events = events_of(&export);
    assert_eq!(events.len(), 3);
    assert_eq!(events[0]["ip"], "10.0.0.1");
    assert!(events[0]["userAgent"].as_str().unwrap().contains("Mozilla"));
    assert!(events[0]["ts"].as_u64().unwrap() > 0);

    engine.shutdown().await;
}

#[tokio::test]
async fn test_timer_driven_flush() {
    let (addr, mut captured) = common::start_capture_backend(200, "{}".to_string()).await;
    let mut config = config_for(addr);
    config.buffer_size = 100;
    config.flush_interval_secs = 1;
    let engine = Engine::new(config).unwrap();

    engine.evaluate(&browser_request("10.0.0.1"));
    engine.evaluate(&browser_request("10.0.0.2"));

    let export = next_export(&mut captured).await;
    assert_eq!(events_of(&export).len(), 2);

    engine.shutdown().await;
}

#[tokio::test]
async fn test_disabled_telemetry_reports_nothing() {
    let (addr, mut captured) = common::start_capture_backend(200, "{}".to_string()).await;
    let mut config = config_for(addr);
    config.telemetry = false;
    config.buffer_size = 1;
    config.flush_interval_secs = 1;
    let engine = Engine::new(config).unwrap();

    engine.evaluate(&browser_request("10.0.0.1"));
    engine.evaluate(&browser_request("10.0.0.2"));
    tokio::time::sleep(Duration::from_millis(1500)).await;

    engine.shutdown().await;

    // Only rule-sync traffic may have reached the mock.
    while let Ok(request) = captured.try_recv() {
        assert_ne!(request.path(), "/v1/fingerprints");
    }
}

#[tokio::test]
async fn test_failed_flush_drops_batch_without_retry() {
    let (addr, mut captured) = common::start_capture_backend(500, String::new()).await;
    let mut config = config_for(addr);
    config.buffer_size = 2;
    config.flush_interval_secs = 60;
    let engine = Engine::new(config).unwrap();

    engine.evaluate(&browser_request("10.0.0.1"));
    engine.evaluate(&browser_request("10.0.0.2"));
    let first = next_export(&mut captured).await;
    assert_eq!(events_of(&first).len(), 2);

    // The rejected batch is gone; the next export carries only new events.
    engine.evaluate(&browser_request("10.0.0.3"));
    engine.evaluate(&browser_request("10.0.0.4"));
    let second = next_export(&mut captured).await;
    let events = events_of(&second);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["ip"], "10.0.0.3");

    engine.shutdown().await;
}
