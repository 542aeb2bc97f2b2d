//! HTTP surface tests: routing endpoint, liveness and admin auth.

use std::net::SocketAddr;
use std::sync::Arc;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use backend_router::config::RouterConfig;
use backend_router::lifecycle::Shutdown;
use backend_router::registry::BackendKind;
use backend_router::HttpServer;

mod common;
use common::{backend, router, MockBackend};

const ADMIN_KEY: &str = "test-admin-key";

async fn start_server() -> (SocketAddr, Shutdown) {
    let router = Arc::new(router(vec![
        (backend("primary", BackendKind::OpenAi, 1, 100), MockBackend::failing("primary down")),
        (backend("secondary", BackendKind::Anthropic, 2, 100), MockBackend::ok("hello from secondary")),
    ]));

    let mut config = RouterConfig::default();
    config.admin.api_key = ADMIN_KEY.to_string();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(router, config);
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        server.run(listener, rx).await.unwrap();
    });

    (addr, shutdown)
}

#[tokio::test]
async fn test_liveness() {
    let (addr, shutdown) = start_server().await;
    let client = reqwest::Client::new();

    let res = client.get(format!("http://{}/health", addr)).send().await.unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "operational");
    assert_eq!(body["total_backends"], 2);

    shutdown.trigger();
}

#[tokio::test]
async fn test_route_falls_back_over_http() {
    let (addr, shutdown) = start_server().await;
    let client = reqwest::Client::new();
    let request_id = "6f1c2a7e-8d4b-4c1a-9e0f-2b3c4d5e6f70";

    let res = client
        .post(format!("http://{}/v1/route", addr))
        .header("x-request-id", request_id)
        .json(&json!({ "prompt": "hi" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["backend"], "secondary");
    assert_eq!(body["content"], "hello from secondary");
    assert_eq!(body["request_id"], request_id);
    assert_eq!(body["attempts"][0]["backend"], "primary");
    assert_eq!(body["attempts"][0]["outcome"], "failed");
    assert_eq!(body["attempts"][1]["outcome"], "succeeded");

    shutdown.trigger();
}

#[tokio::test]
async fn test_route_without_capable_backend_is_unavailable() {
    let (addr, shutdown) = start_server().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("http://{}/v1/route", addr))
        .json(&json!({ "prompt": "hi", "capabilities": ["teleportation"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 503);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "failure");
    assert_eq!(body["kind"], "no_eligible_backend");

    shutdown.trigger();
}

#[tokio::test]
async fn test_admin_requires_bearer_key() {
    let (addr, shutdown) = start_server().await;
    let client = reqwest::Client::new();
    let url = format!("http://{}/admin/status", addr);

    let res = client.get(&url).send().await.unwrap();
    assert_eq!(res.status(), 401);

    let res = client.get(&url).bearer_auth("wrong").send().await.unwrap();
    assert_eq!(res.status(), 401);

    let res = client.get(&url).bearer_auth(ADMIN_KEY).send().await.unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["total_backends"], 2);
    assert_eq!(body["backends"][0]["name"], "primary");

    shutdown.trigger();
}

#[tokio::test]
async fn test_admin_backend_lookup_and_select() {
    let (addr, shutdown) = start_server().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("http://{}/admin/backends/secondary", addr))
        .bearer_auth(ADMIN_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["tier"], 2);

    let res = client
        .get(format!("http://{}/admin/backends/missing", addr))
        .bearer_auth(ADMIN_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    let res = client
        .post(format!("http://{}/admin/select", addr))
        .bearer_auth(ADMIN_KEY)
        .json(&json!({ "mode": "capability", "capabilities": ["long-context"] }))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["backend"], "secondary");

    shutdown.trigger();
}

#[tokio::test]
async fn test_admin_benchmark() {
    let (addr, shutdown) = start_server().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("http://{}/admin/benchmark", addr))
        .bearer_auth(ADMIN_KEY)
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["primary"]["success"], false);
    assert_eq!(body["secondary"]["success"], true);

    shutdown.trigger();
}
