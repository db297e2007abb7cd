// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::helpers::memory_queue::MemoryQueue;
use super::helpers::memory_store::MemorySubscriptionStore;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum_test::TestServer;
use crawlgraph::presentation::routes;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

struct TestApp {
    server: TestServer,
    queue: Arc<MemoryQueue>,
    subscriptions: Arc<MemorySubscriptionStore>,
}

fn test_app() -> TestApp {
    let queue = Arc::new(MemoryQueue::new());
    let subscriptions = Arc::new(MemorySubscriptionStore::new());
    let server = TestServer::new(routes::app(queue.clone(), subscriptions.clone())).unwrap();
    TestApp {
        server,
        queue,
        subscriptions,
    }
}

/// 健康检查测试
#[tokio::test]
async fn health_check_works() {
    let app = test_app();

    let response = app.server.get("/health").await;

    response.assert_status_ok();
    response.assert_text("OK");
}

/// 版本端点不依赖任何注入的组件
#[tokio::test]
async fn version_route_works_without_extensions() {
    let response = routes::routes()
        .oneshot(
            Request::builder()
                .uri("/v1/version")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_crawl_enqueues_root_task() {
    let app = test_app();

    let response = app
        .server
        .post("/v1/crawl")
        .json(&json!({
            "RootURL": "https://example.com/",
            "CrawlID": "crawl-1"
        }))
        .await;

    response.assert_status(StatusCode::ACCEPTED);
    let body: Value = response.json();
    assert_eq!(body["URL"], "https://example.com/");
    assert_eq!(body["CrawlID"], "crawl-1");
    assert_eq!(body["Depth"], 1);

    let pending = app.queue.pending_tasks();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].crawl_id, "crawl-1");
    assert_eq!(pending[0].depth, 1);
}

#[tokio::test]
async fn create_crawl_without_root_is_bad_request() {
    let app = test_app();

    let response = app
        .server
        .post("/v1/crawl")
        .json(&json!({ "CrawlID": "crawl-1" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("RootURL"));
    assert!(app.queue.pending_tasks().is_empty());
}

#[tokio::test]
async fn subscribe_then_disconnect() {
    let app = test_app();

    let response = app
        .server
        .post("/v1/subscriptions")
        .json(&json!({
            "CrawlID": "crawl-1",
            "ConnectionID": "conn-1",
            "DeliveryEndpoint": "https://push.example.com/prod"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["ConnectionID"], "conn-1");
    assert_eq!(app.subscriptions.connection_ids(), vec!["conn-1".to_string()]);

    let response = app.server.delete("/v1/subscriptions/conn-1").await;

    response.assert_status(StatusCode::NO_CONTENT);
    assert!(app.subscriptions.connection_ids().is_empty());
}

#[tokio::test]
async fn subscribe_with_invalid_endpoint_is_bad_request() {
    let app = test_app();

    let response = app
        .server
        .post("/v1/subscriptions")
        .json(&json!({
            "CrawlID": "crawl-1",
            "ConnectionID": "conn-1",
            "DeliveryEndpoint": "not a url"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(app.subscriptions.connection_ids().is_empty());
}

#[tokio::test]
async fn registry_outage_is_service_unavailable() {
    let app = test_app();
    app.subscriptions.set_unavailable(true);

    let response = app.server.delete("/v1/subscriptions/conn-1").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
}
