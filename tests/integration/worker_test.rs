// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::memory_queue::MemoryQueue;
use super::helpers::memory_store::{MemoryRelationshipStore, MemorySubscriptionStore};
use super::helpers::{pipeline, propagator};
use crawlgraph::domain::models::link_relationship::LinkRelationship;
use crawlgraph::domain::models::subscription::Subscription;
use crawlgraph::domain::repositories::link_relationship_repository::LinkRelationshipRepository;
use crawlgraph::domain::repositories::subscription_repository::SubscriptionRepository;
use crawlgraph::domain::services::crawl_pipeline::{ClaimMode, PipelineConfig};
use crawlgraph::workers::change_feed_worker::ChangeFeedWorker;
use crawlgraph::workers::crawl_worker::CrawlWorker;
use crawlgraph::workers::manager::WorkerManager;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config() -> PipelineConfig {
    PipelineConfig {
        max_depth: 2,
        claim_mode: ClaimMode::LookThenWrite,
    }
}

#[tokio::test]
async fn store_outage_releases_message_for_redelivery() {
    let store = Arc::new(MemoryRelationshipStore::new());
    store.set_unavailable(true);
    let queue = Arc::new(MemoryQueue::new());
    queue.push_raw(
        "httpsexamplecom",
        r#"{"URL":"https://example.com/","CrawlID":"crawl-1","Depth":1}"#,
    );

    let worker = CrawlWorker::new(
        pipeline(store.clone(), queue.clone(), config()),
        queue.clone(),
        Duration::from_millis(10),
    );

    assert!(!worker.process_next().await.unwrap());

    let pending = queue.pending_tasks();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].url, "https://example.com/");
    assert_eq!(queue.in_flight_len(), 0);
    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn undecodable_message_is_acknowledged() {
    let store = Arc::new(MemoryRelationshipStore::new());
    let queue = Arc::new(MemoryQueue::new());
    queue.push_raw("garbage", "this is not a task");

    let worker = CrawlWorker::new(
        pipeline(store.clone(), queue.clone(), config()),
        queue.clone(),
        Duration::from_millis(10),
    );

    assert!(worker.process_next().await.unwrap());
    assert!(queue.pending_tasks().is_empty());
    assert_eq!(queue.in_flight_len(), 0);
    assert!(!worker.process_next().await.unwrap());
}

#[tokio::test]
async fn registry_outage_leaves_events_for_retry() {
    let push = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&push)
        .await;

    let store = Arc::new(MemoryRelationshipStore::new());
    let subscriptions = Arc::new(MemorySubscriptionStore::new());
    subscriptions
        .put(&Subscription::new("crawl-1", "conn-1", push.uri()))
        .await
        .unwrap();

    for page in ["https://example.com/", "https://example.com/a"] {
        store
            .save(&LinkRelationship::new("crawl-1", page, vec![]))
            .await
            .unwrap();
    }

    let worker = ChangeFeedWorker::new(
        store.clone(),
        propagator(subscriptions.clone(), None),
        10,
        Duration::from_millis(10),
    );

    subscriptions.set_unavailable(true);
    assert_eq!(worker.process_pending().await.unwrap(), 0);
    assert_eq!(store.pending_events(), 2);

    subscriptions.set_unavailable(false);
    assert_eq!(worker.process_pending().await.unwrap(), 2);
    assert_eq!(store.pending_events(), 0);
    assert_eq!(worker.process_pending().await.unwrap(), 0);
}

#[tokio::test]
async fn manager_runs_workers_until_shutdown() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>empty</p>", "text/html"))
        .mount(&site)
        .await;

    let store = Arc::new(MemoryRelationshipStore::new());
    let queue = Arc::new(MemoryQueue::new());
    queue.push_raw(
        "root",
        &format!(r#"{{"URL":"{}/","CrawlID":"crawl-1","Depth":1}}"#, site.uri()),
    );

    let mut manager = WorkerManager::new();
    manager.spawn(Arc::new(CrawlWorker::new(
        pipeline(store.clone(), queue.clone(), config()),
        queue.clone(),
        Duration::from_millis(10),
    )));
    assert_eq!(manager.len(), 1);

    let mut waited = Duration::ZERO;
    while store.len() == 0 && waited < Duration::from_secs(5) {
        tokio::time::sleep(Duration::from_millis(20)).await;
        waited += Duration::from_millis(20);
    }
    manager.shutdown();

    assert_eq!(store.len(), 1);
    assert!(store
        .get("crawl-1", &format!("{}/", site.uri()))
        .is_some());
}
