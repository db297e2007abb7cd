// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::memory_queue::MemoryQueue;
use super::helpers::memory_store::{MemoryRelationshipStore, MemorySubscriptionStore};
use super::helpers::{pipeline, propagator};
use crawlgraph::application::dto::crawl_request::CrawlRequestDto;
use crawlgraph::application::use_cases::crawl_use_case::CrawlUseCase;
use crawlgraph::domain::models::subscription::Subscription;
use crawlgraph::domain::repositories::subscription_repository::SubscriptionRepository;
use crawlgraph::domain::services::crawl_pipeline::{ClaimMode, PipelineConfig};
use crawlgraph::workers::change_feed_worker::ChangeFeedWorker;
use crawlgraph::workers::crawl_worker::CrawlWorker;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_page(server: &MockServer, page: &str, html: &str, hits: u64) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html.to_string(), "text/html"))
        .expect(hits)
        .mount(server)
        .await;
}

/// 运行爬取工作器直到队列耗尽
async fn drain(worker: &CrawlWorker, queue: &MemoryQueue) -> usize {
    let mut processed = 0;
    while worker.process_next().await.unwrap() {
        processed += 1;
    }
    assert!(queue.pending_tasks().is_empty());
    assert_eq!(queue.in_flight_len(), 0);
    processed
}

async fn start(queue: Arc<MemoryQueue>, root_url: &str, crawl_id: &str) {
    CrawlUseCase::new(queue)
        .start_crawl(CrawlRequestDto {
            root_url: root_url.to_string(),
            crawl_id: crawl_id.to_string(),
        })
        .await
        .unwrap();
}

/// 完整的爬取流程：抓取、记录链接图、推送变更并回收失效订阅
#[tokio::test]
async fn crawl_records_graph_and_pushes_changes() {
    let site = MockServer::start().await;
    mount_page(
        &site,
        "/",
        r##"<a href="/a">A</a><a href="/b#frag">B</a><a href="https://other.example.org/x">X</a><a href="#top">top</a>"##,
        1,
    )
    .await;
    mount_page(&site, "/a", r#"<a href="/">home</a><a href="/b">B</a>"#, 1).await;
    mount_page(&site, "/b", "<p>leaf</p>", 1).await;

    let push = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/@connections/conn-live"))
        .respond_with(ResponseTemplate::new(200))
        .expect(3)
        .mount(&push)
        .await;
    Mock::given(method("POST"))
        .and(path("/@connections/conn-gone"))
        .respond_with(ResponseTemplate::new(410))
        .expect(1)
        .mount(&push)
        .await;

    let store = Arc::new(MemoryRelationshipStore::new());
    let subscriptions = Arc::new(MemorySubscriptionStore::new());
    let queue = Arc::new(MemoryQueue::new());

    for connection_id in ["conn-gone", "conn-live"] {
        subscriptions
            .put(&Subscription::new("crawl-1", connection_id, push.uri()))
            .await
            .unwrap();
    }
    subscriptions
        .put(&Subscription::new("crawl-other", "conn-elsewhere", push.uri()))
        .await
        .unwrap();

    let root = format!("{}/", site.uri());
    start(queue.clone(), &root, "crawl-1").await;

    let worker = CrawlWorker::new(
        pipeline(
            store.clone(),
            queue.clone(),
            PipelineConfig {
                max_depth: 3,
                claim_mode: ClaimMode::LookThenWrite,
            },
        ),
        queue.clone(),
        Duration::from_millis(10),
    );

    // 根页面、两个深度2页面，以及两个被去重的深度3任务
    assert_eq!(drain(&worker, &queue).await, 5);

    let root_record = store.get("crawl-1", &root).unwrap();
    assert_eq!(
        root_record.child_urls,
        vec![
            format!("{}/a", site.uri()),
            format!("{}/b#frag", site.uri()),
        ]
    );
    let a_record = store.get("crawl-1", &format!("{}/a", site.uri())).unwrap();
    assert_eq!(
        a_record.child_urls,
        vec![root.clone(), format!("{}/b", site.uri())]
    );
    assert!(store
        .get("crawl-1", &format!("{}/b", site.uri()))
        .unwrap()
        .child_urls
        .is_empty());
    assert_eq!(store.len(), 3);

    let feed_worker = ChangeFeedWorker::new(
        store.clone(),
        propagator(subscriptions.clone(), Some("secret")),
        10,
        Duration::from_millis(10),
    );
    assert_eq!(feed_worker.process_pending().await.unwrap(), 3);
    assert_eq!(store.pending_events(), 0);

    assert_eq!(
        subscriptions.connection_ids(),
        vec!["conn-elsewhere".to_string(), "conn-live".to_string()]
    );

    let requests = push.received_requests().await.unwrap();
    let parents: HashSet<String> = requests
        .iter()
        .filter(|r| r.url.path() == "/@connections/conn-live")
        .map(|r| {
            let body: serde_json::Value = serde_json::from_slice(&r.body).unwrap();
            assert_eq!(body["CrawlID"], "crawl-1");
            body["ParentURL"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(parents.len(), 3);
    assert!(parents.contains(&root));
}

/// 达到最大深度的页面仍记录子链接，但不再扇出
#[tokio::test]
async fn pages_at_max_depth_are_recorded_but_not_expanded() {
    let site = MockServer::start().await;
    mount_page(&site, "/", r#"<a href="/a">A</a><a href="/b">B</a>"#, 1).await;

    let store = Arc::new(MemoryRelationshipStore::new());
    let queue = Arc::new(MemoryQueue::new());
    let root = format!("{}/", site.uri());
    start(queue.clone(), &root, "crawl-shallow").await;

    let worker = CrawlWorker::new(
        pipeline(
            store.clone(),
            queue.clone(),
            PipelineConfig {
                max_depth: 1,
                claim_mode: ClaimMode::Conditional,
            },
        ),
        queue.clone(),
        Duration::from_millis(10),
    );

    assert_eq!(drain(&worker, &queue).await, 1);
    assert_eq!(
        store.get("crawl-shallow", &root).unwrap().child_urls.len(),
        2
    );
    assert_eq!(queue.batch_sizes(), vec![1]);
}

/// 抓取失败的页面被确认丢弃，不写入任何记录
#[tokio::test]
async fn unreachable_page_is_dropped() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&site)
        .await;

    let store = Arc::new(MemoryRelationshipStore::new());
    let queue = Arc::new(MemoryQueue::new());
    start(queue.clone(), &format!("{}/missing", site.uri()), "crawl-404").await;

    let worker = CrawlWorker::new(
        pipeline(
            store.clone(),
            queue.clone(),
            PipelineConfig {
                max_depth: 3,
                claim_mode: ClaimMode::LookThenWrite,
            },
        ),
        queue.clone(),
        Duration::from_millis(10),
    );

    assert_eq!(drain(&worker, &queue).await, 1);
    assert_eq!(store.len(), 0);
    assert_eq!(store.pending_events(), 0);
}

/// 页面链接很多时按每批10条分发
#[tokio::test]
async fn wide_pages_fan_out_in_batches_of_ten() {
    let links: String = (0..23)
        .map(|i| format!(r#"<a href="/p{}">{}</a>"#, i, i))
        .collect();
    let site = MockServer::start().await;
    mount_page(&site, "/", &links, 1).await;

    let store = Arc::new(MemoryRelationshipStore::new());
    let queue = Arc::new(MemoryQueue::new());
    start(queue.clone(), &format!("{}/", site.uri()), "crawl-wide").await;

    let worker = CrawlWorker::new(
        pipeline(
            store.clone(),
            queue.clone(),
            PipelineConfig {
                max_depth: 3,
                claim_mode: ClaimMode::LookThenWrite,
            },
        ),
        queue.clone(),
        Duration::from_millis(10),
    );

    assert!(worker.process_next().await.unwrap());
    assert_eq!(queue.batch_sizes(), vec![1, 10, 10, 3]);

    let children = queue.pending_tasks();
    assert_eq!(children.len(), 23);
    assert!(children
        .iter()
        .all(|t| t.depth == 2 && t.crawl_id == "crawl-wide"));
    assert_eq!(children[0].url, format!("{}/p0", site.uri()));
    assert_eq!(children[22].url, format!("{}/p22", site.uri()));
}
