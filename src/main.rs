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

use crawlgraph::config::settings::Settings;
use crawlgraph::domain::repositories::change_feed_repository::ChangeFeedRepository;
use crawlgraph::domain::repositories::link_relationship_repository::LinkRelationshipRepository;
use crawlgraph::domain::repositories::subscription_repository::SubscriptionRepository;
use crawlgraph::domain::services::change_propagator::{ChangePropagator, PropagatorConfig};
use crawlgraph::domain::services::crawl_pipeline::{CrawlPipeline, PipelineConfig};
use crawlgraph::domain::services::link_extractor::{HtmlLinkExtractor, LinkExtractor};
use crawlgraph::domain::services::push_channel::PushChannel;
use crawlgraph::engines::reqwest_engine::ReqwestEngine;
use crawlgraph::infrastructure::cache::redis_client::RedisClient;
use crawlgraph::infrastructure::database::connection;
use crawlgraph::infrastructure::repositories::change_feed_repo_impl::ChangeFeedRepoImpl;
use crawlgraph::infrastructure::repositories::link_relationship_repo_impl::LinkRelationshipRepoImpl;
use crawlgraph::infrastructure::repositories::subscription_repo_impl::SubscriptionRepoImpl;
use crawlgraph::infrastructure::services::http_push_channel::HttpPushChannel;
use crawlgraph::presentation::routes;
use crawlgraph::queue::dispatch::DispatchQueue;
use crawlgraph::queue::task_queue::{RedisTaskQueue, TaskQueue};
use crawlgraph::workers::change_feed_worker::ChangeFeedWorker;
use crawlgraph::workers::crawl_worker::CrawlWorker;
use crawlgraph::workers::manager::WorkerManager;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info};

use crawlgraph::utils::telemetry;
use migration::{Migrator, MigratorTrait};

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting crawlgraph...");

    // 2. Load configuration
    let settings = Arc::new(Settings::new()?);
    info!("Configuration loaded");

    if settings.metrics.enabled {
        crawlgraph::infrastructure::metrics::init_metrics(&settings.metrics.listen_addr)?;
    }

    // 3. Connect to database
    let db = connection::create_pool(&settings.database).await?;
    let db = Arc::new(db);
    info!("Database connection established");

    // Run database migrations
    info!("Running database migrations...");
    Migrator::up(db.as_ref(), None).await?;
    info!("Database migrations applied");

    // 4. Initialize Redis Client and queue
    let redis_client = RedisClient::new(&settings.redis.url).await?;
    redis_client.ping().await?;
    info!("Redis client initialized");

    let queue = Arc::new(RedisTaskQueue::new(redis_client, &settings.crawl.queue_name));
    let requeued = queue.requeue_in_flight().await?;
    info!("Dispatch queue ready, {} in-flight messages requeued", requeued);

    // 5. Initialize Components
    let relationships: Arc<dyn LinkRelationshipRepository> =
        Arc::new(LinkRelationshipRepoImpl::new(db.clone()));
    let subscriptions: Arc<dyn SubscriptionRepository> =
        Arc::new(SubscriptionRepoImpl::new(db.clone()));
    let change_feed: Arc<dyn ChangeFeedRepository> = Arc::new(ChangeFeedRepoImpl::new(db.clone()));

    let http_client = reqwest::Client::builder()
        .user_agent(settings.crawl.user_agent.clone())
        .build()?;

    let engine = Arc::new(ReqwestEngine::new(http_client.clone()));
    let extractor: Arc<dyn LinkExtractor> = Arc::new(HtmlLinkExtractor::new(
        engine,
        Duration::from_secs(settings.crawl.fetch_timeout_secs),
        settings.crawl.user_agent.clone(),
    ));

    let pipeline = Arc::new(CrawlPipeline::new(
        relationships,
        extractor,
        queue.clone(),
        PipelineConfig {
            max_depth: settings.crawl.max_depth,
            claim_mode: settings.crawl.claim_mode,
        },
    ));

    let channel: Arc<dyn PushChannel> = Arc::new(HttpPushChannel::new(
        http_client,
        settings.propagation.signing_secret.clone(),
        Duration::from_secs(settings.propagation.push_timeout_secs),
    ));
    let propagator = Arc::new(ChangePropagator::new(
        subscriptions.clone(),
        channel,
        PropagatorConfig {
            subscriber_page_size: settings.propagation.subscriber_page_size,
            max_concurrent_pushes: settings.propagation.max_concurrent_pushes,
        },
    ));

    // 6. Start Workers
    let mut worker_manager = WorkerManager::new();
    for _ in 0..settings.crawl.worker_count {
        worker_manager.spawn(Arc::new(CrawlWorker::new(
            pipeline.clone(),
            queue.clone(),
            Duration::from_millis(settings.crawl.idle_backoff_ms),
        )));
    }
    worker_manager.spawn(Arc::new(ChangeFeedWorker::new(
        change_feed,
        propagator,
        settings.propagation.batch_size,
        Duration::from_millis(settings.propagation.poll_interval_ms),
    )));
    info!("Started {} workers", worker_manager.len());

    // 7. Start HTTP server
    let dispatch: Arc<dyn DispatchQueue> = queue;
    let app = routes::app(dispatch, subscriptions);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    worker_manager.shutdown();

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(err) => error!("Unable to listen for shutdown signal: {}", err),
    }
}
