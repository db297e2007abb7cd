// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod memory_queue;
pub mod memory_store;

use crawlgraph::domain::services::change_propagator::{ChangePropagator, PropagatorConfig};
use crawlgraph::domain::services::crawl_pipeline::{CrawlPipeline, PipelineConfig};
use crawlgraph::domain::services::link_extractor::HtmlLinkExtractor;
use crawlgraph::engines::reqwest_engine::ReqwestEngine;
use crawlgraph::infrastructure::services::http_push_channel::HttpPushChannel;
use memory_queue::MemoryQueue;
use memory_store::{MemoryRelationshipStore, MemorySubscriptionStore};
use std::sync::Arc;
use std::time::Duration;

/// 以真实HTTP组件和内存存储组装的爬取流水线
pub fn pipeline(
    store: Arc<MemoryRelationshipStore>,
    queue: Arc<MemoryQueue>,
    config: PipelineConfig,
) -> Arc<CrawlPipeline> {
    let extractor = HtmlLinkExtractor::new(
        Arc::new(ReqwestEngine::new(reqwest::Client::new())),
        Duration::from_secs(5),
        "crawlgraph-test".to_string(),
    );
    Arc::new(CrawlPipeline::new(store, Arc::new(extractor), queue, config))
}

/// 以真实HTTP推送通道和内存订阅注册表组装的变更传播器
pub fn propagator(
    subscriptions: Arc<MemorySubscriptionStore>,
    secret: Option<&str>,
) -> Arc<ChangePropagator> {
    let channel = HttpPushChannel::new(
        reqwest::Client::new(),
        secret.map(str::to_string),
        Duration::from_secs(5),
    );
    Arc::new(ChangePropagator::new(
        subscriptions,
        Arc::new(channel),
        PropagatorConfig {
            subscriber_page_size: 2,
            max_concurrent_pushes: 4,
        },
    ))
}
