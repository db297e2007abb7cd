// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::crawl_task::CrawlTask;
use crate::domain::models::link_relationship::LinkRelationship;
use crate::domain::repositories::link_relationship_repository::{
    LinkRelationshipRepository, RepositoryError,
};
use crate::domain::services::link_extractor::LinkExtractor;
use crate::domain::services::url_canonicalizer::{self, resolve_child_links};
use crate::queue::dispatch::{schedule_children, DispatchQueue, FanOutReport};
use metrics::counter;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};

/// 认领模式
///
/// 决定去重检查与写入链接关系之间的并发语义。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimMode {
    /// 先查后写，并发处理同一页面时可能重复扇出
    #[default]
    LookThenWrite,
    /// 条件写入，只有首个写入者会扇出
    Conditional,
}

/// 流水线配置
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    /// 最大深度，0表示根页面也不扩展
    pub max_depth: u32,
    /// 认领模式
    pub claim_mode: ClaimMode,
}

/// 单个任务的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// URL无效，任务被丢弃
    Malformed,
    /// 页面在本次爬取中已处理
    Deduped,
    /// 页面抓取失败，不重试
    FetchFailed,
    /// 已持久化，达到最大深度不再扩展
    DepthExceeded,
    /// 已持久化并调度了子任务
    FannedOut(FanOutReport),
}

impl TaskOutcome {
    /// 指标标签
    pub fn label(&self) -> &'static str {
        match self {
            TaskOutcome::Malformed => "malformed",
            TaskOutcome::Deduped => "deduped",
            TaskOutcome::FetchFailed => "fetch_failed",
            TaskOutcome::DepthExceeded => "depth_exceeded",
            TaskOutcome::FannedOut(_) => "fanned_out",
        }
    }
}

/// 流水线错误类型
///
/// 只有存储错误会上抛，调用方应让消息重新投递。
#[derive(Error, Debug)]
pub enum PipelineError {
    /// 爬取状态存储不可用
    #[error("Crawl state store unavailable: {0}")]
    StoreUnavailable(#[from] RepositoryError),
}

/// 爬取流水线
///
/// 处理单个爬取任务：规范化、去重、抓取、过滤、持久化、深度检查和扇出。
/// 流水线本身不在任务之间保存任何状态。
pub struct CrawlPipeline {
    relationships: Arc<dyn LinkRelationshipRepository>,
    extractor: Arc<dyn LinkExtractor>,
    queue: Arc<dyn DispatchQueue>,
    config: PipelineConfig,
}

impl CrawlPipeline {
    /// 创建新的爬取流水线实例
    ///
    /// # 参数
    ///
    /// * `relationships` - 链接关系仓库
    /// * `extractor` - 链接提取器
    /// * `queue` - 分发队列
    /// * `config` - 流水线配置
    pub fn new(
        relationships: Arc<dyn LinkRelationshipRepository>,
        extractor: Arc<dyn LinkExtractor>,
        queue: Arc<dyn DispatchQueue>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            relationships,
            extractor,
            queue,
            config,
        }
    }

    /// 处理一个爬取任务
    ///
    /// # 参数
    ///
    /// * `task` - 爬取任务
    ///
    /// # 返回值
    ///
    /// * `Ok(TaskOutcome)` - 任务已终结，可以确认消息
    /// * `Err(PipelineError)` - 存储不可用，消息应保留以便重新投递
    #[instrument(skip(self, task), fields(crawl_id = %task.crawl_id, url = %task.url, depth = task.depth))]
    pub async fn process_task(&self, task: &CrawlTask) -> Result<TaskOutcome, PipelineError> {
        let result = self.run(task).await;

        let label = match &result {
            Ok(outcome) => outcome.label(),
            Err(_) => "store_unavailable",
        };
        counter!("crawlgraph_tasks_total", "outcome" => label).increment(1);

        result
    }

    async fn run(&self, task: &CrawlTask) -> Result<TaskOutcome, PipelineError> {
        let (page_url, parent_url) = match url_canonicalizer::parse_absolute(&task.url)
            .and_then(|url| Ok((url, url_canonicalizer::normalize(&task.url)?)))
        {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Dropping task: {}", e);
                return Ok(TaskOutcome::Malformed);
            }
        };

        if self
            .relationships
            .find(&task.crawl_id, &parent_url)
            .await?
            .is_some()
        {
            info!("Page already crawled, skipping");
            return Ok(TaskOutcome::Deduped);
        }

        let raw_links = match self.extractor.extract_links(&page_url).await {
            Ok(links) => links,
            Err(e) => {
                warn!("Failed to fetch page: {}", e);
                return Ok(TaskOutcome::FetchFailed);
            }
        };

        let children = resolve_child_links(&page_url, &raw_links);
        let relationship = LinkRelationship::new(
            task.crawl_id.clone(),
            parent_url,
            children.iter().map(|url| url.to_string()).collect(),
        );

        match self.config.claim_mode {
            ClaimMode::LookThenWrite => self.relationships.save(&relationship).await?,
            ClaimMode::Conditional => {
                if !self.relationships.insert_if_absent(&relationship).await? {
                    info!("Another worker claimed this page first, skipping fan-out");
                    return Ok(TaskOutcome::Deduped);
                }
            }
        }
        info!(children = relationship.child_urls.len(), "Saved link relationship");

        if task.depth >= self.config.max_depth {
            info!(max_depth = self.config.max_depth, "Reached max depth, not expanding");
            return Ok(TaskOutcome::DepthExceeded);
        }

        let child_tasks: Vec<CrawlTask> = relationship
            .child_urls
            .iter()
            .map(|url| task.child(url.clone()))
            .collect();

        let report = schedule_children(self.queue.as_ref(), &child_tasks).await;
        Ok(TaskOutcome::FannedOut(report))
    }
}

#[cfg(test)]
#[path = "crawl_pipeline_test.rs"]
mod tests;
