// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::change_event::{ChangeKind, LinkChangeEvent};
use crate::domain::models::link_relationship::LinkRelationship;
use crate::domain::models::subscription::Subscription;
use crate::domain::repositories::link_relationship_repository::RepositoryError;
use crate::domain::repositories::subscription_repository::SubscriptionRepository;
use crate::domain::services::push_channel::PushChannel;
use futures::StreamExt;
use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

/// 传播错误类型
#[derive(Error, Debug)]
pub enum PropagationError {
    /// 订阅注册表不可用，整次调用失败
    #[error("Subscription registry unavailable: {0}")]
    Registry(#[from] RepositoryError),

    /// 负载序列化失败
    #[error("Failed to serialize payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 传播器配置
#[derive(Debug, Clone, Copy)]
pub struct PropagatorConfig {
    /// 查询订阅时的分页大小
    pub subscriber_page_size: u64,
    /// 同时进行的推送数量上限
    pub max_concurrent_pushes: usize,
}

/// 一次传播的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropagationReport {
    /// 尝试推送的订阅数
    pub attempted: usize,
    /// 推送成功的订阅数
    pub delivered: usize,
    /// 已清理的失效订阅数
    pub reaped: usize,
    /// 清理失败的订阅数
    pub reap_failures: usize,
}

enum DeliveryResult {
    Delivered,
    Reaped,
    ReapFailed,
}

/// 变更传播器
///
/// 把链接关系的每次写入推送给该爬取的所有订阅者。
/// 推送失败的订阅者被视为已断开并从注册表中删除。
pub struct ChangePropagator {
    subscriptions: Arc<dyn SubscriptionRepository>,
    channel: Arc<dyn PushChannel>,
    config: PropagatorConfig,
}

impl ChangePropagator {
    /// 创建新的变更传播器实例
    ///
    /// # 参数
    ///
    /// * `subscriptions` - 订阅注册表
    /// * `channel` - 推送通道
    /// * `config` - 传播器配置
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        channel: Arc<dyn PushChannel>,
        config: PropagatorConfig,
    ) -> Self {
        Self {
            subscriptions,
            channel,
            config,
        }
    }

    /// 处理一条变更事件
    ///
    /// 删除事件和没有新镜像的事件被忽略，返回 `Ok(None)`。
    pub async fn handle_event(
        &self,
        event: &LinkChangeEvent,
    ) -> Result<Option<PropagationReport>, PropagationError> {
        match (event.kind, &event.new_image) {
            (ChangeKind::Insert | ChangeKind::Modify, Some(relationship)) => self
                .on_link_relationship_change(relationship)
                .await
                .map(Some),
            _ => {
                debug!(sequence = event.sequence, kind = %event.kind, "Ignoring change event");
                Ok(None)
            }
        }
    }

    /// 将链接关系推送给该爬取的所有订阅者
    ///
    /// # 返回值
    ///
    /// * `Ok(PropagationReport)` - 每个订阅者都已尝试推送
    /// * `Err(PropagationError)` - 订阅查询失败，未进行任何推送
    #[instrument(skip(self, relationship), fields(crawl_id = %relationship.crawl_id, parent_url = %relationship.parent_url))]
    pub async fn on_link_relationship_change(
        &self,
        relationship: &LinkRelationship,
    ) -> Result<PropagationReport, PropagationError> {
        let subscribers = self
            .subscriptions
            .query_by_crawl_id(&relationship.crawl_id, self.config.subscriber_page_size)
            .await?;

        let mut report = PropagationReport {
            attempted: subscribers.len(),
            ..Default::default()
        };

        if subscribers.is_empty() {
            debug!("No subscribers for crawl");
            return Ok(report);
        }

        let payload = serde_json::to_string(relationship)?;
        info!("Pushing relationship to {} subscribers", subscribers.len());

        let payload = payload.as_str();
        let results: Vec<DeliveryResult> = futures::stream::iter(subscribers)
            .map(|subscription| async move { self.deliver(subscription, payload).await })
            .buffer_unordered(self.config.max_concurrent_pushes.max(1))
            .collect()
            .await;

        for result in results {
            match result {
                DeliveryResult::Delivered => report.delivered += 1,
                DeliveryResult::Reaped => report.reaped += 1,
                DeliveryResult::ReapFailed => report.reap_failures += 1,
            }
        }

        Ok(report)
    }

    async fn deliver(&self, subscription: Subscription, payload: &str) -> DeliveryResult {
        let start = Instant::now();
        let result = self
            .channel
            .push(
                &subscription.delivery_endpoint,
                &subscription.connection_id,
                payload,
            )
            .await;
        histogram!("crawlgraph_push_duration_seconds").record(start.elapsed().as_secs_f64());

        let err = match result {
            Ok(()) => {
                counter!("crawlgraph_push_total", "result" => "delivered").increment(1);
                debug!(connection_id = %subscription.connection_id, "Pushed relationship");
                return DeliveryResult::Delivered;
            }
            Err(e) => e,
        };

        counter!("crawlgraph_push_total", "result" => "failed").increment(1);
        warn!(
            connection_id = %subscription.connection_id,
            "Push failed, removing subscription: {}", err
        );

        match self
            .subscriptions
            .delete_by_connection_and_crawl(&subscription.connection_id, &subscription.crawl_id)
            .await
        {
            Ok(()) => {
                counter!("crawlgraph_subscribers_reaped_total").increment(1);
                DeliveryResult::Reaped
            }
            Err(e) => {
                error!(
                    connection_id = %subscription.connection_id,
                    "Failed to remove stale subscription: {}", e
                );
                DeliveryResult::ReapFailed
            }
        }
    }
}

#[cfg(test)]
#[path = "change_propagator_test.rs"]
mod tests;
