// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::change_feed_repository::ChangeFeedRepository;
use crate::domain::services::change_propagator::{ChangePropagator, PropagationError};
use crate::utils::errors::WorkerError;
use crate::workers::worker::Worker;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// 变更事件流工作器
///
/// 按序号顺序消费变更事件并交给变更传播器。
/// 订阅注册表不可用时停止当前批次，未确认的事件在下次轮询时重试。
pub struct ChangeFeedWorker {
    feed: Arc<dyn ChangeFeedRepository>,
    propagator: Arc<ChangePropagator>,
    batch_size: u64,
    poll_interval: Duration,
}

impl ChangeFeedWorker {
    /// 创建新的变更事件流工作器实例
    ///
    /// # 参数
    ///
    /// * `feed` - 变更事件流仓库
    /// * `propagator` - 变更传播器
    /// * `batch_size` - 每次轮询读取的事件数量
    /// * `poll_interval` - 没有事件时的轮询间隔
    pub fn new(
        feed: Arc<dyn ChangeFeedRepository>,
        propagator: Arc<ChangePropagator>,
        batch_size: u64,
        poll_interval: Duration,
    ) -> Self {
        Self {
            feed,
            propagator,
            batch_size,
            poll_interval,
        }
    }

    /// 处理待处理的变更事件
    ///
    /// # 返回值
    ///
    /// * `Ok(usize)` - 已确认的事件数量
    /// * `Err(WorkerError)` - 事件流不可用
    pub async fn process_pending(&self) -> Result<usize, WorkerError> {
        let events = self.feed.fetch_pending(self.batch_size).await?;
        if events.is_empty() {
            return Ok(0);
        }

        debug!("Processing {} change events", events.len());

        let mut acknowledged = 0;
        for event in events {
            match self.propagator.handle_event(&event).await {
                Ok(Some(report)) => {
                    info!(
                        sequence = event.sequence,
                        attempted = report.attempted,
                        delivered = report.delivered,
                        reaped = report.reaped,
                        "Propagated change"
                    );
                }
                Ok(None) => {}
                Err(PropagationError::Registry(e)) => {
                    warn!(
                        sequence = event.sequence,
                        "Subscription registry unavailable, retrying later: {}", e
                    );
                    break;
                }
                Err(e) => {
                    error!(sequence = event.sequence, "Dropping change event: {}", e);
                }
            }

            self.feed.acknowledge(event.sequence).await?;
            acknowledged += 1;
        }

        Ok(acknowledged)
    }
}

#[async_trait]
impl Worker for ChangeFeedWorker {
    async fn run(&self) -> Result<(), WorkerError> {
        info!("Change feed worker started");

        loop {
            match self.process_pending().await {
                Ok(0) => sleep(self.poll_interval).await,
                Ok(_) => {}
                Err(e) => {
                    error!("Error processing change events: {}", e);
                    sleep(self.poll_interval).await;
                }
            }
        }
    }

    fn name(&self) -> &str {
        "change-feed-worker"
    }
}
