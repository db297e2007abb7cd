// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::infrastructure::cache::redis_client::RedisClient;
use crate::queue::dispatch::{BatchEntryFailure, BatchResult, DispatchEntry, DispatchQueue, MAX_BATCH_SIZE};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// 队列错误类型
#[derive(Error, Debug)]
pub enum QueueError {
    /// 后端错误
    #[error("Queue backend error: {0}")]
    Backend(String),

    /// 批次过大
    #[error("Batch of {0} entries exceeds the limit of {max}", max = MAX_BATCH_SIZE)]
    BatchTooLarge(usize),
}

impl From<anyhow::Error> for QueueError {
    fn from(err: anyhow::Error) -> Self {
        QueueError::Backend(err.to_string())
    }
}

/// 一次投递
///
/// 在确认之前消息保留在处理中列表，进程崩溃后由 [`TaskQueue::requeue_in_flight`] 重新入队。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// 条目ID
    pub id: String,
    /// 消息体
    pub body: String,
    /// 确认凭据（队列中的原始数据）
    pub receipt: String,
}

/// 队列中的消息封装
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "Body")]
    body: String,
}

impl Delivery {
    /// 由队列原始数据还原投递
    ///
    /// 无法解析封装时整段原始数据作为消息体。
    pub fn from_raw(raw: String) -> Self {
        match serde_json::from_str::<Envelope>(&raw) {
            Ok(envelope) => Self {
                id: envelope.id,
                body: envelope.body,
                receipt: raw,
            },
            Err(_) => Self {
                id: String::new(),
                body: raw.clone(),
                receipt: raw,
            },
        }
    }
}

/// 任务队列特质
///
/// 至少一次投递的消息队列的消费者一侧。
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// 取出下一条消息，队列为空时返回None
    async fn receive(&self) -> Result<Option<Delivery>, QueueError>;

    /// 确认消息已处理
    async fn acknowledge(&self, delivery: &Delivery) -> Result<(), QueueError>;

    /// 放弃处理，把消息放回待处理列表以便重新投递
    async fn release(&self, delivery: &Delivery) -> Result<(), QueueError>;

    /// 将处理中但未确认的消息重新入队
    ///
    /// # 返回值
    ///
    /// * `Ok(usize)` - 重新入队的消息数量
    async fn requeue_in_flight(&self) -> Result<usize, QueueError>;
}

#[async_trait]
impl<T: TaskQueue + ?Sized> TaskQueue for Arc<T> {
    async fn receive(&self) -> Result<Option<Delivery>, QueueError> {
        (**self).receive().await
    }

    async fn acknowledge(&self, delivery: &Delivery) -> Result<(), QueueError> {
        (**self).acknowledge(delivery).await
    }

    async fn release(&self, delivery: &Delivery) -> Result<(), QueueError> {
        (**self).release(delivery).await
    }

    async fn requeue_in_flight(&self) -> Result<usize, QueueError> {
        (**self).requeue_in_flight().await
    }
}

/// 基于Redis列表的任务队列实现
pub struct RedisTaskQueue {
    /// Redis客户端
    redis: RedisClient,
    /// 待处理列表键
    queue_key: String,
    /// 处理中列表键
    processing_key: String,
}

impl RedisTaskQueue {
    /// 创建新的Redis任务队列实例
    ///
    /// # 参数
    ///
    /// * `redis` - Redis客户端
    /// * `queue_name` - 队列名称
    pub fn new(redis: RedisClient, queue_name: &str) -> Self {
        Self {
            redis,
            queue_key: format!("{}:pending", queue_name),
            processing_key: format!("{}:processing", queue_name),
        }
    }
}

#[async_trait]
impl DispatchQueue for RedisTaskQueue {
    async fn submit_batch(&self, entries: &[DispatchEntry]) -> Result<BatchResult, QueueError> {
        if entries.len() > MAX_BATCH_SIZE {
            return Err(QueueError::BatchTooLarge(entries.len()));
        }

        let mut result = BatchResult::default();
        for entry in entries {
            let envelope = Envelope {
                id: entry.id.clone(),
                body: entry.body.clone(),
            };
            let raw = match serde_json::to_string(&envelope) {
                Ok(raw) => raw,
                Err(e) => {
                    result.failed.push(BatchEntryFailure {
                        id: entry.id.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            match self.redis.rpush(&self.queue_key, &raw).await {
                Ok(_) => result.successful.push(entry.id.clone()),
                Err(e) => result.failed.push(BatchEntryFailure {
                    id: entry.id.clone(),
                    reason: e.to_string(),
                }),
            }
        }

        Ok(result)
    }
}

#[async_trait]
impl TaskQueue for RedisTaskQueue {
    async fn receive(&self) -> Result<Option<Delivery>, QueueError> {
        let raw = self
            .redis
            .lmove(&self.queue_key, &self.processing_key)
            .await?;
        Ok(raw.map(Delivery::from_raw))
    }

    async fn acknowledge(&self, delivery: &Delivery) -> Result<(), QueueError> {
        let removed = self
            .redis
            .lrem(&self.processing_key, &delivery.receipt)
            .await?;
        if removed == 0 {
            warn!(batch_id = %delivery.id, "Acknowledged message was not in flight");
        } else {
            debug!(batch_id = %delivery.id, "Acknowledged message");
        }
        Ok(())
    }

    async fn release(&self, delivery: &Delivery) -> Result<(), QueueError> {
        if self
            .redis
            .lrem(&self.processing_key, &delivery.receipt)
            .await?
            > 0
        {
            self.redis.rpush(&self.queue_key, &delivery.receipt).await?;
            debug!(batch_id = %delivery.id, "Released message for redelivery");
        }
        Ok(())
    }

    async fn requeue_in_flight(&self) -> Result<usize, QueueError> {
        let mut requeued = 0;
        while self
            .redis
            .lmove(&self.processing_key, &self.queue_key)
            .await?
            .is_some()
        {
            requeued += 1;
        }
        if requeued > 0 {
            info!("Requeued {} in-flight messages", requeued);
        }
        Ok(requeued)
    }
}
