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

use crate::domain::models::crawl_task::CrawlTask;
use crate::domain::services::crawl_pipeline::CrawlPipeline;
use crate::queue::task_queue::TaskQueue;
use crate::utils::errors::WorkerError;
use crate::workers::worker::Worker;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};
use uuid::Uuid;

/// 爬取工作器
///
/// 从分发队列逐条取出任务交给爬取流水线。
/// 流水线给出结果后确认消息；存储不可用时把消息放回队列。
pub struct CrawlWorker {
    pipeline: Arc<CrawlPipeline>,
    queue: Arc<dyn TaskQueue>,
    idle_backoff: Duration,
    worker_id: Uuid,
    name: String,
}

impl CrawlWorker {
    /// 创建新的爬取工作器实例
    ///
    /// # 参数
    ///
    /// * `pipeline` - 爬取流水线
    /// * `queue` - 任务队列
    /// * `idle_backoff` - 队列为空或出错时的等待时间
    pub fn new(pipeline: Arc<CrawlPipeline>, queue: Arc<dyn TaskQueue>, idle_backoff: Duration) -> Self {
        let worker_id = Uuid::new_v4();
        Self {
            pipeline,
            queue,
            idle_backoff,
            worker_id,
            name: format!("crawl-worker-{}", worker_id),
        }
    }

    /// 处理下一条消息
    ///
    /// # 返回值
    ///
    /// * `Ok(true)` - 处理了一条消息且可以立即继续
    /// * `Ok(false)` - 队列为空，或消息已放回队列需要等待
    /// * `Err(WorkerError)` - 队列不可用
    pub async fn process_next(&self) -> Result<bool, WorkerError> {
        let Some(delivery) = self.queue.receive().await? else {
            return Ok(false);
        };

        let task = CrawlTask::decode(&delivery.body);
        match self.pipeline.process_task(&task).await {
            Ok(outcome) => {
                info!(task = %task, outcome = outcome.label(), "Task finished");
                self.queue.acknowledge(&delivery).await?;
                Ok(true)
            }
            Err(e) => {
                warn!(task = %task, "Releasing task for redelivery: {}", e);
                self.queue.release(&delivery).await?;
                Ok(false)
            }
        }
    }
}

#[async_trait]
impl Worker for CrawlWorker {
    async fn run(&self) -> Result<(), WorkerError> {
        info!("Crawl worker {} started", self.worker_id);

        loop {
            match self.process_next().await {
                Ok(true) => {}
                Ok(false) => sleep(self.idle_backoff).await,
                Err(e) => {
                    error!("Error processing task: {}", e);
                    sleep(self.idle_backoff).await;
                }
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
