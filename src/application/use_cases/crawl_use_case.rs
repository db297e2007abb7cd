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

use crate::{
    application::dto::crawl_request::CrawlRequestDto,
    domain::models::crawl_task::CrawlTask,
    queue::{
        dispatch::{DispatchEntry, DispatchQueue},
        task_queue::QueueError,
    },
};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use validator::Validate;

#[derive(Error, Debug)]
pub enum CrawlUseCaseError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),
    #[error("Queue rejected root task: {0}")]
    Rejected(String),
    #[error("Failed to encode task: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// 爬取启动用例
///
/// 把根页面作为深度为1的任务放入分发队列
pub struct CrawlUseCase {
    queue: Arc<dyn DispatchQueue>,
}

impl CrawlUseCase {
    pub fn new(queue: Arc<dyn DispatchQueue>) -> Self {
        Self { queue }
    }

    pub async fn start_crawl(&self, dto: CrawlRequestDto) -> Result<CrawlTask, CrawlUseCaseError> {
        dto.validate()
            .map_err(|e| CrawlUseCaseError::ValidationError(e.to_string()))?;

        let task = CrawlTask::root(dto.root_url, dto.crawl_id);
        let entry = DispatchEntry::from_task(&task)?;

        let result = self.queue.submit_batch(std::slice::from_ref(&entry)).await?;
        if let Some(failure) = result.failed.into_iter().next() {
            return Err(CrawlUseCaseError::Rejected(failure.reason));
        }

        info!(task = %task, "Scheduled root task");
        Ok(task)
    }
}
