// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::crawl_task::CrawlTask;
use crate::queue::task_queue::QueueError;
use async_trait::async_trait;
use metrics::counter;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// 单次批量提交的最大条目数
pub const MAX_BATCH_SIZE: usize = 10;

static NON_ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new("[^A-Za-z0-9]+").expect("static regex is valid"));

/// 由URL派生批量条目ID
///
/// 去掉所有非字母数字字符。同一URL的重复提交得到相同的ID。
pub fn batch_entry_id(url: &str) -> String {
    NON_ALPHANUMERIC.replace_all(url, "").into_owned()
}

/// 批量提交中的单个条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchEntry {
    /// 条目ID
    pub id: String,
    /// 序列化后的任务消息体
    pub body: String,
}

impl DispatchEntry {
    /// 由爬取任务构造条目
    pub fn from_task(task: &CrawlTask) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: batch_entry_id(&task.url),
            body: serde_json::to_string(task)?,
        })
    }
}

/// 单个条目提交失败的原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntryFailure {
    /// 条目ID
    pub id: String,
    /// 失败原因
    pub reason: String,
}

/// 批量提交结果，每个条目独立成功或失败
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    /// 成功入队的条目ID
    pub successful: Vec<String>,
    /// 失败的条目
    pub failed: Vec<BatchEntryFailure>,
}

/// 分发队列特质
///
/// 至少一次投递的消息队列的生产者一侧。
#[async_trait]
pub trait DispatchQueue: Send + Sync {
    /// 批量提交，最多 [`MAX_BATCH_SIZE`] 个条目
    ///
    /// # 返回值
    ///
    /// * `Ok(BatchResult)` - 每个条目的结果
    /// * `Err(QueueError)` - 整批提交失败
    async fn submit_batch(&self, entries: &[DispatchEntry]) -> Result<BatchResult, QueueError>;
}

#[async_trait]
impl<T: DispatchQueue + ?Sized> DispatchQueue for Arc<T> {
    async fn submit_batch(&self, entries: &[DispatchEntry]) -> Result<BatchResult, QueueError> {
        (**self).submit_batch(entries).await
    }
}

/// 扇出报告
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FanOutReport {
    /// 每个批次的大小，按提交顺序
    pub batch_sizes: Vec<usize>,
    /// 成功入队的条目数
    pub submitted: usize,
    /// 失败的条目
    pub failed: Vec<BatchEntryFailure>,
}

/// 调度子任务
///
/// 将任务序列化后按不超过 [`MAX_BATCH_SIZE`] 的批次提交。
/// 失败按条目记录且不重试；整批失败时该批所有条目记为失败，后续批次照常提交。
pub async fn schedule_children<Q>(queue: &Q, tasks: &[CrawlTask]) -> FanOutReport
where
    Q: DispatchQueue + ?Sized,
{
    let mut report = FanOutReport::default();

    for chunk in tasks.chunks(MAX_BATCH_SIZE) {
        let mut entries = Vec::with_capacity(chunk.len());
        for task in chunk {
            match DispatchEntry::from_task(task) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    error!("Failed to serialize task {}: {}", task, e);
                    report.failed.push(BatchEntryFailure {
                        id: batch_entry_id(&task.url),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if entries.is_empty() {
            continue;
        }

        report.batch_sizes.push(entries.len());

        match queue.submit_batch(&entries).await {
            Ok(result) => {
                for id in &result.successful {
                    debug!(batch_id = %id, "Successfully put message on queue");
                }
                for failure in &result.failed {
                    warn!(
                        batch_id = %failure.id,
                        reason = %failure.reason,
                        "Failed to put message on queue"
                    );
                }
                counter!("crawlgraph_dispatch_entries_total", "result" => "success")
                    .increment(result.successful.len() as u64);
                counter!("crawlgraph_dispatch_entries_total", "result" => "failed")
                    .increment(result.failed.len() as u64);
                report.submitted += result.successful.len();
                report.failed.extend(result.failed);
            }
            Err(e) => {
                error!("Error posting batch of {} entries to queue: {}", entries.len(), e);
                counter!("crawlgraph_dispatch_entries_total", "result" => "failed")
                    .increment(entries.len() as u64);
                report
                    .failed
                    .extend(entries.into_iter().map(|entry| BatchEntryFailure {
                        id: entry.id,
                        reason: e.to_string(),
                    }));
            }
        }
    }

    info!(
        submitted = report.submitted,
        failed = report.failed.len(),
        batches = report.batch_sizes.len(),
        "Scheduled child tasks"
    );

    report
}

#[cfg(test)]
#[path = "dispatch_test.rs"]
mod tests;
