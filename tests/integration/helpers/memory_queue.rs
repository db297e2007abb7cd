use async_trait::async_trait;
use crawlgraph::domain::models::crawl_task::CrawlTask;
use crawlgraph::queue::dispatch::{BatchResult, DispatchEntry, DispatchQueue, MAX_BATCH_SIZE};
use crawlgraph::queue::task_queue::{Delivery, QueueError, TaskQueue};
use std::collections::VecDeque;
use std::sync::Mutex;

/// 内存中的分发队列
///
/// 语义与Redis实现一致：取出的消息在确认前保留在处理中列表。
#[derive(Default)]
pub struct MemoryQueue {
    pending: Mutex<VecDeque<Delivery>>,
    in_flight: Mutex<Vec<Delivery>>,
    batch_sizes: Mutex<Vec<usize>>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_tasks(&self) -> Vec<CrawlTask> {
        self.pending
            .lock()
            .unwrap()
            .iter()
            .map(|d| CrawlTask::decode(&d.body))
            .collect()
    }

    pub fn in_flight_len(&self) -> usize {
        self.in_flight.lock().unwrap().len()
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes.lock().unwrap().clone()
    }

    pub fn push_raw(&self, id: &str, body: &str) {
        self.pending.lock().unwrap().push_back(Delivery {
            id: id.to_string(),
            body: body.to_string(),
            receipt: format!("{}:{}", id, body),
        });
    }
}

#[async_trait]
impl DispatchQueue for MemoryQueue {
    async fn submit_batch(&self, entries: &[DispatchEntry]) -> Result<BatchResult, QueueError> {
        if entries.len() > MAX_BATCH_SIZE {
            return Err(QueueError::BatchTooLarge(entries.len()));
        }
        self.batch_sizes.lock().unwrap().push(entries.len());

        let mut result = BatchResult::default();
        for entry in entries {
            self.push_raw(&entry.id, &entry.body);
            result.successful.push(entry.id.clone());
        }
        Ok(result)
    }
}

#[async_trait]
impl TaskQueue for MemoryQueue {
    async fn receive(&self) -> Result<Option<Delivery>, QueueError> {
        let next = self.pending.lock().unwrap().pop_front();
        if let Some(delivery) = &next {
            self.in_flight.lock().unwrap().push(delivery.clone());
        }
        Ok(next)
    }

    async fn acknowledge(&self, delivery: &Delivery) -> Result<(), QueueError> {
        let mut in_flight = self.in_flight.lock().unwrap();
        if let Some(pos) = in_flight.iter().position(|d| d.receipt == delivery.receipt) {
            in_flight.remove(pos);
        }
        Ok(())
    }

    async fn release(&self, delivery: &Delivery) -> Result<(), QueueError> {
        let mut in_flight = self.in_flight.lock().unwrap();
        if let Some(pos) = in_flight.iter().position(|d| d.receipt == delivery.receipt) {
            let released = in_flight.remove(pos);
            self.pending.lock().unwrap().push_back(released);
        }
        Ok(())
    }

    async fn requeue_in_flight(&self) -> Result<usize, QueueError> {
        let drained: Vec<Delivery> = self.in_flight.lock().unwrap().drain(..).collect();
        let count = drained.len();
        self.pending.lock().unwrap().extend(drained);
        Ok(count)
    }
}
