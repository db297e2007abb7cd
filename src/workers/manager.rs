// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::workers::worker::Worker;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// 工作管理器
///
/// 启动后台工作器并在关闭时终止它们
#[derive(Default)]
pub struct WorkerManager {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 启动一个工作器
    ///
    /// # 参数
    ///
    /// * `worker` - 要启动的工作器
    pub fn spawn(&mut self, worker: Arc<dyn Worker>) {
        let handle = tokio::spawn(async move {
            if let Err(e) = worker.run().await {
                error!("Worker {} stopped: {}", worker.name(), e);
            }
        });
        self.handles.push(handle);
    }

    /// 已启动的工作器数量
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// 终止所有工作器
    pub fn shutdown(&mut self) {
        info!("Shutting down workers...");
        for handle in self.handles.drain(..) {
            handle.abort();
        }
        info!("Workers shut down successfully");
    }
}
