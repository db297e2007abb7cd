// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::WorkerError;
use async_trait::async_trait;

/// 后台工作器
///
/// 爬取工作器和变更事件流工作器都以此接入 [`WorkerManager`](crate::workers::manager::WorkerManager)
#[async_trait]
pub trait Worker: Send + Sync {
    /// 运行工作器，正常情况下不会返回
    async fn run(&self) -> Result<(), WorkerError>;

    /// 工作器名称，用于日志
    fn name(&self) -> &str;
}
