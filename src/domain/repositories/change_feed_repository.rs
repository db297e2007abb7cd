// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::link_relationship_repository::RepositoryError;
use crate::domain::models::change_event::LinkChangeEvent;
use async_trait::async_trait;

/// 变更事件流仓库特质
///
/// 持久化的、按键有序的变更事件流。事件在确认前会被反复返回，
/// 因此消费方必须能够容忍重复投递。
#[async_trait]
pub trait ChangeFeedRepository: Send + Sync {
    /// 按序号升序读取尚未确认的事件
    async fn fetch_pending(&self, limit: u64) -> Result<Vec<LinkChangeEvent>, RepositoryError>;

    /// 确认事件已处理
    async fn acknowledge(&self, sequence: i64) -> Result<(), RepositoryError>;
}
